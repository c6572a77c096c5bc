use crate::model::{AlignedTable, IndexKind, RowKey};
use anyhow::Context;
use std::io;

/// Write the table as CSV. The first column is the row key; absent cells are
/// empty fields.
pub fn write_csv<W: io::Write>(table: &AlignedTable, out: W) -> anyhow::Result<()> {
    let mut w = csv::Writer::from_writer(out);

    let key_header = match table.index_kind() {
        IndexKind::Timestamp => "timestamp",
        IndexKind::Iteration => "iteration",
    };
    let mut header = vec![key_header.to_string()];
    header.extend(table.columns().iter().cloned());
    w.write_record(&header).context("write csv header")?;

    for (ix, key) in table.keys().iter().enumerate() {
        let mut record = Vec::with_capacity(table.columns().len() + 1);
        record.push(match key {
            RowKey::Timestamp(t) => t.to_string(),
            RowKey::Ordinal(i) => i.to_string(),
        });
        if let Some(row) = table.row(ix) {
            record.extend(row.iter().map(|c| c.map(|v| v.to_string()).unwrap_or_default()));
        }
        w.write_record(&record).context("write csv row")?;
    }
    w.flush().context("flush csv output")?;
    Ok(())
}

/// Write the table as pretty JSON; absent cells are `null`.
pub fn write_json<W: io::Write>(table: &AlignedTable, mut out: W) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(&mut out, table).context("write json table")?;
    writeln!(out)?;
    Ok(())
}
