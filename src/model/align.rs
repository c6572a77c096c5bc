//! Merge independently sampled series onto one table for joint analysis.

use crate::error::MetricsError;
use crate::logs::Series;
use serde::Serialize;
use std::cmp::Ordering;

/// Which timestamps make up the rows of a timestamp-indexed table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Timeline {
    /// Every timestamp present in any input series.
    Union,
    /// Only the timestamps of the named series.
    Reference(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlignmentMode {
    /// Rows keyed by real timestamps; a cell is absent when its series has no
    /// sample at exactly that time.
    ByTimestamp(Timeline),
    /// Rows keyed by position (iteration number). All series must have the same
    /// length.
    ByOrdinal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexKind {
    Timestamp,
    Iteration,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RowKey {
    Timestamp(f64),
    Ordinal(usize),
}

impl RowKey {
    /// Position on a numeric x axis.
    pub fn as_f64(&self) -> f64 {
        match *self {
            RowKey::Timestamp(t) => t,
            RowKey::Ordinal(i) => i as f64,
        }
    }
}

/// Rows keyed by timestamp or ordinal, one column per input series. Missing
/// readings are `None`, never zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlignedTable {
    index: IndexKind,
    columns: Vec<String>,
    keys: Vec<RowKey>,
    cells: Vec<Vec<Option<f64>>>,
}

impl AlignedTable {
    pub fn index_kind(&self) -> IndexKind {
        self.index
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn keys(&self) -> &[RowKey] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn row(&self, row: usize) -> Option<&[Option<f64>]> {
        self.cells.get(row).map(|r| r.as_slice())
    }

    pub fn cell(&self, row: usize, column: &str) -> Option<f64> {
        let col = self.column_index(column)?;
        self.cells.get(row)?[col]
    }

    /// Every cell of one column, top to bottom.
    pub fn column(&self, name: &str) -> Option<Vec<Option<f64>>> {
        let col = self.column_index(name)?;
        Some(self.cells.iter().map(|r| r[col]).collect())
    }

    fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }
}

/// Align named series according to `mode`. Column order follows the input.
pub fn align(
    series: &[(String, Series)],
    mode: &AlignmentMode,
) -> Result<AlignedTable, MetricsError> {
    match mode {
        AlignmentMode::ByTimestamp(timeline) => by_timestamp(series, timeline),
        AlignmentMode::ByOrdinal => by_ordinal(series),
    }
}

fn by_timestamp(
    series: &[(String, Series)],
    timeline: &Timeline,
) -> Result<AlignedTable, MetricsError> {
    let mut index: Vec<f64> = match timeline {
        Timeline::Union => series.iter().flat_map(|(_, s)| s.timestamps()).collect(),
        Timeline::Reference(name) => series
            .iter()
            .find(|(n, _)| n == name)
            .ok_or_else(|| MetricsError::UnknownColumn { name: name.clone() })?
            .1
            .timestamps()
            .collect(),
    };
    index.sort_by(|a, b| cmp_time(*a, *b));
    index.dedup();

    let mut cells = vec![vec![None; series.len()]; index.len()];
    for (col, (_, s)) in series.iter().enumerate() {
        // Later samples overwrite earlier ones at the same timestamp.
        for p in s {
            if let Ok(row) = index.binary_search_by(|t| cmp_time(*t, p.timestamp)) {
                cells[row][col] = Some(p.value);
            }
        }
    }

    Ok(AlignedTable {
        index: IndexKind::Timestamp,
        columns: column_names(series),
        keys: index.into_iter().map(RowKey::Timestamp).collect(),
        cells,
    })
}

fn by_ordinal(series: &[(String, Series)]) -> Result<AlignedTable, MetricsError> {
    let expected = series.first().map(|(_, s)| s.len()).unwrap_or(0);
    for (name, s) in series {
        if s.len() != expected {
            return Err(MetricsError::LengthMismatch {
                column: name.clone(),
                expected,
                found: s.len(),
            });
        }
    }

    let cells = (0..expected)
        .map(|i| series.iter().map(|(_, s)| Some(s.points()[i].value)).collect())
        .collect();

    Ok(AlignedTable {
        index: IndexKind::Iteration,
        columns: column_names(series),
        keys: (0..expected).map(RowKey::Ordinal).collect(),
        cells,
    })
}

fn column_names(series: &[(String, Series)]) -> Vec<String> {
    series.iter().map(|(n, _)| n.clone()).collect()
}

// Timestamps are finite by construction.
fn cmp_time(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}
