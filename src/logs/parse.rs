//! Line parser for the per-iteration log conventions.
//!
//! Every log is plain text with one comma-separated record per line. A line that
//! does not parse is reported as `Malformed` and the caller drops it: the
//! collectors append to these files from shell pipelines and SQL clients, so a
//! partial write or a stray banner line is expected now and then and must not
//! cost the whole run.

use crate::logs::row::{ProcessSample, ScalarSample};
use thiserror::Error;

/// What `psql` prints for an empty result, after the collector strips spaces.
pub const EMPTY_RESULT_SENTINEL: &str = "(0rows)";

/// The record convention a log file is written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineShape {
    /// `timestamp,value`
    ScalarPair,
    /// `timestamp,v1,v2,...,vn`, value is the sum of the `vi`
    CommaSummed,
    /// `timestamp,pid,utime,stime`
    Process,
}

/// A successfully parsed line.
#[derive(Debug, Clone, PartialEq)]
pub enum Sample {
    Scalar(ScalarSample),
    Process(ProcessSample),
    /// The empty-result sentinel, optionally preceded by a timestamp. Only produced
    /// for `LineShape::CommaSummed`; it stands for a reading of zero.
    EmptyResult { timestamp: Option<f64> },
}

/// Why a line was skipped.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Malformed {
    #[error("blank line")]
    Blank,
    #[error("expected {expected} fields, found {found}")]
    FieldCount { expected: usize, found: usize },
    #[error("expected at least {min} fields, found {found}")]
    TooFewFields { min: usize, found: usize },
    #[error("field {field} is not a number: {text:?}")]
    BadNumber { field: usize, text: String },
    #[error("field {field} is not finite")]
    NonFinite { field: usize },
    #[error("negative timestamp {0}")]
    NegativeTimestamp(f64),
    #[error("sum of values overflows")]
    SumOverflow,
    #[error("empty-result marker without a timestamp after earlier records")]
    UntimedEmptyResult,
}

/// Parse one line in the given convention.
pub fn parse_line(line: &str, shape: LineShape) -> Result<Sample, Malformed> {
    match shape {
        LineShape::ScalarPair => parse_scalar_line(line).map(Sample::Scalar),
        LineShape::CommaSummed => parse_summed_line(line),
        LineShape::Process => parse_process_line(line).map(Sample::Process),
    }
}

/// Parse `timestamp,value`.
pub fn parse_scalar_line(line: &str) -> Result<ScalarSample, Malformed> {
    let fields = split_fields(line)?;
    if fields.len() != 2 {
        return Err(Malformed::FieldCount {
            expected: 2,
            found: fields.len(),
        });
    }
    Ok(ScalarSample {
        timestamp: timestamp(&fields)?,
        value: number(&fields, 1)?,
    })
}

/// Parse `timestamp,v1,...,vn` into `timestamp, sum(vi)`, recognizing the
/// empty-result sentinel either alone on the line or in place of the values.
pub fn parse_summed_line(line: &str) -> Result<Sample, Malformed> {
    let fields = split_fields(line)?;
    match fields.as_slice() {
        [only] if is_sentinel(only) => return Ok(Sample::EmptyResult { timestamp: None }),
        [_, only] if is_sentinel(only) => {
            return Ok(Sample::EmptyResult {
                timestamp: Some(timestamp(&fields)?),
            });
        }
        _ => {}
    }
    if fields.len() < 2 {
        return Err(Malformed::TooFewFields {
            min: 2,
            found: fields.len(),
        });
    }

    let ts = timestamp(&fields)?;
    let mut sum = 0.0;
    for ix in 1..fields.len() {
        sum += number(&fields, ix)?;
    }
    if !sum.is_finite() {
        return Err(Malformed::SumOverflow);
    }
    Ok(Sample::Scalar(ScalarSample {
        timestamp: ts,
        value: sum,
    }))
}

/// Parse `timestamp,pid,utime,stime`.
pub fn parse_process_line(line: &str) -> Result<ProcessSample, Malformed> {
    let fields = split_fields(line)?;
    if fields.len() != 4 {
        return Err(Malformed::FieldCount {
            expected: 4,
            found: fields.len(),
        });
    }
    let pid = fields[1].parse::<u32>().map_err(|_| Malformed::BadNumber {
        field: 1,
        text: fields[1].to_string(),
    })?;
    Ok(ProcessSample {
        timestamp: timestamp(&fields)?,
        pid,
        utime: number(&fields, 2)?,
        stime: number(&fields, 3)?,
    })
}

fn split_fields(line: &str) -> Result<Vec<&str>, Malformed> {
    let line = line.trim();
    if line.is_empty() {
        return Err(Malformed::Blank);
    }
    Ok(line.split(',').map(str::trim).collect())
}

fn number(fields: &[&str], field: usize) -> Result<f64, Malformed> {
    let text = fields[field];
    let n = text.parse::<f64>().map_err(|_| Malformed::BadNumber {
        field,
        text: text.to_string(),
    })?;
    if !n.is_finite() {
        return Err(Malformed::NonFinite { field });
    }
    Ok(n)
}

fn timestamp(fields: &[&str]) -> Result<f64, Malformed> {
    let t = number(fields, 0)?;
    if t < 0.0 {
        return Err(Malformed::NegativeTimestamp(t));
    }
    Ok(t)
}

// Whitespace is ignored so that the unstripped `(0 rows)` also matches.
fn is_sentinel(field: &str) -> bool {
    field
        .chars()
        .filter(|c| !c.is_whitespace())
        .eq(EMPTY_RESULT_SENTINEL.chars())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn scalar_line_round_trips() {
        for line in ["0,12.5", "2.5,0", "40,100.25", "1234.75,3"] {
            let sample = parse_scalar_line(line).unwrap();
            assert_eq!(sample.to_string(), line);
            assert_eq!(parse_scalar_line(&sample.to_string()).unwrap(), sample);
        }
    }

    #[test]
    fn process_line_round_trips() {
        let line = "12.5,4242,1.25,0.5";
        let sample = parse_process_line(line).unwrap();
        assert_eq!(
            sample,
            ProcessSample {
                timestamp: 12.5,
                pid: 4242,
                utime: 1.25,
                stime: 0.5,
            }
        );
        assert_eq!(sample.to_string(), line);
        assert_eq!(sample.total_cpu(), 1.75);
    }

    #[test]
    fn summed_line_adds_values_after_timestamp() {
        assert_eq!(
            parse_summed_line("3,10,20, 5,0,1,2").unwrap(),
            Sample::Scalar(ScalarSample {
                timestamp: 3.0,
                value: 38.0,
            })
        );
    }

    #[test]
    fn fields_are_trimmed() {
        assert_eq!(
            parse_scalar_line("  1 , 2.0  \n").unwrap(),
            ScalarSample {
                timestamp: 1.0,
                value: 2.0,
            }
        );
    }

    #[test]
    fn sentinel_forms() {
        assert_eq!(
            parse_summed_line("(0rows)").unwrap(),
            Sample::EmptyResult { timestamp: None }
        );
        assert_eq!(
            parse_summed_line("(0 rows)").unwrap(),
            Sample::EmptyResult { timestamp: None }
        );
        assert_eq!(
            parse_summed_line("7.5,(0rows)").unwrap(),
            Sample::EmptyResult {
                timestamp: Some(7.5)
            }
        );
    }

    #[test]
    fn sentinel_is_malformed_for_other_shapes() {
        assert!(parse_scalar_line("(0rows)").is_err());
        assert!(parse_line("(0rows)", LineShape::Process).is_err());
    }

    #[test]
    fn malformed_reasons() {
        assert_eq!(parse_scalar_line("   "), Err(Malformed::Blank));
        assert_eq!(
            parse_scalar_line("1,2,3"),
            Err(Malformed::FieldCount {
                expected: 2,
                found: 3
            })
        );
        assert_eq!(
            parse_scalar_line("1"),
            Err(Malformed::FieldCount {
                expected: 2,
                found: 1
            })
        );
        assert_eq!(
            parse_summed_line("5"),
            Err(Malformed::TooFewFields { min: 2, found: 1 })
        );
        assert_eq!(
            parse_scalar_line("1,abc"),
            Err(Malformed::BadNumber {
                field: 1,
                text: "abc".to_string()
            })
        );
        assert_eq!(
            parse_scalar_line("1,NaN"),
            Err(Malformed::NonFinite { field: 1 })
        );
        assert_eq!(
            parse_scalar_line("inf,1"),
            Err(Malformed::NonFinite { field: 0 })
        );
        assert_eq!(
            parse_scalar_line("-1,1"),
            Err(Malformed::NegativeTimestamp(-1.0))
        );
        assert_eq!(
            parse_process_line("1,-3,0.1,0.1"),
            Err(Malformed::BadNumber {
                field: 1,
                text: "-3".to_string()
            })
        );
        assert_eq!(
            parse_summed_line("1,2,,3"),
            Err(Malformed::BadNumber {
                field: 2,
                text: String::new()
            })
        );
    }

    #[test]
    fn summed_overflow_is_malformed() {
        assert_eq!(
            parse_summed_line("1,1e308,1e308"),
            Err(Malformed::SumOverflow)
        );
    }

    #[test]
    fn psql_banner_lines_are_malformed() {
        assert!(parse_summed_line("len_available,len_installed").is_err());
        assert!(parse_summed_line("-------+-------").is_err());
    }
}
