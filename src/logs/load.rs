//! Loaders that turn a whole log into a series (or raw process samples).
//!
//! A log with no valid records loads to an empty result; deciding whether that
//! is fatal is up to the caller.

use crate::error::MetricsError;
use crate::logs::parse::{LineShape, Malformed, Sample, parse_line};
use crate::logs::row::{ProcessSample, ScalarSample, Series};
use log::{debug, warn};
use std::fs;
use std::io;
use std::path::Path;

const LINES_ORIGIN: &str = "<lines>";

/// Build a series from `timestamp,value` lines, in input order.
pub fn load_single_value<I, S>(lines: I) -> Series
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    single_value(LINES_ORIGIN, lines)
}

/// Build a series from `timestamp,v1,...,vn` lines where each value is the sum of
/// the `vi`. The empty-result sentinel becomes a zero reading; without a
/// timestamp it is only accepted before the first record, at time zero.
pub fn load_summed<I, S>(lines: I) -> Series
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    summed(LINES_ORIGIN, lines)
}

/// Collect the `timestamp,pid,utime,stime` records, in input order.
pub fn load_process_samples<I, S>(lines: I) -> Vec<ProcessSample>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    process_samples(LINES_ORIGIN, lines)
}

pub fn read_single_value(path: &Path) -> Result<Series, MetricsError> {
    let text = read_log(path)?;
    Ok(single_value(&path.display().to_string(), text.lines()))
}

pub fn read_summed(path: &Path) -> Result<Series, MetricsError> {
    let text = read_log(path)?;
    Ok(summed(&path.display().to_string(), text.lines()))
}

pub fn read_process_samples(path: &Path) -> Result<Vec<ProcessSample>, MetricsError> {
    let text = read_log(path)?;
    Ok(process_samples(&path.display().to_string(), text.lines()))
}

/// Read a log as text. Invalid UTF-8 is replaced rather than rejected so that a
/// torn write only spoils the line it lands in.
fn read_log(path: &Path) -> Result<String, MetricsError> {
    match fs::read(path) {
        Ok(bytes) => Ok(String::from_utf8_lossy(&bytes).into_owned()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Err(MetricsError::MissingFile {
            path: path.to_path_buf(),
        }),
        Err(e) => Err(MetricsError::io(path, e)),
    }
}

fn single_value<I, S>(origin: &str, lines: I) -> Series
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut series = Series::new();
    scan(origin, lines, LineShape::ScalarPair, |sample| {
        if let Sample::Scalar(s) = sample {
            series.push(s);
        }
        Ok(())
    });
    series
}

fn summed<I, S>(origin: &str, lines: I) -> Series
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut series = Series::new();
    scan(origin, lines, LineShape::CommaSummed, |sample| {
        match sample {
            Sample::Scalar(s) => series.push(s),
            Sample::EmptyResult {
                timestamp: Some(timestamp),
            } => series.push(ScalarSample {
                timestamp,
                value: 0.0,
            }),
            // A bare marker has no time of its own: zero at the start of the run
            // when nothing precedes it, unplaceable otherwise.
            Sample::EmptyResult { timestamp: None } if series.is_empty() => {
                series.push(ScalarSample {
                    timestamp: 0.0,
                    value: 0.0,
                })
            }
            Sample::EmptyResult { timestamp: None } => {
                return Err(Malformed::UntimedEmptyResult);
            }
            Sample::Process(_) => {}
        }
        Ok(())
    });
    series
}

fn process_samples<I, S>(origin: &str, lines: I) -> Vec<ProcessSample>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out = Vec::new();
    scan(origin, lines, LineShape::Process, |sample| {
        if let Sample::Process(p) = sample {
            out.push(p);
        }
        Ok(())
    });
    out
}

/// Parse every line, hand good records to `accept` and drop the rest. `accept`
/// may still reject a record that only makes no sense in context.
fn scan<I, S, F>(origin: &str, lines: I, shape: LineShape, mut accept: F)
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
    F: FnMut(Sample) -> Result<(), Malformed>,
{
    let mut skipped = 0usize;
    for (lineno, line) in lines.into_iter().enumerate() {
        let line = line.as_ref();
        match parse_line(line, shape).and_then(&mut accept) {
            Ok(()) => {}
            Err(reason) => {
                skipped += 1;
                debug!(
                    "skipping malformed line {}:{}: {} ({:?})",
                    origin,
                    lineno + 1,
                    reason,
                    line
                );
            }
        }
    }
    if skipped > 0 {
        warn!("skipped {} malformed lines in {}", skipped, origin);
    }
}
