//! Area under a series, and the statistics reported next to it.

use crate::error::MetricsError;
use crate::logs::Series;

/// Trapezoidal integral of value over time, in series order.
///
/// The series must already be time-ordered; points are not re-sorted, so
/// out-of-order input gives a meaningless (but deterministic) answer. For a
/// percentage metric the result is in percent-seconds.
pub fn integrate(series: &Series) -> Result<f64, MetricsError> {
    if series.len() < 2 {
        return Err(MetricsError::InsufficientSamples {
            needed: 2,
            found: series.len(),
        });
    }
    Ok(series
        .points()
        .windows(2)
        .map(|w| (w[0].value + w[1].value) / 2.0 * (w[1].timestamp - w[0].timestamp))
        .sum())
}

/// Descriptive statistics for the verbose report.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    pub samples: usize,
    pub first: f64,
    pub last: f64,
    pub duration: f64,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}

impl Summary {
    /// None for an empty series. `first` and `last` are the timestamps of the
    /// first and last points in series order.
    pub fn of(series: &Series) -> Option<Summary> {
        let first = series.points().first()?.timestamp;
        let last = series.last()?.timestamp;
        let (mut min, mut max, mut sum) = (f64::INFINITY, f64::NEG_INFINITY, 0.0);
        for v in series.values() {
            min = min.min(v);
            max = max.max(v);
            sum += v;
        }
        Some(Summary {
            samples: series.len(),
            first,
            last,
            duration: last - first,
            mean: sum / series.len() as f64,
            min,
            max,
        })
    }
}
