//! Record types shared by the parser, the loaders and the model.

use std::fmt;

/// One `timestamp,value` reading. Timestamps are seconds since the start of the run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScalarSample {
    pub timestamp: f64,
    pub value: f64,
}

/// One `timestamp,pid,utime,stime` reading for a single process instance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProcessSample {
    pub timestamp: f64,
    pub pid: u32,
    pub utime: f64,
    pub stime: f64,
}

impl ProcessSample {
    /// User plus system time consumed by this process so far.
    pub fn total_cpu(&self) -> f64 {
        self.utime + self.stime
    }
}

impl fmt::Display for ScalarSample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.timestamp, self.value)
    }
}

impl fmt::Display for ProcessSample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{},{}",
            self.timestamp, self.pid, self.utime, self.stime
        )
    }
}

/// Ordered `(timestamp, value)` pairs for one metric, in load order.
///
/// Duplicate timestamps are allowed and nothing here re-sorts the points.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Series {
    points: Vec<ScalarSample>,
}

impl Series {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        pairs
            .into_iter()
            .map(|(timestamp, value)| ScalarSample { timestamp, value })
            .collect()
    }

    pub fn push(&mut self, sample: ScalarSample) {
        self.points.push(sample);
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[ScalarSample] {
        &self.points
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ScalarSample> {
        self.points.iter()
    }

    pub fn last(&self) -> Option<&ScalarSample> {
        self.points.last()
    }

    pub fn timestamps(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|p| p.timestamp)
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|p| p.value)
    }
}

impl FromIterator<ScalarSample> for Series {
    fn from_iter<I: IntoIterator<Item = ScalarSample>>(iter: I) -> Self {
        Series {
            points: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Series {
    type Item = &'a ScalarSample;
    type IntoIter = std::slice::Iter<'a, ScalarSample>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}
