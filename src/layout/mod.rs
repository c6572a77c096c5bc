//! Run layout: which log files a result set holds and how to read them.
//!
//! JSON shape (every field except `metrics[].name` and `metrics[].kind` is optional):
//! {
//!   "reference": "cpu_usage",   // timeline for charts, must load non-empty
//!   "integrate": "cpu_usage",   // scalar metric behind `cpu-seconds`
//!   "metrics": [
//!     {
//!       "name": "cpu_usage",
//!       "file": "cpu_usage.log",  // defaults to "<name>.log"
//!       "kind": "scalar",          // scalar | summed | cpu_time
//!       "panel": "CPU Usage",      // chart panel, metrics may share one
//!       "unit": "%"
//!     }
//!   ]
//! }
//!
//! Without a layout file the standard client-profiling layout is used.

use crate::error::MetricsError;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    /// `timestamp,value`
    Scalar,
    /// `timestamp,v1,...,vn`, summed per line
    Summed,
    /// `timestamp,pid,utime,stime`, reconstructed into cumulative CPU seconds
    CpuTime,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LayoutSpec {
    #[serde(default)]
    pub reference: Option<String>,

    #[serde(default)]
    pub integrate: Option<String>,

    #[serde(default)]
    pub metrics: Vec<RawMetric>,
}

/// Metric entry as it appears in the layout file.
#[derive(Debug, Clone, Deserialize)]
pub struct RawMetric {
    pub name: String,

    pub kind: MetricKind,

    #[serde(default)]
    pub file: Option<String>,

    #[serde(default)]
    pub panel: Option<String>,

    #[serde(default)]
    pub unit: Option<String>,
}

/// Validated metric with defaults filled in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricSpec {
    pub name: String,
    pub file: String,
    pub kind: MetricKind,
    pub panel: String,
    pub unit: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunLayout {
    pub metrics: Vec<MetricSpec>,
    pub reference: String,
    pub integrate: String,
}

impl LayoutSpec {
    /// Fill defaults and check names: at least one metric, unique names, and
    /// `reference`/`integrate` must be declared, with `integrate` a scalar metric.
    pub fn validate_and_build(&self) -> Result<RunLayout, MetricsError> {
        if self.metrics.is_empty() {
            return Err(invalid("layout declares no metrics"));
        }

        let mut seen = BTreeSet::new();
        let mut metrics = Vec::with_capacity(self.metrics.len());
        for raw in &self.metrics {
            if raw.name.is_empty() {
                return Err(invalid("metric with empty name"));
            }
            if !seen.insert(raw.name.as_str()) {
                return Err(invalid(format!("duplicate metric name {:?}", raw.name)));
            }
            metrics.push(MetricSpec {
                name: raw.name.clone(),
                file: raw
                    .file
                    .clone()
                    .unwrap_or_else(|| format!("{}.log", raw.name)),
                kind: raw.kind,
                panel: raw.panel.clone().unwrap_or_else(|| raw.name.clone()),
                unit: raw.unit.clone().unwrap_or_default(),
            });
        }

        let reference = self
            .reference
            .clone()
            .unwrap_or_else(|| metrics[0].name.clone());
        if !seen.contains(reference.as_str()) {
            return Err(invalid(format!("reference {:?} is not a metric", reference)));
        }

        let integrate = self.integrate.clone().unwrap_or_else(|| reference.clone());
        match metrics.iter().find(|m| m.name == integrate) {
            None => {
                return Err(invalid(format!("integrate {:?} is not a metric", integrate)));
            }
            Some(m) if m.kind != MetricKind::Scalar => {
                return Err(invalid(format!(
                    "integrate {:?} must be a scalar metric",
                    integrate
                )));
            }
            Some(_) => {}
        }

        Ok(RunLayout {
            metrics,
            reference,
            integrate,
        })
    }
}

impl RunLayout {
    /// Load and validate a JSON layout file.
    pub fn from_file(path: &Path) -> Result<RunLayout, MetricsError> {
        let text = fs::read_to_string(path).map_err(|e| MetricsError::io(path, e))?;
        let spec: LayoutSpec = serde_json::from_str(&text)
            .map_err(|e| invalid(format!("{}: {}", path.display(), e)))?;
        spec.validate_and_build()
    }

    /// The files a client profiling run produces.
    pub fn standard() -> RunLayout {
        let metric = |name: &str, kind, panel: &str, unit: &str| MetricSpec {
            name: name.to_string(),
            file: format!("{}.log", name),
            kind,
            panel: panel.to_string(),
            unit: unit.to_string(),
        };
        RunLayout {
            metrics: vec![
                metric("cpu_usage", MetricKind::Scalar, "CPU Usage", "%"),
                metric(
                    "cpu_time",
                    MetricKind::CpuTime,
                    "Cumulative CPU Time",
                    "s",
                ),
                metric("package_counts", MetricKind::Summed, "Package Counts", ""),
                metric(
                    "package_buffer_counts",
                    MetricKind::Summed,
                    "Package Counts",
                    "",
                ),
                metric("db_size", MetricKind::Scalar, "Client Database Size", ""),
            ],
            reference: "cpu_usage".to_string(),
            integrate: "cpu_usage".to_string(),
        }
    }

    pub fn metric(&self, name: &str) -> Option<&MetricSpec> {
        self.metrics.iter().find(|m| m.name == name)
    }

    /// Panels in first-appearance order, each with the metrics drawn on it.
    pub fn panels(&self) -> Vec<(&str, Vec<&MetricSpec>)> {
        let mut panels: Vec<(&str, Vec<&MetricSpec>)> = Vec::new();
        for m in &self.metrics {
            match panels.iter().position(|(p, _)| *p == m.panel) {
                Some(ix) => panels[ix].1.push(m),
                None => panels.push((m.panel.as_str(), vec![m])),
            }
        }
        panels
    }
}

fn invalid(reason: impl Into<String>) -> MetricsError {
    MetricsError::InvalidLayout {
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(json: &str) -> Result<RunLayout, MetricsError> {
        serde_json::from_str::<LayoutSpec>(json)
            .unwrap()
            .validate_and_build()
    }

    #[test]
    fn defaults_are_filled() {
        let layout = parse(r#"{"metrics": [{"name": "load", "kind": "scalar"}]}"#).unwrap();
        assert_eq!(
            layout,
            RunLayout {
                metrics: vec![MetricSpec {
                    name: "load".to_string(),
                    file: "load.log".to_string(),
                    kind: MetricKind::Scalar,
                    panel: "load".to_string(),
                    unit: String::new(),
                }],
                reference: "load".to_string(),
                integrate: "load".to_string(),
            }
        );
    }

    #[test]
    fn rejects_bad_layouts() {
        for json in [
            r#"{"metrics": []}"#,
            r#"{"metrics": [{"name": "a", "kind": "scalar"}, {"name": "a", "kind": "summed"}]}"#,
            r#"{"reference": "b", "metrics": [{"name": "a", "kind": "scalar"}]}"#,
            r#"{"integrate": "t", "metrics": [{"name": "a", "kind": "scalar"}, {"name": "t", "kind": "cpu_time"}]}"#,
        ] {
            assert!(
                matches!(parse(json), Err(MetricsError::InvalidLayout { .. })),
                "{}",
                json
            );
        }
    }

    #[test]
    fn standard_layout_is_valid_and_groups_panels() {
        let layout = RunLayout::standard();
        let panels: Vec<(&str, Vec<&str>)> = layout
            .panels()
            .into_iter()
            .map(|(p, ms)| (p, ms.iter().map(|m| m.name.as_str()).collect()))
            .collect();
        assert_eq!(
            panels,
            vec![
                ("CPU Usage", vec!["cpu_usage"]),
                ("Cumulative CPU Time", vec!["cpu_time"]),
                ("Package Counts", vec!["package_counts", "package_buffer_counts"]),
                ("Client Database Size", vec!["db_size"]),
            ]
        );
        assert_eq!(layout.metric("cpu_time").unwrap().kind, MetricKind::CpuTime);
    }

    #[test]
    fn from_file_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("layout.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            RunLayout::from_file(&path),
            Err(MetricsError::InvalidLayout { .. })
        ));
    }
}
