//! Result sets: picking one, and loading its logs per the run layout.
//!
//! A result set is a directory of flat log files written by the collection
//! side. Nothing here writes to it.

use crate::error::MetricsError;
use crate::layout::{MetricKind, MetricSpec, RunLayout};
use crate::logs::{self, Series};
use crate::model::{self, Summary};
use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Where result sets are collected unless told otherwise.
pub const DEFAULT_RESULTS_ROOT: &str = "results";

/// The most recently modified subdirectory of `root`.
pub fn most_recent_run(root: &Path) -> Result<PathBuf, MetricsError> {
    if !root.is_dir() {
        return Err(MetricsError::MissingDirectory {
            path: root.to_path_buf(),
        });
    }

    let mut best: Option<(SystemTime, PathBuf)> = None;
    for entry in fs::read_dir(root).map_err(|e| MetricsError::io(root, e))? {
        let entry = entry.map_err(|e| MetricsError::io(root, e))?;
        let path = entry.path();
        let modified = match fs::metadata(&path) {
            Ok(md) if md.is_dir() => md.modified().map_err(|e| MetricsError::io(&path, e))?,
            Ok(_) => continue,
            Err(e) => {
                debug!("ignoring {}: {}", path.display(), e);
                continue;
            }
        };
        if best.as_ref().is_none_or(|(t, _)| modified > *t) {
            best = Some((modified, path));
        }
    }

    best.map(|(_, path)| path)
        .ok_or_else(|| MetricsError::NoRunDirectories {
            root: root.to_path_buf(),
        })
}

/// Use `explicit` when given, otherwise the most recent run under `root`.
pub fn resolve_run(explicit: Option<&Path>, root: &Path) -> Result<PathBuf, MetricsError> {
    match explicit {
        Some(dir) if dir.is_dir() => Ok(dir.to_path_buf()),
        Some(dir) => Err(MetricsError::MissingDirectory {
            path: dir.to_path_buf(),
        }),
        None => {
            let dir = most_recent_run(root)?;
            info!("using most recent results: {}", dir.display());
            Ok(dir)
        }
    }
}

/// Every series of one run, in layout order.
#[derive(Debug, Clone)]
pub struct RunData {
    pub dir: PathBuf,
    pub series: Vec<(String, Series)>,
}

impl RunData {
    pub fn series(&self, name: &str) -> Option<&Series> {
        self.series.iter().find(|(n, _)| n == name).map(|(_, s)| s)
    }
}

/// Load one metric's log from `dir` with the loader its kind calls for.
pub fn load_metric(dir: &Path, metric: &MetricSpec) -> Result<Series, MetricsError> {
    let path = dir.join(&metric.file);
    if !path.is_file() {
        return Err(MetricsError::MissingFile { path });
    }
    let series = match metric.kind {
        MetricKind::Scalar => logs::read_single_value(&path)?,
        MetricKind::Summed => logs::read_summed(&path)?,
        MetricKind::CpuTime => model::cumulative_cpu_time(&logs::read_process_samples(&path)?),
    };
    info!(
        "loaded {} samples for {} from {}",
        series.len(),
        metric.name,
        path.display()
    );
    Ok(series)
}

/// Load every metric of the layout. All files must exist and the reference
/// metric must have at least one sample.
pub fn load_run(dir: &Path, layout: &RunLayout) -> Result<RunData, MetricsError> {
    let mut series = Vec::with_capacity(layout.metrics.len());
    for metric in &layout.metrics {
        let s = load_metric(dir, metric)?;
        if metric.name == layout.reference && s.is_empty() {
            return Err(MetricsError::EmptyInput {
                path: dir.join(&metric.file),
            });
        }
        series.push((metric.name.clone(), s));
    }
    Ok(RunData {
        dir: dir.to_path_buf(),
        series,
    })
}

/// Integral of the layout's `integrate` metric, with statistics for reporting.
#[derive(Debug, Clone, PartialEq)]
pub struct CpuSeconds {
    pub dir: PathBuf,
    pub metric: String,
    pub unit: String,
    pub integral: f64,
    pub summary: Summary,
}

pub fn cpu_seconds(dir: &Path, layout: &RunLayout) -> Result<CpuSeconds, MetricsError> {
    let metric = layout
        .metric(&layout.integrate)
        .ok_or_else(|| MetricsError::UnknownColumn {
            name: layout.integrate.clone(),
        })?;
    let series = load_metric(dir, metric)?;
    let empty = || MetricsError::EmptyInput {
        path: dir.join(&metric.file),
    };
    let summary = Summary::of(&series).ok_or_else(empty)?;
    let integral = model::integrate(&series)?;
    Ok(CpuSeconds {
        dir: dir.to_path_buf(),
        metric: metric.name.clone(),
        unit: metric.unit.clone(),
        integral,
        summary,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    fn touch_dir(path: &Path, secs: u64) {
        fs::create_dir_all(path).unwrap();
        let t = SystemTime::UNIX_EPOCH + Duration::from_secs(secs);
        fs::File::open(path).unwrap().set_modified(t).unwrap();
    }

    fn write_standard_run(dir: &Path) {
        fs::create_dir_all(dir).unwrap();
        fs::write(dir.join("cpu_usage.log"), "0,20.0\n10,20.0\n20,20.0\n30,20.0\n40,20.0\n")
            .unwrap();
        fs::write(dir.join("cpu_time.log"), "0,100,1,0\n5,200,2,1\n10,200,4,1\n").unwrap();
        fs::write(dir.join("db_size.log"), "0,1000\n10,1200\n").unwrap();
        fs::write(dir.join("package_counts.log"), "(0rows)\n10,1,2,3\n").unwrap();
        fs::write(dir.join("package_buffer_counts.log"), "0,0,0\n\n10,4,4\n").unwrap();
    }

    #[test]
    fn picks_most_recently_modified() {
        let root = tempfile::tempdir().unwrap();
        touch_dir(&root.path().join("Mon_Jan_01_10:00:00"), 1_000);
        touch_dir(&root.path().join("Tue_Jan_02_10:00:00"), 3_000);
        touch_dir(&root.path().join("Wed_Jan_03_10:00:00"), 2_000);
        fs::write(root.path().join("notes.txt"), "not a run").unwrap();
        assert_eq!(
            most_recent_run(root.path()).unwrap(),
            root.path().join("Tue_Jan_02_10:00:00")
        );
    }

    #[test]
    fn missing_and_empty_roots() {
        let root = tempfile::tempdir().unwrap();
        let missing = root.path().join("results");
        assert!(matches!(
            most_recent_run(&missing),
            Err(MetricsError::MissingDirectory { .. })
        ));
        fs::create_dir(&missing).unwrap();
        fs::write(missing.join("stray.log"), "").unwrap();
        assert!(matches!(
            most_recent_run(&missing),
            Err(MetricsError::NoRunDirectories { .. })
        ));
    }

    #[test]
    fn explicit_run_bypasses_selection() {
        let root = tempfile::tempdir().unwrap();
        let run = root.path().join("mine");
        fs::create_dir(&run).unwrap();
        let nowhere = root.path().join("nowhere");
        assert_eq!(resolve_run(Some(&run), &nowhere).unwrap(), run);
        assert!(matches!(
            resolve_run(Some(&nowhere), root.path()),
            Err(MetricsError::MissingDirectory { .. })
        ));
        assert_eq!(resolve_run(None, root.path()).unwrap(), run);
    }

    #[test]
    fn constant_cpu_usage_integrates_to_800() {
        let root = tempfile::tempdir().unwrap();
        let run = root.path().join("run");
        write_standard_run(&run);
        let result = cpu_seconds(&run, &RunLayout::standard()).unwrap();
        assert_eq!(result.integral, 800.0);
        assert_eq!(format!("{:.2}", result.integral), "800.00");
        assert_eq!(result.summary.samples, 5);
        assert_eq!(result.summary.duration, 40.0);
        assert_eq!(result.unit, "%");
    }

    #[test]
    fn cpu_seconds_failures() {
        let root = tempfile::tempdir().unwrap();
        let run = root.path().join("run");
        fs::create_dir(&run).unwrap();
        let layout = RunLayout::standard();

        assert!(matches!(
            cpu_seconds(&run, &layout),
            Err(MetricsError::MissingFile { .. })
        ));

        fs::write(run.join("cpu_usage.log"), "\ngarbage\n").unwrap();
        assert!(matches!(
            cpu_seconds(&run, &layout),
            Err(MetricsError::EmptyInput { .. })
        ));

        fs::write(run.join("cpu_usage.log"), "0,12\n").unwrap();
        assert!(matches!(
            cpu_seconds(&run, &layout),
            Err(MetricsError::InsufficientSamples { found: 1, .. })
        ));
    }

    #[test]
    fn load_run_builds_every_series() {
        let root = tempfile::tempdir().unwrap();
        let run = root.path().join("run");
        write_standard_run(&run);
        let data = load_run(&run, &RunLayout::standard()).unwrap();
        let names: Vec<&str> = data.series.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "cpu_usage",
                "cpu_time",
                "package_counts",
                "package_buffer_counts",
                "db_size"
            ]
        );
        assert_eq!(
            data.series("cpu_time").unwrap(),
            &Series::from_pairs([(0.0, 1.0), (5.0, 4.0), (10.0, 6.0)])
        );
        assert_eq!(
            data.series("package_counts").unwrap(),
            &Series::from_pairs([(0.0, 0.0), (10.0, 6.0)])
        );
    }

    #[test]
    fn load_run_requires_every_file_and_a_reference() {
        let root = tempfile::tempdir().unwrap();
        let run = root.path().join("run");
        write_standard_run(&run);
        fs::remove_file(run.join("db_size.log")).unwrap();
        match load_run(&run, &RunLayout::standard()) {
            Err(MetricsError::MissingFile { path }) => assert_eq!(path, run.join("db_size.log")),
            other => panic!("unexpected {:?}", other),
        }

        write_standard_run(&run);
        fs::write(run.join("cpu_usage.log"), "").unwrap();
        assert!(matches!(
            load_run(&run, &RunLayout::standard()),
            Err(MetricsError::EmptyInput { .. })
        ));
    }
}
