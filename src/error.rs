//! Hard failures of the metrics core.
//!
//! Per-line problems are not in here: they are `logs::Malformed` values and the
//! loaders recover from them by skipping the line.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MetricsError {
    #[error("no valid samples found in {}", path.display())]
    EmptyInput { path: PathBuf },

    #[error("need at least {needed} samples to integrate, got {found}")]
    InsufficientSamples { needed: usize, found: usize },

    #[error("expected file not found: {}", path.display())]
    MissingFile { path: PathBuf },

    #[error("directory not found: {}", path.display())]
    MissingDirectory { path: PathBuf },

    #[error("no results directories found in {}", root.display())]
    NoRunDirectories { root: PathBuf },

    #[error("series {column:?} has {found} samples, expected {expected} for ordinal alignment")]
    LengthMismatch {
        column: String,
        expected: usize,
        found: usize,
    },

    #[error("no series named {name:?}")]
    UnknownColumn { name: String },

    #[error("invalid run layout: {reason}")]
    InvalidLayout { reason: String },

    #[error("read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl MetricsError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        MetricsError::Io {
            path: path.into(),
            source,
        }
    }
}
