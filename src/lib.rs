//! Resource-usage metrics for profiling runs of a long-running client.
//!
//! A run leaves one flat log per metric in its result directory. This crate
//! parses those logs leniently, rebuilds cumulative CPU time across process
//! restarts, aligns the series on a shared index, and integrates CPU usage into
//! a single CPU-seconds figure.

pub mod error;
pub mod layout;
pub mod logs;
pub mod model;
pub mod render;
pub mod run;

pub use error::MetricsError;
