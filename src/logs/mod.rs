//! Log parsing: line conventions, sample types, and per-file loaders.

pub mod load;
pub mod parse;
pub mod row;

pub use load::{
    load_process_samples, load_single_value, load_summed, read_process_samples,
    read_single_value, read_summed,
};
pub use parse::{LineShape, Malformed, Sample, parse_line};
pub use row::{ProcessSample, ScalarSample, Series};
