//! Derivations over loaded series: cumulative CPU time, alignment, integration.

pub mod align;
pub mod cputime;
pub mod integrate;

pub use align::{AlignedTable, AlignmentMode, IndexKind, RowKey, Timeline, align};
pub use cputime::cumulative_cpu_time;
pub use integrate::{Summary, integrate};
