//! Experiment harness: repeated BB84 sessions over parameter grids and the
//! statistics derived from them.

pub mod stats;
pub mod sweep;
pub mod table;

pub use stats::{ConfidenceInterval, confidence_interval, critical_value};
pub use sweep::{
    ExperimentRow, Metric, derive_seed, mismatch_rows, sweep_mismatch,
    sweep_undetected_probability, undetected_rows,
};
pub use table::{AggregateRow, AggregateTable};
