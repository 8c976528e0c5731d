//! Classification: continuous samples to discrete categories.
//!
//! # Invariants
//! - Table bounds are strictly increasing and finite; checked at construction.
//! - A value equal to a bound belongs to the band above it.
//! - NaN or infinite samples are rejected, never bucketed.

mod table;

pub use table::{ThresholdTable, classify};

/// Malformed threshold table, detected when the table is built.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("threshold table has no bands")]
    EmptyTable,
    #[error("bound {index} is not finite: {bound}")]
    NonFiniteBound { index: usize, bound: f64 },
    #[error("bound {index} ({bound}) is not greater than the previous bound ({previous})")]
    NotIncreasing {
        index: usize,
        previous: f64,
        bound: f64,
    },
}

/// A sample that cannot be classified.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum ClassifyError {
    #[error("noise sample is not finite: {value}")]
    NumericAnomaly { value: f64 },
}

pub fn crate_info() -> &'static str {
    "tilescape-classify v0.1.0"
}
