pub mod ensemble;
pub mod erm;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Role of one observation row inside a regression fit. The partition vector
/// always has exactly one entry per matrix row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RowRole {
    /// Dropped from this fit entirely.
    Excluded,
    /// Used to fit the coefficients.
    Train,
    /// Held out for internal validation.
    Holdout,
}

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("partition length {partition} does not match row count {rows}")]
    PartitionMismatch { partition: usize, rows: usize },

    #[error("property length {property} does not match row count {rows}")]
    PropertyMismatch { property: usize, rows: usize },

    #[error("only {available} usable descriptor columns for a {requested}-descriptor model")]
    TooFewDescriptors { available: usize, requested: usize },
}
