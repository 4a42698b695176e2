//! Error types for svd_compress

use thiserror::Error;

/// Result type alias using the crate's [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by decomposition, channel handling and rank validation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Input dimensionality the channel adapter cannot handle
    #[error("Unsupported array shape {shape:?}: {reason}")]
    UnsupportedShape {
        /// Shape of the rejected input
        shape: Vec<usize>,
        /// What is wrong with it
        reason: &'static str,
    },

    /// Requested rank outside `[1, max]`
    #[error("Invalid rank {k}: must lie in [1, {max}]")]
    InvalidRank {
        /// Requested rank
        k: usize,
        /// Largest admissible rank, `min(m, n)`
        max: usize,
    },

    /// Input the decomposition cannot work with
    #[error(transparent)]
    Numeric(#[from] NumericError),
}

/// Numeric failures of the decomposition itself
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NumericError {
    #[error("Cannot decompose an empty {rows}x{cols} matrix")]
    Empty { rows: usize, cols: usize },

    #[error("Non-finite value {value} at ({row}, {col})")]
    NonFinite { row: usize, col: usize, value: f64 },

    #[error("SVD did not converge within {iterations} iterations")]
    NoConvergence { iterations: usize },

    #[error("Sample at flat index {index} is not representable as f64")]
    SampleConversion { index: usize },
}

impl Error {
    pub(crate) fn shape(shape: &[usize], reason: &'static str) -> Self {
        Error::UnsupportedShape {
            shape: shape.to_vec(),
            reason,
        }
    }
}
