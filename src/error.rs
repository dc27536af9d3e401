//! Error types for the segmentation crate

use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while scaling, clustering or validating
#[derive(Error, Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Error {
    /// A feature column has zero variance and cannot be standardized
    #[error("column {column} has zero variance and cannot be standardized")]
    DegenerateColumn {
        /// Index of the constant column
        column: usize,
    },

    /// Requested cluster count lies outside `[1, n_samples]`
    #[error("invalid number of clusters k={k}: must be in [1, {n_samples}]")]
    InvalidK {
        /// Requested number of clusters
        k: usize,
        /// Number of rows available
        n_samples: usize,
    },

    /// A group is too small for an analysis-of-variance test
    #[error("group {group} has {size} member(s); at least 2 are required")]
    InsufficientGroups {
        /// Offending group (cluster id)
        group: usize,
        /// Number of members in the group
        size: usize,
    },

    /// Invalid input parameters
    #[error("Invalid parameter: {message}")]
    InvalidParameter {
        /// Error message
        message: String,
    },

    /// Empty or invalid data
    #[error("Invalid data: {message}")]
    InvalidData {
        /// Error message
        message: String,
    },

    /// Array dimensions are inconsistent
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected dimension
        expected: usize,
        /// Actual dimension
        actual: usize,
    },

    /// Mathematical computation error
    #[error("Computation error: {message}")]
    ComputationError {
        /// Error message
        message: String,
    },
}

impl Error {
    /// Create a new InvalidParameter error
    pub fn invalid_parameter(message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            message: message.into(),
        }
    }

    /// Create a new InvalidData error
    pub fn invalid_data(message: impl Into<String>) -> Self {
        Self::InvalidData {
            message: message.into(),
        }
    }

    /// Create a new ComputationError
    pub fn computation_error(message: impl Into<String>) -> Self {
        Self::ComputationError {
            message: message.into(),
        }
    }
}
