//! Error types for trustweave.
//!
//! All errors are strongly typed using thiserror. Public engine operations
//! never surface these to callers (a trust query must always be answered);
//! they are used internally, by the baseline and configuration loaders, and
//! by custom storage backends.

use thiserror::Error;

use crate::storage::StorageError;

/// Validation errors that occur during input validation.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Agent id cannot be empty")]
    EmptyAgentId,

    #[error("Unrecognized outcome '{value}' (expected positive, negative or neutral)")]
    UnrecognizedOutcome {
        value: String,
    },

    #[error("Magnitude must be a finite number, got {value}")]
    NonFiniteMagnitude {
        value: f64,
    },

    #[error("Score {value} for '{field}' is out of range [0.0, 1.0]")]
    ScoreOutOfRange {
        field: String,
        value: f64,
    },

    #[error("Combination weights must be non-negative and sum to 1.0 (sum = {sum})")]
    InvalidCombinationWeights {
        sum: f64,
    },

    #[error("Configuration field '{field}' must be positive, got {value}")]
    NonPositive {
        field: String,
        value: f64,
    },
}

/// Errors raised while reading a baseline document.
#[derive(Debug, Error)]
pub enum BaselineError {
    #[error("Failed to read baseline source '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed baseline document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid baseline document: {reason}")]
    InvalidShape {
        reason: String,
    },
}

/// Top-level error type for trustweave.
#[derive(Debug, Error)]
pub enum TrustError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Baseline error: {0}")]
    Baseline(#[from] BaselineError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Malformed configuration: {0}")]
    Config(#[from] serde_json::Error),

    #[error("Export failed: {0}")]
    Export(#[from] std::io::Error),
}

impl TrustError {
    /// Returns true if this is a validation error.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Returns true if this is a storage error.
    #[must_use]
    pub const fn is_storage(&self) -> bool {
        matches!(self, Self::Storage(_))
    }
}

/// Result type alias for trustweave operations.
pub type TrustResult<T> = Result<T, TrustError>;
