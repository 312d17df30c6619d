//! Error types for the quarry crate.

use thiserror::Error;

/// Errors that can occur when building or serializing queries.
///
/// Most variants describe structurally invalid input and are raised at the
/// call that introduced it; see [`QueryError::is_invalid_query`]. The tree
/// built so far stays valid after any of them.
#[derive(Debug, Error)]
pub enum QueryError {
    /// Field name was empty or whitespace.
    #[error("field name must not be empty")]
    EmptyField,

    /// Operand was an empty string.
    #[error("value for field '{field}' must not be empty")]
    EmptyValue { field: String },

    /// Numeric operand was NaN or infinite.
    #[error("value for field '{field}' must be a finite number")]
    NonFiniteNumber { field: String },

    /// Similarity weight was zero, negative or not finite.
    #[error("similarity weight for field '{field}' must be positive, got {weight}")]
    InvalidBoost { field: String, weight: f64 },

    /// Boost attached to an operator that does not rank.
    #[error("operator '{op}' on field '{field}' does not accept a similarity weight")]
    BoostNotAllowed { field: String, op: &'static str },

    /// Date offset amount was negative.
    #[error("date offset must not be negative, got {amount}")]
    NegativeOffset { amount: i64 },

    /// Date unit tag was not recognized.
    #[error("unknown date unit '{0}'")]
    UnknownUnit(String),

    /// Range lower bound was greater than its upper bound.
    #[error("range on field '{field}' has lower bound above upper bound")]
    InvertedRange { field: String },

    /// Operand shape does not fit the operator: a bound pair on a
    /// single-value operator.
    #[error("operator '{op}' on field '{field}' takes a single operand")]
    OperandMismatch { field: String, op: &'static str },

    /// Content type path was empty.
    #[error("content type must not be empty")]
    EmptyContentType,

    /// The active serializer cannot produce the requested output.
    #[error("{backend} serializer does not support {operation}")]
    Unsupported {
        backend: &'static str,
        operation: &'static str,
    },

    /// Configuration document could not be parsed as YAML.
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_yaml::Error),

    /// JSON encoding or decoding failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl QueryError {
    /// Returns `true` if the caller supplied structurally invalid input.
    pub fn is_invalid_query(&self) -> bool {
        matches!(
            self,
            QueryError::EmptyField
                | QueryError::EmptyValue { .. }
                | QueryError::NonFiniteNumber { .. }
                | QueryError::InvalidBoost { .. }
                | QueryError::BoostNotAllowed { .. }
                | QueryError::NegativeOffset { .. }
                | QueryError::UnknownUnit(_)
                | QueryError::InvertedRange { .. }
                | QueryError::OperandMismatch { .. }
                | QueryError::EmptyContentType
        )
    }

    /// Returns `true` if a serializer refused the requested output form.
    pub fn is_unsupported(&self) -> bool {
        matches!(self, QueryError::Unsupported { .. })
    }
}

/// Result type for quarry operations.
pub type Result<T> = std::result::Result<T, QueryError>;
