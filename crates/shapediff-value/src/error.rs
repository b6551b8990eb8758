use thiserror::Error;

use crate::types::Type;

/// Errors produced when building or mutating values.
#[derive(Debug, Error)]
pub enum ValueError {
    #[error("json decode error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("expected {expected}, got {actual}")]
    UnexpectedKind { expected: &'static str, actual: String },

    #[error("cannot assign through a nil {0}")]
    NilReference(Type),

    #[error("index {index} out of range for length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("no field named {field} on {name}")]
    NoSuchField { name: String, field: String },
}

/// Result alias for value operations.
pub type ValueResult<T> = Result<T, ValueError>;
