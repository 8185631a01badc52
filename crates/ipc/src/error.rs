//! Error types for parameter operations.

use crate::params::{ParamId, ParamKind};

/// Errors that can occur when parsing or assigning parameters.
#[derive(Debug, thiserror::Error)]
pub enum ParamError {
    #[error("Unknown parameter: {0}")]
    UnknownParam(String),

    #[error("Invalid color: {0:?} (expected #rrggbb or #rgb)")]
    InvalidColor(String),

    #[error("Parameter {id} expects a {expected:?} value")]
    TypeMismatch { id: ParamId, expected: ParamKind },

    #[error("Failed to (de)serialize parameters: {0}")]
    Serialize(#[from] serde_json::Error),
}
