use thiserror::Error;

/// Errors produced while parsing or normalizing docbridge types.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid params for {operation}: {reason}")]
    InvalidParams {
        operation: &'static str,
        reason: String,
    },

    #[error("invalid file in field {field}: {reason}")]
    InvalidFile { field: String, reason: String },

    #[error("name is missing from resource {0}")]
    MissingName(String),

    #[error("duplicate resource name: {0}")]
    DuplicateResource(String),
}
