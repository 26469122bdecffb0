use docbridge_store::StoreError;
use docbridge_types::TypeError;
use thiserror::Error;

/// Errors surfaced by the operation engines.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The request is missing something it needs (pagination, reference
    /// target, identifier, a decodable file).
    #[error("validation error: {0}")]
    Validation(String),

    /// A read addressed a record that does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A create addressed an identifier that is already in use.
    #[error("conflict: {0}")]
    Conflict(String),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("invalid input: {0}")]
    Type(#[from] TypeError),
}

impl EngineError {
    /// Short category name, stable across messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) | Self::Type(_) => "validation",
            Self::NotFound(_) => "not_found",
            Self::Conflict(_) => "conflict",
            Self::Store(_) => "store",
        }
    }
}

/// Result alias for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;
