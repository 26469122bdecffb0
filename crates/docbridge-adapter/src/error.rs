use std::time::Duration;

use docbridge_engine::EngineError;
use docbridge_store::StoreError;
use docbridge_types::TypeError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("unknown resource: {0}")]
    UnknownResource(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("initialization of '{resource}' timed out after {timeout:?}")]
    InitTimeout { resource: String, timeout: Duration },

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("invalid input: {0}")]
    Type(#[from] TypeError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AdapterError {
    /// Short machine-readable category, e.g. for CLI output.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UnknownResource(_) => "unknown_resource",
            Self::Config(_) | Self::InitTimeout { .. } => "config",
            Self::Engine(e) => e.kind(),
            Self::Type(_) => "validation",
            Self::Store(_) | Self::Io(_) => "store",
        }
    }
}

pub type AdapterResult<T> = Result<T, AdapterError>;
