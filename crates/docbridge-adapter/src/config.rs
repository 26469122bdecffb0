use std::path::Path;
use std::time::Duration;

use docbridge_types::{ResourceSpec, TimestampFieldNames};
use serde::{Deserialize, Serialize};

use crate::error::{AdapterError, AdapterResult};

/// Default bound on the initialization phase.
pub const DEFAULT_INIT_TIMEOUT_MS: u64 = 10_000;

/// Declarative adapter configuration.
///
/// ```toml
/// init_timeout_ms = 10000
/// resources = ["posts", { name = "items", path = "catalog/items", upload_fields = ["image"] }]
///
/// [timestamp_fields]
/// created_at = "createdAt"
/// updated_at = "updatedAt"
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdapterConfig {
    /// Upper bound on preparing every collection, in milliseconds.
    pub init_timeout_ms: u64,
    pub timestamp_fields: TimestampFieldNames,
    pub resources: Vec<ResourceSpec>,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            init_timeout_ms: DEFAULT_INIT_TIMEOUT_MS,
            timestamp_fields: TimestampFieldNames::default(),
            resources: Vec::new(),
        }
    }
}

impl AdapterConfig {
    pub fn new<I, S>(resources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<ResourceSpec>,
    {
        Self {
            resources: resources.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    pub fn with_resource(mut self, spec: impl Into<ResourceSpec>) -> Self {
        self.resources.push(spec.into());
        self
    }

    pub fn with_timestamp_fields(mut self, fields: TimestampFieldNames) -> Self {
        self.timestamp_fields = fields;
        self
    }

    pub fn with_init_timeout(mut self, timeout: Duration) -> Self {
        self.init_timeout_ms = timeout.as_millis().try_into().unwrap_or(u64::MAX);
        self
    }

    pub fn init_timeout(&self) -> Duration {
        Duration::from_millis(self.init_timeout_ms)
    }

    pub fn from_toml_str(source: &str) -> AdapterResult<Self> {
        toml::from_str(source).map_err(|e| AdapterError::Config(e.to_string()))
    }

    pub fn load(path: impl AsRef<Path>) -> AdapterResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
            .map_err(|e| AdapterError::Config(format!("{}: {e}", path.display())))
    }
}
