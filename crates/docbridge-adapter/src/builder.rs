use std::sync::Arc;
use std::time::Instant;

use docbridge_engine::{Clock, EngineServices, ImageProbe, ResourceHandlers, SaveFilter, StandardHandlers};
use docbridge_store::{BlobStore, DocumentStore};
use tracing::{debug, info};

use crate::adapter::Adapter;
use crate::config::AdapterConfig;
use crate::error::{AdapterError, AdapterResult};
use crate::inline::InlineUploads;
use crate::registry::ResourceRegistry;

/// Assembles an [`Adapter`] and runs its one-time initialization.
pub struct AdapterBuilder {
    config: AdapterConfig,
    services: EngineServices,
    handlers: Arc<dyn ResourceHandlers>,
    inline_uploads: Option<InlineUploads>,
}

impl AdapterBuilder {
    pub fn new(
        documents: Arc<dyn DocumentStore>,
        blobs: Arc<dyn BlobStore>,
        config: AdapterConfig,
    ) -> Self {
        let services =
            EngineServices::new(documents, blobs).with_timestamps(config.timestamp_fields.clone());
        Self {
            config,
            services,
            handlers: Arc::new(StandardHandlers),
            inline_uploads: None,
        }
    }

    /// Replace the per-operation handlers for every resource.
    pub fn handlers(mut self, handlers: Arc<dyn ResourceHandlers>) -> Self {
        self.handlers = handlers;
        self
    }

    pub fn save_filter(mut self, filter: Arc<dyn SaveFilter>) -> Self {
        self.services = self.services.with_save_filter(filter);
        self
    }

    pub fn probe(mut self, probe: Arc<dyn ImageProbe>) -> Self {
        self.services = self.services.with_probe(probe);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.services = self.services.with_clock(clock);
        self
    }

    pub fn inline_uploads(mut self, inline: InlineUploads) -> Self {
        self.inline_uploads = Some(inline);
        self
    }

    /// Normalize the resource list and prepare every collection.
    ///
    /// The whole phase is bounded by the configured init timeout. The adapter
    /// is only returned once every resource is ready.
    pub async fn build(self) -> AdapterResult<Adapter> {
        let registry = ResourceRegistry::from_specs(&self.config.resources)?;
        let timeout = self.config.init_timeout();
        let started = Instant::now();

        for resource in registry.iter() {
            let remaining = timeout.saturating_sub(started.elapsed());
            tokio::time::timeout(
                remaining,
                self.services.documents.prepare_collection(&resource.storage_path),
            )
            .await
            .map_err(|_| AdapterError::InitTimeout {
                resource: resource.name.clone(),
                timeout,
            })??;
            debug!(resource = %resource.name, path = %resource.storage_path, "collection ready");
        }

        info!(
            resources = registry.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            inline_uploads = self.inline_uploads.is_some(),
            "adapter initialized"
        );
        Ok(Adapter::new(registry, self.services, self.handlers, self.inline_uploads))
    }
}

impl std::fmt::Debug for AdapterBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdapterBuilder")
            .field("config", &self.config)
            .field("inline_uploads", &self.inline_uploads)
            .finish_non_exhaustive()
    }
}
