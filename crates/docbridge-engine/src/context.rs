use std::sync::Arc;

use chrono::{DateTime, Utc};
use docbridge_store::{BlobStore, DocumentStore};
use docbridge_types::{ResourceDescriptor, TimestampFieldNames};

use crate::clock::{Clock, SystemClock};
use crate::filter::{IdentityFilter, SaveFilter};
use crate::probe::{HeaderProbe, ImageProbe};

/// Collaborators shared by every resource.
#[derive(Clone)]
pub struct EngineServices {
    pub documents: Arc<dyn DocumentStore>,
    pub blobs: Arc<dyn BlobStore>,
    pub clock: Arc<dyn Clock>,
    pub probe: Arc<dyn ImageProbe>,
    pub save_filter: Arc<dyn SaveFilter>,
    pub timestamps: TimestampFieldNames,
}

impl EngineServices {
    /// Services with the system clock, header-based image probe, identity
    /// save filter, and default timestamp field names.
    pub fn new(documents: Arc<dyn DocumentStore>, blobs: Arc<dyn BlobStore>) -> Self {
        Self {
            documents,
            blobs,
            clock: Arc::new(SystemClock),
            probe: Arc::new(HeaderProbe),
            save_filter: Arc::new(IdentityFilter),
            timestamps: TimestampFieldNames::default(),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_probe(mut self, probe: Arc<dyn ImageProbe>) -> Self {
        self.probe = probe;
        self
    }

    pub fn with_save_filter(mut self, filter: Arc<dyn SaveFilter>) -> Self {
        self.save_filter = filter;
        self
    }

    pub fn with_timestamps(mut self, timestamps: TimestampFieldNames) -> Self {
        self.timestamps = timestamps;
        self
    }

    /// Bind these services to one resource.
    pub fn context<'a>(&'a self, resource: &'a ResourceDescriptor) -> ResourceContext<'a> {
        ResourceContext {
            resource,
            services: self,
        }
    }
}

impl std::fmt::Debug for EngineServices {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineServices")
            .field("timestamps", &self.timestamps)
            .finish_non_exhaustive()
    }
}

/// One resource's view of the engine services.
#[derive(Clone, Copy, Debug)]
pub struct ResourceContext<'a> {
    pub resource: &'a ResourceDescriptor,
    pub services: &'a EngineServices,
}

impl<'a> ResourceContext<'a> {
    /// The collection path documents of this resource live under.
    pub fn collection(&self) -> &'a str {
        &self.resource.storage_path
    }

    pub fn documents(&self) -> &'a dyn DocumentStore {
        self.services.documents.as_ref()
    }

    pub fn blobs(&self) -> &'a dyn BlobStore {
        self.services.blobs.as_ref()
    }

    pub fn timestamps(&self) -> &'a TimestampFieldNames {
        &self.services.timestamps
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.services.clock.now()
    }
}
