use std::sync::Arc;

use chrono::{TimeZone, Utc};
use docbridge_store::{InMemoryBlobStore, InMemoryDocumentStore};
use docbridge_types::{Document, ResourceDescriptor, ResourceSpec};
use serde_json::Value;

use crate::clock::FixedClock;
use crate::context::EngineServices;

pub struct Harness {
    pub documents: Arc<InMemoryDocumentStore>,
    pub blobs: Arc<InMemoryBlobStore>,
    pub clock: Arc<FixedClock>,
    pub services: EngineServices,
}

impl Harness {
    pub fn new() -> Self {
        let documents = Arc::new(InMemoryDocumentStore::new());
        let blobs = Arc::new(InMemoryBlobStore::with_base_url("https://files.test/o"));
        let clock = Arc::new(FixedClock::new(
            Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap(),
        ));
        let services = EngineServices::new(documents.clone(), blobs.clone()).with_clock(clock.clone());
        Self {
            documents,
            blobs,
            clock,
            services,
        }
    }
}

pub fn doc(value: Value) -> Document {
    value.as_object().cloned().expect("test document must be an object")
}

pub fn resource(name: &str, upload_fields: &[&str]) -> ResourceDescriptor {
    ResourceSpec::detailed(name, None, upload_fields)
        .normalize()
        .expect("valid test resource")
}
