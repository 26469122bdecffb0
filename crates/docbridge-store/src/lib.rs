//! Storage clients for docbridge.
//!
//! docbridge talks to two external services: a document store holding one
//! JSON document per key inside path-addressed collections, and a blob store
//! holding uploaded files. This crate defines both client interfaces and
//! ships in-memory backends for tests, embedding, and the CLI.
//!
//! # Storage Backends
//!
//! - [`DocumentStore`] -- get/set/delete of documents plus full-collection reads
//! - [`BlobStore`] -- put/delete of named blobs with download URLs
//! - [`InMemoryDocumentStore`] / [`InMemoryBlobStore`] -- `HashMap`-based implementations
//!
//! # Design Rules
//!
//! 1. Collections are addressed by `/`-separated paths; keys never contain `/`.
//! 2. `set` is a full replace: the stored document becomes exactly what was written.
//! 3. Full-collection reads return documents in key order.
//! 4. The store never interprets document contents.

pub mod error;
pub mod ids;
pub mod memory;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use ids::{generate_auto_id, AUTO_ID_LEN};
pub use memory::{InMemoryBlobStore, InMemoryDocumentStore};
pub use traits::{validate_collection, validate_key, BlobStore, DocumentSnapshot, DocumentStore, StoredBlob};
