//! Foundation types for docbridge.
//!
//! docbridge translates a resource-oriented CRUD/query protocol into calls
//! against a document store and a blob store. This crate holds the types that
//! every other docbridge crate shares.
//!
//! # Key Types
//!
//! - [`Document`] -- a JSON object stored under a key in a collection
//! - [`ListParams`] / [`ReferenceParams`] -- pagination, sort, and filter input
//! - [`UploadDescriptor`] -- what an uploaded file field becomes in a record
//! - [`RawFile`] -- a file submitted inside record data
//! - [`ResourceSpec`] / [`ResourceDescriptor`] -- per-resource configuration
//! - [`Request`] / [`OperationKind`] -- the closed set of protocol operations
//! - [`OperationResult`] -- the normalized response shapes

pub mod document;
pub mod error;
pub mod query;
pub mod request;
pub mod resource;
pub mod result;
pub mod upload;

pub use document::{document_id, ensure_id, id_from_value, timestamp_value, Document, ID_FIELD, KEY_FIELD};
pub use error::TypeError;
pub use query::{Filter, ListParams, Pagination, ReferenceParams, Sort, SortOrder};
pub use request::{OperationKind, Request, WriteParams};
pub use resource::{normalize_resources, ResourceDescriptor, ResourceSpec, TimestampFieldNames};
pub use result::{DeleteOutcome, OperationResult};
pub use upload::{raw_file_in, RawFile, UploadDescriptor, RAW_FILE_FIELD};
