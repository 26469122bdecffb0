//! Protocol dispatcher for docbridge.
//!
//! An [`Adapter`] answers the eight CRUD/query operations of an admin
//! front-end protocol for a fixed set of resources, each backed by a
//! collection in a [`DocumentStore`](docbridge_store::DocumentStore) and, for
//! declared upload fields, a [`BlobStore`](docbridge_store::BlobStore).
//!
//! # Key Types
//!
//! - [`AdapterBuilder`] -- wires stores, configuration and hooks; `build()`
//!   runs the initialization phase
//! - [`Adapter`] -- `dispatch` for typed requests, `dispatch_raw` for
//!   string-tagged ones
//! - [`AdapterConfig`] -- resources, timestamp field names, init timeout (TOML)
//! - [`InlineUploads`] -- embeds submitted files as data URLs on update
//!
//! # Design Rules
//!
//! 1. The resource list is normalized and every collection prepared before an
//!    adapter exists. There is no per-call readiness check.
//! 2. Unrecognized operation types never fail: they log and return `{data: []}`.
//! 3. The adapter keeps no record state; every read goes to the store.

pub mod adapter;
pub mod builder;
pub mod config;
pub mod error;
pub mod inline;
pub mod registry;

pub use adapter::Adapter;
pub use builder::AdapterBuilder;
pub use config::{AdapterConfig, DEFAULT_INIT_TIMEOUT_MS};
pub use error::{AdapterError, AdapterResult};
pub use inline::InlineUploads;
pub use registry::ResourceRegistry;
