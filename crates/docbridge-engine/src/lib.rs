//! Operation engines for docbridge.
//!
//! Every protocol operation ends up in one of the engines below. They work
//! against a [`ResourceContext`]: one resource's descriptor plus the shared
//! [`EngineServices`] (stores, clock, image probe, save filter, timestamp
//! field names).
//!
//! # Engines
//!
//! - [`query`] -- full-collection load, conjunctive filter, stable sort, pagination
//! - [`mutation`] -- document assembly with timestamps, full-replace writes, deletes
//! - [`upload`] -- raw file fields to blob storage and upload descriptors
//! - [`identifier`] -- which id a created or updated record gets
//! - [`pipeline`] -- the create/update sequence tying the above together
//!
//! Callers reach the engines through the [`ResourceHandlers`] capability
//! trait. Its default methods delegate to the engines; implementors override
//! only the operations they need to change.

pub mod clock;
pub mod context;
pub mod error;
pub mod filter;
pub mod handlers;
pub mod identifier;
pub mod mutation;
pub mod pipeline;
pub mod probe;
pub mod query;
pub mod upload;

pub use clock::{Clock, FixedClock, SystemClock};
pub use context::{EngineServices, ResourceContext};
pub use error::{EngineError, EngineResult};
pub use filter::{IdentityFilter, SaveFilter};
pub use handlers::{ResourceHandlers, StandardHandlers};
pub use identifier::{IdSource, ResolvedId};
pub use mutation::SaveInput;
pub use probe::{HeaderProbe, ImageProbe, ImageSize, ProbeError};
pub use query::ListPage;
pub use upload::{stable_public_url, upload_all};

#[cfg(test)]
pub(crate) mod testing;
