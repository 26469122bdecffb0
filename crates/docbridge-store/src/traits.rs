use async_trait::async_trait;
use docbridge_types::{ensure_id, Document};

use crate::error::{StoreError, StoreResult};
use crate::ids::generate_auto_id;

/// A document as read from a collection, together with its storage key.
#[derive(Clone, Debug, PartialEq)]
pub struct DocumentSnapshot {
    pub key: String,
    pub data: Document,
}

impl DocumentSnapshot {
    pub fn new(key: impl Into<String>, data: Document) -> Self {
        Self {
            key: key.into(),
            data,
        }
    }

    /// The document as a record: `id` filled from the key when missing.
    pub fn into_record(self) -> Document {
        let mut data = self.data;
        ensure_id(&mut data, &self.key);
        data
    }
}

/// Metadata returned by a blob write.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredBlob {
    pub path: String,
    pub content_type: String,
    pub size: u64,
    /// Download URL as issued by the store. May carry access tokens in its
    /// query string.
    pub download_url: String,
}

/// Document database client.
///
/// Implementations must satisfy these invariants:
/// - `set` replaces the whole document at `collection/key`.
/// - `list` returns every document in the collection, ordered by key.
/// - Reads of a missing document return `Ok(None)`, not an error.
/// - All backend errors are propagated, never silently ignored.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Make a collection ready for use.
    ///
    /// Called once per collection before any other operation on it. The
    /// default does nothing.
    async fn prepare_collection(&self, collection: &str) -> StoreResult<()> {
        validate_collection(collection)
    }

    /// Read one document.
    async fn get(&self, collection: &str, key: &str) -> StoreResult<Option<DocumentSnapshot>>;

    /// Write (create or fully replace) one document.
    async fn set(&self, collection: &str, key: &str, document: Document) -> StoreResult<()>;

    /// Delete one document. Returns `true` if it existed.
    async fn delete(&self, collection: &str, key: &str) -> StoreResult<bool>;

    /// Read every document in a collection.
    async fn list(&self, collection: &str) -> StoreResult<Vec<DocumentSnapshot>>;

    /// Check whether a document exists.
    ///
    /// Default implementation calls `get()`. Backends may override for a
    /// cheaper existence probe.
    async fn exists(&self, collection: &str, key: &str) -> StoreResult<bool> {
        Ok(self.get(collection, key).await?.is_some())
    }

    /// Generate a fresh identifier for a new document in `collection`.
    fn generate_id(&self, _collection: &str) -> String {
        generate_auto_id()
    }
}

/// Object storage client.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `bytes` at `path`, replacing any existing blob.
    async fn put(&self, path: &str, bytes: Vec<u8>, content_type: &str) -> StoreResult<StoredBlob>;

    /// Delete the blob at `path`. Returns `true` if it existed.
    async fn delete(&self, path: &str) -> StoreResult<bool>;
}

/// Reject empty collection paths and paths with empty segments.
pub fn validate_collection(collection: &str) -> StoreResult<()> {
    if collection.is_empty() || collection.split('/').any(str::is_empty) {
        return Err(StoreError::InvalidPath(format!("collection {collection:?}")));
    }
    Ok(())
}

/// Reject empty keys and keys containing `/`.
pub fn validate_key(key: &str) -> StoreResult<()> {
    if key.is_empty() || key.contains('/') {
        return Err(StoreError::InvalidPath(format!("key {key:?}")));
    }
    Ok(())
}
