use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use async_trait::async_trait;
use docbridge_types::{document_id, Document};
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::ids::generate_auto_id;
use crate::traits::{validate_collection, validate_key, BlobStore, DocumentSnapshot, DocumentStore, StoredBlob};

fn poisoned<E: std::fmt::Display>(e: E) -> StoreError {
    StoreError::Backend(format!("lock poisoned: {e}"))
}

// ---------------------------------------------------------------------------
// InMemoryDocumentStore
// ---------------------------------------------------------------------------

/// In-memory document store.
///
/// Intended for tests, embedding, and the CLI. Each collection is a
/// `BTreeMap` so full-collection reads come back in key order. Documents are
/// cloned on read and write.
pub struct InMemoryDocumentStore {
    collections: RwLock<HashMap<String, BTreeMap<String, Document>>>,
}

impl InMemoryDocumentStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
        }
    }

    /// Insert documents into a collection, keyed by their `id` field or by a
    /// generated key when they have none. Returns the keys used.
    pub fn seed<I>(&self, collection: &str, documents: I) -> StoreResult<Vec<String>>
    where
        I: IntoIterator<Item = Document>,
    {
        validate_collection(collection)?;
        let mut map = self.collections.write().map_err(poisoned)?;
        let docs = map.entry(collection.to_string()).or_default();
        let mut keys = Vec::new();
        for document in documents {
            let key = document_id(&document).unwrap_or_else(generate_auto_id);
            validate_key(&key)?;
            docs.insert(key.clone(), document);
            keys.push(key);
        }
        Ok(keys)
    }

    /// Number of documents in a collection.
    pub fn len(&self, collection: &str) -> usize {
        self.collections
            .read()
            .map(|map| map.get(collection).map_or(0, BTreeMap::len))
            .unwrap_or(0)
    }

    /// Returns `true` if no collection holds any document.
    pub fn is_empty(&self) -> bool {
        self.collections
            .read()
            .map(|map| map.values().all(BTreeMap::is_empty))
            .unwrap_or(true)
    }

    /// Sorted list of known collection paths.
    pub fn collections(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .collections
            .read()
            .map(|map| map.keys().cloned().collect())
            .unwrap_or_default();
        names.sort();
        names
    }

    /// Every collection's documents as records (`id` filled from the key).
    pub fn export(&self) -> StoreResult<BTreeMap<String, Vec<Document>>> {
        let map = self.collections.read().map_err(poisoned)?;
        Ok(map
            .iter()
            .map(|(name, docs)| {
                let records = docs
                    .iter()
                    .map(|(key, doc)| DocumentSnapshot::new(key.clone(), doc.clone()).into_record())
                    .collect();
                (name.clone(), records)
            })
            .collect())
    }
}

impl Default for InMemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn prepare_collection(&self, collection: &str) -> StoreResult<()> {
        validate_collection(collection)?;
        let mut map = self.collections.write().map_err(poisoned)?;
        map.entry(collection.to_string()).or_default();
        Ok(())
    }

    async fn get(&self, collection: &str, key: &str) -> StoreResult<Option<DocumentSnapshot>> {
        validate_collection(collection)?;
        validate_key(key)?;
        let map = self.collections.read().map_err(poisoned)?;
        Ok(map
            .get(collection)
            .and_then(|docs| docs.get(key))
            .map(|doc| DocumentSnapshot::new(key, doc.clone())))
    }

    async fn set(&self, collection: &str, key: &str, document: Document) -> StoreResult<()> {
        validate_collection(collection)?;
        validate_key(key)?;
        let mut map = self.collections.write().map_err(poisoned)?;
        map.entry(collection.to_string())
            .or_default()
            .insert(key.to_string(), document);
        debug!(collection, key, "document written");
        Ok(())
    }

    async fn delete(&self, collection: &str, key: &str) -> StoreResult<bool> {
        validate_collection(collection)?;
        validate_key(key)?;
        let mut map = self.collections.write().map_err(poisoned)?;
        Ok(map
            .get_mut(collection)
            .map_or(false, |docs| docs.remove(key).is_some()))
    }

    async fn list(&self, collection: &str) -> StoreResult<Vec<DocumentSnapshot>> {
        validate_collection(collection)?;
        let map = self.collections.read().map_err(poisoned)?;
        Ok(map
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .map(|(key, doc)| DocumentSnapshot::new(key.clone(), doc.clone()))
                    .collect()
            })
            .unwrap_or_default())
    }
}

impl std::fmt::Debug for InMemoryDocumentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let collections = self.collections();
        let documents: usize = collections.iter().map(|c| self.len(c)).sum();
        f.debug_struct("InMemoryDocumentStore")
            .field("collection_count", &collections.len())
            .field("document_count", &documents)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// InMemoryBlobStore
// ---------------------------------------------------------------------------

/// Default base URL for download links issued by [`InMemoryBlobStore`].
pub const DEFAULT_BLOB_BASE_URL: &str = "https://blobs.docbridge.invalid/v0/o";

#[derive(Clone)]
struct BlobEntry {
    bytes: Vec<u8>,
    content_type: String,
}

/// In-memory blob store issuing token-bearing download URLs.
pub struct InMemoryBlobStore {
    blobs: RwLock<HashMap<String, BlobEntry>>,
    base_url: String,
}

impl InMemoryBlobStore {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BLOB_BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            blobs: RwLock::new(HashMap::new()),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Contents and content type of a stored blob.
    pub fn get(&self, path: &str) -> Option<(Vec<u8>, String)> {
        let map = self.blobs.read().ok()?;
        map.get(path)
            .map(|entry| (entry.bytes.clone(), entry.content_type.clone()))
    }

    pub fn contains(&self, path: &str) -> bool {
        self.blobs
            .read()
            .map(|map| map.contains_key(path))
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.blobs.read().map(|map| map.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sorted list of stored blob paths.
    pub fn paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self
            .blobs
            .read()
            .map(|map| map.keys().cloned().collect())
            .unwrap_or_default();
        paths.sort();
        paths
    }
}

impl Default for InMemoryBlobStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BlobStore for InMemoryBlobStore {
    async fn put(&self, path: &str, bytes: Vec<u8>, content_type: &str) -> StoreResult<StoredBlob> {
        if path.is_empty() || path.split('/').any(str::is_empty) {
            return Err(StoreError::InvalidPath(format!("blob {path:?}")));
        }
        let size = bytes.len() as u64;
        let download_url = format!(
            "{}/{}?alt=media&token={}",
            self.base_url,
            encode_component(path),
            generate_auto_id()
        );
        let mut map = self.blobs.write().map_err(poisoned)?;
        map.insert(
            path.to_string(),
            BlobEntry {
                bytes,
                content_type: content_type.to_string(),
            },
        );
        debug!(path, size, "blob written");
        Ok(StoredBlob {
            path: path.to_string(),
            content_type: content_type.to_string(),
            size,
            download_url,
        })
    }

    async fn delete(&self, path: &str) -> StoreResult<bool> {
        let mut map = self.blobs.write().map_err(poisoned)?;
        Ok(map.remove(path).is_some())
    }
}

impl std::fmt::Debug for InMemoryBlobStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryBlobStore")
            .field("base_url", &self.base_url)
            .field("blob_count", &self.len())
            .finish()
    }
}

/// Percent-encode everything except RFC 3986 unreserved characters.
fn encode_component(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for b in s.bytes() {
        if b.is_ascii_alphanumeric() || matches!(b, b'-' | b'.' | b'_' | b'~') {
            out.push(b as char);
        } else {
            out.push_str(&format!("%{b:02X}"));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: serde_json::Value) -> Document {
        value.as_object().cloned().unwrap()
    }

    // -----------------------------------------------------------------------
    // Documents
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn set_then_get() {
        let store = InMemoryDocumentStore::new();
        store.set("posts", "p1", doc(json!({"title": "a"}))).await.unwrap();
        let snap = store.get("posts", "p1").await.unwrap().unwrap();
        assert_eq!(snap.key, "p1");
        assert_eq!(snap.data["title"], json!("a"));
        assert!(store.get("posts", "p2").await.unwrap().is_none());
        assert!(store.get("other", "p1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn set_replaces_whole_document() {
        let store = InMemoryDocumentStore::new();
        store.set("posts", "p1", doc(json!({"a": 1, "b": 2}))).await.unwrap();
        store.set("posts", "p1", doc(json!({"a": 3}))).await.unwrap();
        let snap = store.get("posts", "p1").await.unwrap().unwrap();
        assert_eq!(snap.data, doc(json!({"a": 3})));
    }

    #[tokio::test]
    async fn list_is_key_ordered() {
        let store = InMemoryDocumentStore::new();
        for key in ["c", "a", "b"] {
            store.set("posts", key, doc(json!({}))).await.unwrap();
        }
        let keys: Vec<String> = store
            .list("posts")
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.key)
            .collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
        assert!(store.list("empty").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_reports_existence() {
        let store = InMemoryDocumentStore::new();
        store.set("posts", "p1", doc(json!({}))).await.unwrap();
        assert!(store.delete("posts", "p1").await.unwrap());
        assert!(!store.delete("posts", "p1").await.unwrap());
        assert!(!store.exists("posts", "p1").await.unwrap());
    }

    #[tokio::test]
    async fn invalid_paths_rejected() {
        let store = InMemoryDocumentStore::new();
        assert!(matches!(
            store.set("posts", "a/b", doc(json!({}))).await,
            Err(StoreError::InvalidPath(_))
        ));
        assert!(matches!(
            store.get("", "a").await,
            Err(StoreError::InvalidPath(_))
        ));
    }

    #[tokio::test]
    async fn prepare_creates_empty_collection() {
        let store = InMemoryDocumentStore::new();
        store.prepare_collection("catalog/items").await.unwrap();
        assert_eq!(store.collections(), vec!["catalog/items"]);
        assert!(store.is_empty());
    }

    #[test]
    fn seed_uses_ids_or_generates_keys() {
        let store = InMemoryDocumentStore::new();
        let keys = store
            .seed("posts", vec![doc(json!({"id": "x1"})), doc(json!({"title": "no id"}))])
            .unwrap();
        assert_eq!(keys[0], "x1");
        assert_eq!(keys[1].len(), crate::AUTO_ID_LEN);
        assert_eq!(store.len("posts"), 2);

        let exported = store.export().unwrap();
        assert!(exported["posts"].iter().all(|r| r.contains_key("id")));
    }

    #[test]
    fn generated_ids_are_fresh() {
        let store = InMemoryDocumentStore::new();
        assert_ne!(store.generate_id("posts"), store.generate_id("posts"));
    }

    // -----------------------------------------------------------------------
    // Blobs
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn put_issues_token_url() {
        let blobs = InMemoryBlobStore::with_base_url("https://files.test/o/");
        let stored = blobs
            .put("items/a1/image", vec![1, 2, 3], "image/png")
            .await
            .unwrap();
        assert_eq!(stored.size, 3);
        assert!(stored
            .download_url
            .starts_with("https://files.test/o/items%2Fa1%2Fimage?alt=media&token="));
        assert_eq!(blobs.get("items/a1/image").unwrap(), (vec![1, 2, 3], "image/png".into()));
    }

    #[tokio::test]
    async fn put_replaces_and_delete_removes() {
        let blobs = InMemoryBlobStore::new();
        blobs.put("a/b", vec![1], "text/plain").await.unwrap();
        blobs.put("a/b", vec![2], "text/plain").await.unwrap();
        assert_eq!(blobs.len(), 1);
        assert_eq!(blobs.get("a/b").unwrap().0, vec![2]);
        assert!(blobs.delete("a/b").await.unwrap());
        assert!(!blobs.delete("a/b").await.unwrap());
        assert!(blobs.is_empty());
    }

    #[tokio::test]
    async fn put_rejects_bad_path() {
        let blobs = InMemoryBlobStore::new();
        assert!(blobs.put("", vec![], "x").await.is_err());
        assert!(blobs.put("a//b", vec![], "x").await.is_err());
    }

    #[test]
    fn debug_format() {
        let store = InMemoryDocumentStore::new();
        let debug = format!("{store:?}");
        assert!(debug.contains("InMemoryDocumentStore"));
        assert!(debug.contains("document_count"));
        assert!(format!("{:?}", InMemoryBlobStore::new()).contains("blob_count"));
    }
}
