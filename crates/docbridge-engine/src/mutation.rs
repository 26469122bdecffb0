//! Document assembly, writes, and deletes.

use docbridge_types::{document_id, ensure_id, timestamp_value, DeleteOutcome, Document, UploadDescriptor};
use futures::future::join_all;
use tracing::{debug, warn};

use crate::context::ResourceContext;
use crate::error::{EngineError, EngineResult};

/// Everything `save` needs to assemble and write one record.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SaveInput {
    pub id: String,
    pub data: Document,
    /// Stored document being replaced, if any.
    pub previous: Option<Document>,
    /// New upload descriptors, keyed by field name.
    pub uploads: Vec<(String, UploadDescriptor)>,
    pub is_new: bool,
}

impl SaveInput {
    pub fn new(id: impl Into<String>, data: Document, is_new: bool) -> Self {
        Self {
            id: id.into(),
            data,
            previous: None,
            uploads: Vec::new(),
            is_new,
        }
    }

    pub fn with_previous(mut self, previous: Option<Document>) -> Self {
        self.previous = previous;
        self
    }

    pub fn with_uploads(mut self, uploads: Vec<(String, UploadDescriptor)>) -> Self {
        self.uploads = uploads;
        self
    }
}

/// Assemble the record and write it as a full replace.
///
/// The stored document is `previous`, overlaid by the submitted data, then by
/// the new upload descriptors, so an uploaded field always replaces whatever
/// the data carried for it. An `id` that is not a usable identifier is
/// replaced by the resolved one. `updatedAt` is always the current time; `createdAt`
/// is set on creation and carried over from `previous` afterwards. The save
/// filter only affects what is written; the assembled document is returned.
pub async fn save(ctx: &ResourceContext<'_>, input: SaveInput) -> EngineResult<Document> {
    let SaveInput {
        id,
        data,
        previous,
        uploads,
        is_new,
    } = input;
    let names = ctx.timestamps();
    let now = timestamp_value(ctx.now());
    let previous_created = previous
        .as_ref()
        .and_then(|prev| prev.get(&names.created_at))
        .filter(|value| !value.is_null())
        .cloned();

    let mut document = previous.unwrap_or_default();
    document.extend(data);
    for (field, descriptor) in &uploads {
        document.insert(field.clone(), descriptor.to_field_value());
    }
    document.insert(names.updated_at.clone(), now.clone());
    if is_new {
        document.insert(names.created_at.clone(), now);
    } else if let Some(created) = previous_created {
        document.insert(names.created_at.clone(), created);
    }
    ensure_id(&mut document, &id);

    let key = document_id(&document).unwrap_or(id);
    let filtered = ctx.services.save_filter.filter(ctx.resource, document.clone());
    ctx.documents().set(ctx.collection(), &key, filtered).await?;
    debug!(
        resource = %ctx.resource.name,
        id = %key,
        is_new,
        uploads = uploads.len(),
        "document saved"
    );
    Ok(document)
}

/// The stored document `id` currently refers to, if any.
pub async fn previous_document(ctx: &ResourceContext<'_>, id: &str) -> EngineResult<Option<Document>> {
    Ok(ctx
        .documents()
        .get(ctx.collection(), id)
        .await?
        .map(|snap| snap.data))
}

/// Delete one record and, best effort, the blobs of its upload fields.
///
/// Blob cleanup runs concurrently; failures are logged and do not prevent
/// the document delete. Deleting a missing record is not an error.
pub async fn delete(ctx: &ResourceContext<'_>, id: &str) -> EngineResult<String> {
    if id.is_empty() {
        return Err(EngineError::Validation("ID is required".into()));
    }
    remove_blobs(ctx, id).await;
    let existed = ctx.documents().delete(ctx.collection(), id).await?;
    debug!(resource = %ctx.resource.name, id, existed, "document deleted");
    Ok(id.to_string())
}

async fn remove_blobs(ctx: &ResourceContext<'_>, id: &str) {
    let paths: Vec<String> = ctx
        .resource
        .upload_fields
        .iter()
        .map(|field| ctx.resource.blob_path(id, field))
        .collect();
    let results = join_all(paths.iter().map(|path| ctx.blobs().delete(path))).await;
    for (path, result) in paths.iter().zip(results) {
        if let Err(e) = result {
            warn!(resource = %ctx.resource.name, %path, error = %e, "blob cleanup failed");
        }
    }
}

/// Delete every id concurrently. Outcomes are reported per id, in input
/// order; one failure does not abort the others.
pub async fn delete_many(ctx: &ResourceContext<'_>, ids: &[String]) -> EngineResult<Vec<DeleteOutcome>> {
    let outcomes = join_all(ids.iter().map(|id| async move {
        if id.is_empty() {
            return DeleteOutcome::failed(id.as_str(), "ID is required");
        }
        remove_blobs(ctx, id).await;
        match ctx.documents().delete(ctx.collection(), id).await {
            Ok(true) => DeleteOutcome::deleted(id.as_str()),
            Ok(false) => DeleteOutcome::missing(id.as_str()),
            Err(e) => DeleteOutcome::failed(id.as_str(), e.to_string()),
        }
    }))
    .await;

    let failed = outcomes.iter().filter(|o| o.is_failure()).count();
    if failed > 0 {
        warn!(resource = %ctx.resource.name, failed, requested = ids.len(), "batch delete incomplete");
    } else {
        debug!(resource = %ctx.resource.name, requested = ids.len(), "batch delete finished");
    }
    Ok(outcomes)
}
