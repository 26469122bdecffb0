use docbridge_types::{id_from_value, WriteParams, ID_FIELD, KEY_FIELD};
use tracing::debug;

use crate::context::ResourceContext;
use crate::error::{EngineError, EngineResult};

/// Where a resolved identifier came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IdSource {
    DataId,
    ParamsId,
    DataKey,
    ParamsKey,
    Generated,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedId {
    pub id: String,
    pub source: IdSource,
}

/// The first caller-supplied identifier, by precedence:
/// `data.id`, `params.id`, `data.key`, `params.key`.
pub fn supplied_id(params: &WriteParams) -> Option<ResolvedId> {
    let candidates = [
        (params.data.get(ID_FIELD), IdSource::DataId),
        (params.id.as_ref(), IdSource::ParamsId),
        (params.data.get(KEY_FIELD), IdSource::DataKey),
        (params.key.as_ref(), IdSource::ParamsKey),
    ];
    candidates.into_iter().find_map(|(value, source)| {
        value
            .and_then(id_from_value)
            .map(|id| ResolvedId { id, source })
    })
}

/// Decide the identifier of a record being created or updated.
///
/// Falls back to a fresh identifier from the document store. On create, a
/// caller-supplied identifier that already names a stored document is a
/// conflict.
pub async fn resolve_id(
    ctx: &ResourceContext<'_>,
    params: &WriteParams,
    is_new: bool,
) -> EngineResult<ResolvedId> {
    let resolved = match supplied_id(params) {
        Some(resolved) => resolved,
        None => ResolvedId {
            id: ctx.documents().generate_id(ctx.collection()),
            source: IdSource::Generated,
        },
    };
    if resolved.id.is_empty() {
        return Err(EngineError::Validation("ID is required".into()));
    }
    if resolved.id.contains('/') {
        return Err(EngineError::Validation(format!(
            "ID must not contain '/': {}",
            resolved.id
        )));
    }
    if is_new
        && resolved.source != IdSource::Generated
        && ctx.documents().exists(ctx.collection(), &resolved.id).await?
    {
        return Err(EngineError::Conflict(format!(
            "ID already in use: {}",
            ctx.resource.document_path(&resolved.id)
        )));
    }
    debug!(resource = %ctx.resource.name, id = %resolved.id, source = ?resolved.source, "identifier resolved");
    Ok(resolved)
}
