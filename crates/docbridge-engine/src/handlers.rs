use async_trait::async_trait;
use docbridge_types::{DeleteOutcome, Document, ListParams, ReferenceParams, UploadDescriptor, WriteParams};

use crate::context::ResourceContext;
use crate::error::EngineResult;
use crate::identifier::{self, ResolvedId};
use crate::mutation::{self, SaveInput};
use crate::query::{self, ListPage};
use crate::upload;

/// Per-operation capability interface the dispatcher routes through.
///
/// Every method defaults to the standard engine behaviour. Implementors
/// override only what they need to change and inherit the rest:
///
/// ```ignore
/// struct ReadOnlyPosts;
///
/// #[async_trait]
/// impl ResourceHandlers for ReadOnlyPosts {
///     async fn delete(&self, _ctx: &ResourceContext<'_>, id: &str) -> EngineResult<String> {
///         Err(EngineError::Validation(format!("{id} cannot be deleted")))
///     }
/// }
/// ```
#[async_trait]
pub trait ResourceHandlers: Send + Sync {
    async fn list(&self, ctx: &ResourceContext<'_>, params: &ListParams) -> EngineResult<ListPage> {
        query::list(ctx, params).await
    }

    async fn get_one(&self, ctx: &ResourceContext<'_>, id: &str) -> EngineResult<Document> {
        query::get_one(ctx, id).await
    }

    async fn get_many(&self, ctx: &ResourceContext<'_>, ids: &[String]) -> EngineResult<Vec<Document>> {
        query::get_many(ctx, ids).await
    }

    async fn get_many_reference(
        &self,
        ctx: &ResourceContext<'_>,
        params: &ReferenceParams,
    ) -> EngineResult<ListPage> {
        query::get_many_reference(ctx, params).await
    }

    async fn resolve_id(
        &self,
        ctx: &ResourceContext<'_>,
        params: &WriteParams,
        is_new: bool,
    ) -> EngineResult<ResolvedId> {
        identifier::resolve_id(ctx, params, is_new).await
    }

    async fn upload(
        &self,
        ctx: &ResourceContext<'_>,
        field: &str,
        data: &Document,
        id: &str,
    ) -> EngineResult<Option<UploadDescriptor>> {
        upload::upload(ctx, field, data, id).await
    }

    async fn save(&self, ctx: &ResourceContext<'_>, input: SaveInput) -> EngineResult<Document> {
        mutation::save(ctx, input).await
    }

    async fn delete(&self, ctx: &ResourceContext<'_>, id: &str) -> EngineResult<String> {
        mutation::delete(ctx, id).await
    }

    async fn delete_many(&self, ctx: &ResourceContext<'_>, ids: &[String]) -> EngineResult<Vec<DeleteOutcome>> {
        mutation::delete_many(ctx, ids).await
    }
}

/// The engine behaviour, unmodified.
#[derive(Clone, Copy, Debug, Default)]
pub struct StandardHandlers;

impl ResourceHandlers for StandardHandlers {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::error::EngineError;
    use crate::testing::{doc, resource, Harness};
    use serde_json::json;

    /// Counts saves and refuses deletes; everything else is standard.
    #[derive(Default)]
    struct Audited {
        saves: AtomicUsize,
    }

    #[async_trait]
    impl ResourceHandlers for Audited {
        async fn save(&self, ctx: &ResourceContext<'_>, input: SaveInput) -> EngineResult<Document> {
            self.saves.fetch_add(1, Ordering::SeqCst);
            StandardHandlers.save(ctx, input).await
        }

        async fn delete(&self, _ctx: &ResourceContext<'_>, id: &str) -> EngineResult<String> {
            Err(EngineError::Validation(format!("{id} is protected")))
        }
    }

    #[tokio::test]
    async fn standard_handlers_delegate_to_engines() {
        let harness = Harness::new();
        let posts = resource("posts", &[]);
        let ctx = harness.services.context(&posts);
        harness
            .documents
            .seed("posts", vec![doc(json!({"id": "a", "title": "x"}))])
            .unwrap();

        let record = StandardHandlers.get_one(&ctx, "a").await.unwrap();
        assert_eq!(record["title"], json!("x"));

        let page = StandardHandlers.list(&ctx, &ListParams::page(1, 10)).await.unwrap();
        assert_eq!(page.ids, vec!["a".to_string()]);
    }

    #[tokio::test]
    async fn overrides_replace_only_their_operation() {
        let harness = Harness::new();
        let posts = resource("posts", &[]);
        let ctx = harness.services.context(&posts);
        let handlers = Audited::default();

        handlers
            .save(&ctx, SaveInput::new("a", doc(json!({"title": "x"})), true))
            .await
            .unwrap();
        assert_eq!(handlers.saves.load(Ordering::SeqCst), 1);

        let err = handlers.delete(&ctx, "a").await.unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));

        // Inherited default still works.
        assert_eq!(handlers.get_one(&ctx, "a").await.unwrap()["title"], json!("x"));
        let outcomes = handlers.delete_many(&ctx, &["a".to_string()]).await.unwrap();
        assert!(outcomes[0].deleted);
    }
}
