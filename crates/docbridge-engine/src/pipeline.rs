//! The create/update sequence.
//!
//! `write` resolves the identifier, uploads every declared file field
//! concurrently, loads the document being replaced (updates only), and hands
//! the lot to `save`. Each step goes through the resource's handlers, so an
//! override of any single step is honoured.

use docbridge_types::{Document, WriteParams};
use tracing::debug;

use crate::context::ResourceContext;
use crate::error::EngineResult;
use crate::handlers::ResourceHandlers;
use crate::mutation::{self, SaveInput};
use crate::upload;

pub async fn write(
    handlers: &dyn ResourceHandlers,
    ctx: &ResourceContext<'_>,
    params: &WriteParams,
    is_new: bool,
) -> EngineResult<Document> {
    let resolved = handlers.resolve_id(ctx, params, is_new).await?;
    let id = resolved.id.as_str();

    let uploads = upload::upload_all(handlers, ctx, &params.data, id).await?;

    let previous = if is_new {
        None
    } else {
        mutation::previous_document(ctx, id).await?
    };
    debug!(
        resource = %ctx.resource.name,
        id,
        is_new,
        uploads = uploads.len(),
        replacing = previous.is_some(),
        "write prepared"
    );

    let input = SaveInput::new(id, params.data.clone(), is_new)
        .with_previous(previous)
        .with_uploads(uploads);
    handlers.save(ctx, input).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Duration;
    use docbridge_types::{RawFile, UploadDescriptor};
    use serde_json::{json, Value};

    use crate::clock::Clock;
    use crate::error::EngineError;
    use crate::handlers::StandardHandlers;
    use crate::probe::fixtures::png_header;
    use crate::testing::{doc, resource, Harness};

    #[tokio::test]
    async fn create_then_update_with_upload() {
        let harness = Harness::new();
        let items = resource("items", &["image"]);
        let ctx = harness.services.context(&items);

        let created = write(&StandardHandlers, &ctx, &WriteParams::new(doc(json!({"title": "x"}))), true)
            .await
            .unwrap();
        let id = created["id"].as_str().unwrap().to_string();
        assert!(created.contains_key("createdAt"));
        assert!(!created.contains_key("image"));

        harness.clock.advance(Duration::seconds(30));
        let mut data = doc(json!({"title": "y"}));
        data.insert(
            "image".into(),
            Value::Array(vec![RawFile::new("c.png", "image/png", png_header(8, 8)).to_entry()]),
        );
        let updated = write(&StandardHandlers, &ctx, &WriteParams::new(data).with_id(id.as_str()), false)
            .await
            .unwrap();

        assert_eq!(updated["id"], json!(id));
        assert_eq!(updated["title"], json!("y"));
        assert_eq!(updated["createdAt"], created["createdAt"]);
        assert_ne!(updated["updatedAt"], created["updatedAt"]);
        let image = updated["image"].as_array().unwrap();
        assert_eq!(image.len(), 1);
        assert_eq!(
            image[0]["src"],
            json!(format!("https://files.test/o/items%2F{id}%2Fimage?alt=media"))
        );
        assert_eq!(image[0]["width"], json!(8));
    }

    #[tokio::test]
    async fn update_without_file_keeps_existing_descriptor() {
        let harness = Harness::new();
        let items = resource("items", &["image"]);
        let ctx = harness.services.context(&items);
        let existing = UploadDescriptor::new("https://old?alt=media", "image/png", harness.clock.now());
        let mut seeded = doc(json!({"id": "i1", "title": "a"}));
        seeded.insert("image".into(), existing.to_field_value());
        harness.documents.seed("items", vec![seeded]).unwrap();

        let updated = write(
            &StandardHandlers,
            &ctx,
            &WriteParams::new(doc(json!({"title": "b"}))).with_id("i1"),
            false,
        )
        .await
        .unwrap();

        assert_eq!(updated["image"], existing.to_field_value());
        assert!(harness.blobs.is_empty());
    }

    struct FixedIds;

    #[async_trait]
    impl ResourceHandlers for FixedIds {
        async fn resolve_id(
            &self,
            _ctx: &ResourceContext<'_>,
            _params: &WriteParams,
            _is_new: bool,
        ) -> EngineResult<crate::identifier::ResolvedId> {
            Ok(crate::identifier::ResolvedId {
                id: "fixed".into(),
                source: crate::identifier::IdSource::Generated,
            })
        }
    }

    #[tokio::test]
    async fn handler_overrides_are_used() {
        let harness = Harness::new();
        let posts = resource("posts", &[]);
        let ctx = harness.services.context(&posts);
        let saved = write(&FixedIds, &ctx, &WriteParams::default(), true).await.unwrap();
        assert_eq!(saved["id"], json!("fixed"));
    }

    #[tokio::test]
    async fn conflict_stops_before_upload() {
        let harness = Harness::new();
        let items = resource("items", &["image"]);
        let ctx = harness.services.context(&items);
        harness.documents.seed("items", vec![doc(json!({"id": "i1"}))]).unwrap();

        let mut data = doc(json!({"id": "i1"}));
        data.insert(
            "image".into(),
            Value::Array(vec![RawFile::new("c.png", "image/png", png_header(1, 1)).to_entry()]),
        );
        let err = write(&StandardHandlers, &ctx, &WriteParams::new(data), true)
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Conflict(_)));
        assert!(harness.blobs.is_empty());
    }
}
