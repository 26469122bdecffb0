use docbridge_types::{raw_file_in, Document, UploadDescriptor};
use futures::future::join_all;
use tracing::{debug, warn};

use crate::context::ResourceContext;
use crate::error::EngineResult;
use crate::handlers::ResourceHandlers;

/// Stable public URL for a stored blob: the download URL without its query
/// string (which may carry a short-lived token), requesting the media body.
pub fn stable_public_url(download_url: &str) -> String {
    let base = download_url.split('?').next().unwrap_or(download_url);
    format!("{base}?alt=media")
}

/// Store the file submitted for `field` and describe it.
///
/// Returns `Ok(None)` when `data` carries no file for the field; the field's
/// existing value is then left alone. Image dimensions are probed on a best
/// effort basis.
pub async fn upload(
    ctx: &ResourceContext<'_>,
    field: &str,
    data: &Document,
    id: &str,
) -> EngineResult<Option<UploadDescriptor>> {
    let Some(file) = raw_file_in(data, field)? else {
        return Ok(None);
    };
    let path = ctx.resource.blob_path(id, field);
    let stored = ctx
        .blobs()
        .put(&path, file.data.clone(), &file.mime_type)
        .await?;
    let mut descriptor = UploadDescriptor::new(
        stable_public_url(&stored.download_url),
        file.mime_type.clone(),
        ctx.now(),
    );
    if file.is_image() {
        match ctx.services.probe.probe(&file, &descriptor.src).await {
            Ok(size) => descriptor = descriptor.with_dimensions(size.width, size.height),
            Err(e) => warn!(
                resource = %ctx.resource.name,
                field,
                error = %e,
                "failed to get image dimensions"
            ),
        }
    }
    debug!(resource = %ctx.resource.name, %path, size = stored.size, "file uploaded");
    Ok(Some(descriptor))
}

/// Run the handlers' upload step for every declared upload field
/// concurrently.
///
/// Results come back in declared-field order, skipping fields without a new
/// file. The first failed upload fails the whole call.
pub async fn upload_all(
    handlers: &dyn ResourceHandlers,
    ctx: &ResourceContext<'_>,
    data: &Document,
    id: &str,
) -> EngineResult<Vec<(String, UploadDescriptor)>> {
    let results = join_all(
        ctx.resource
            .upload_fields
            .iter()
            .map(|field| async move { (field, handlers.upload(ctx, field, data, id).await) }),
    )
    .await;

    let mut uploads = Vec::new();
    for (field, result) in results {
        if let Some(descriptor) = result? {
            uploads.push((field.clone(), descriptor));
        }
    }
    Ok(uploads)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::Clock;
    use crate::error::EngineError;
    use crate::handlers::StandardHandlers;
    use crate::probe::fixtures::png_header;
    use crate::testing::{doc, resource, Harness};
    use docbridge_types::RawFile;
    use serde_json::{json, Value};

    fn with_file(field: &str, file: &RawFile) -> Document {
        let mut data = doc(json!({"title": "t"}));
        data.insert(field.into(), Value::Array(vec![file.to_entry()]));
        data
    }

    #[test]
    fn stable_url_drops_token() {
        assert_eq!(
            stable_public_url("https://f.test/o/a%2Fb?alt=media&token=xyz"),
            "https://f.test/o/a%2Fb?alt=media"
        );
        assert_eq!(stable_public_url("https://f.test/o/c"), "https://f.test/o/c?alt=media");
    }

    #[tokio::test]
    async fn no_file_means_no_change() {
        let harness = Harness::new();
        let items = resource("items", &["image"]);
        let data = doc(json!({"image": [{"src": "https://old"}]}));
        let result = upload(&harness.services.context(&items), "image", &data, "a1")
            .await
            .unwrap();
        assert!(result.is_none());
        assert!(harness.blobs.is_empty());
    }

    #[tokio::test]
    async fn image_upload_is_stored_and_measured() {
        let harness = Harness::new();
        let items = resource("items", &["image"]);
        let file = RawFile::new("cover.png", "image/png", png_header(32, 16));
        let data = with_file("image", &file);

        let descriptor = upload(&harness.services.context(&items), "image", &data, "a1")
            .await
            .unwrap()
            .unwrap();

        assert_eq!(descriptor.src, "https://files.test/o/items%2Fa1%2Fimage?alt=media");
        assert_eq!(descriptor.mime_type, "image/png");
        assert_eq!(descriptor.uploaded_at, harness.clock.now());
        assert_eq!((descriptor.width, descriptor.height), (Some(32), Some(16)));
        assert_eq!(harness.blobs.get("items/a1/image").unwrap().0, file.data);
    }

    #[tokio::test]
    async fn probe_failure_still_returns_descriptor() {
        let harness = Harness::new();
        let items = resource("items", &["image"]);
        let file = RawFile::new("broken.png", "image/png", b"not really a png".to_vec());
        let descriptor = upload(&harness.services.context(&items), "image", &with_file("image", &file), "a1")
            .await
            .unwrap()
            .unwrap();
        assert!(descriptor.width.is_none());
        assert!(descriptor.height.is_none());
        assert!(harness.blobs.contains("items/a1/image"));
    }

    #[tokio::test]
    async fn non_image_is_not_probed() {
        let harness = Harness::new();
        let items = resource("items", &["manual"]);
        let file = RawFile::new("m.pdf", "application/pdf", png_header(1, 1));
        let descriptor = upload(&harness.services.context(&items), "manual", &with_file("manual", &file), "a1")
            .await
            .unwrap()
            .unwrap();
        assert!(descriptor.width.is_none());
    }

    #[tokio::test]
    async fn upload_all_keeps_declared_order() {
        let harness = Harness::new();
        let items = resource("items", &["image", "thumb", "manual"]);
        let mut data = with_file("manual", &RawFile::new("m.txt", "text/plain", b"hi".to_vec()));
        data.insert(
            "image".into(),
            Value::Array(vec![RawFile::new("i.png", "image/png", png_header(2, 2)).to_entry()]),
        );

        let uploads = upload_all(&StandardHandlers, &harness.services.context(&items), &data, "a1")
            .await
            .unwrap();
        let fields: Vec<&str> = uploads.iter().map(|(f, _)| f.as_str()).collect();
        assert_eq!(fields, vec!["image", "manual"]);
        assert_eq!(harness.blobs.len(), 2);
    }

    struct LinkOnly;

    #[async_trait::async_trait]
    impl ResourceHandlers for LinkOnly {
        async fn upload(
            &self,
            ctx: &ResourceContext<'_>,
            field: &str,
            _data: &Document,
            id: &str,
        ) -> EngineResult<Option<UploadDescriptor>> {
            let src = format!("https://cdn.test/{}", ctx.resource.blob_path(id, field));
            Ok(Some(UploadDescriptor::new(src, "image/png", ctx.now())))
        }
    }

    #[tokio::test]
    async fn upload_all_goes_through_handlers() {
        let harness = Harness::new();
        let items = resource("items", &["image"]);
        let uploads = upload_all(&LinkOnly, &harness.services.context(&items), &Document::new(), "a1")
            .await
            .unwrap();
        assert_eq!(uploads.len(), 1);
        assert_eq!(uploads[0].1.src, "https://cdn.test/items/a1/image");
        assert!(harness.blobs.is_empty());
    }

    #[tokio::test]
    async fn undecodable_file_is_a_validation_error() {
        let harness = Harness::new();
        let items = resource("items", &["image"]);
        let data = doc(json!({"image": [{"rawFile": {"name": "x", "data": 12}}]}));
        let err = upload(&harness.services.context(&items), "image", &data, "a1")
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Type(_)));
        assert_eq!(err.kind(), "validation");
    }
}
