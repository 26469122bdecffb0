use std::sync::Arc;

use docbridge_engine::{pipeline, EngineServices, ResourceHandlers};
use docbridge_types::{OperationKind, OperationResult, Request, ResourceDescriptor};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::AdapterResult;
use crate::inline::InlineUploads;
use crate::registry::ResourceRegistry;

/// Protocol dispatcher: routes each operation on a named resource to the
/// handlers. Holds no record state of its own.
pub struct Adapter {
    registry: ResourceRegistry,
    services: EngineServices,
    handlers: Arc<dyn ResourceHandlers>,
    inline_uploads: Option<InlineUploads>,
}

impl Adapter {
    pub(crate) fn new(
        registry: ResourceRegistry,
        services: EngineServices,
        handlers: Arc<dyn ResourceHandlers>,
        inline_uploads: Option<InlineUploads>,
    ) -> Self {
        Self {
            registry,
            services,
            handlers,
            inline_uploads,
        }
    }

    pub fn resources(&self) -> impl Iterator<Item = &ResourceDescriptor> {
        self.registry.iter()
    }

    pub fn registry(&self) -> &ResourceRegistry {
        &self.registry
    }

    pub fn services(&self) -> &EngineServices {
        &self.services
    }

    /// Execute one operation against `resource`.
    pub async fn dispatch(&self, resource: &str, request: Request) -> AdapterResult<OperationResult> {
        let descriptor = self.registry.resolve(resource)?;
        let request = match &self.inline_uploads {
            Some(inline) => inline.apply(request)?,
            None => request,
        };
        let ctx = self.services.context(descriptor);
        let handlers = self.handlers.as_ref();
        let kind = request.kind();
        debug!(resource, operation = %kind, "dispatching");

        let result = match request {
            Request::List(params) => OperationResult::from(handlers.list(&ctx, &params).await?),
            Request::GetOne { id } => OperationResult::One {
                data: handlers.get_one(&ctx, &id).await?,
            },
            Request::GetMany { ids } => OperationResult::Many {
                data: handlers.get_many(&ctx, &ids).await?,
            },
            Request::GetManyReference(params) => {
                let page = handlers.get_many_reference(&ctx, &params).await?;
                OperationResult::Reference {
                    data: page.data,
                    total: page.total,
                }
            }
            Request::Create(params) => OperationResult::One {
                data: pipeline::write(handlers, &ctx, &params, true).await?,
            },
            Request::Update(params) => OperationResult::One {
                data: pipeline::write(handlers, &ctx, &params, false).await?,
            },
            Request::Delete { id } => OperationResult::Deleted {
                data: handlers.delete(&ctx, &id).await?,
            },
            Request::DeleteMany { ids } => {
                let outcomes = handlers.delete_many(&ctx, &ids).await?;
                OperationResult::DeletedMany { data: ids, outcomes }
            }
        };
        Ok(result)
    }

    /// String-tagged entry point (`GET_LIST`, `get-many-reference`, ...).
    ///
    /// An unrecognized operation is logged and answered with `{data: []}`.
    pub async fn dispatch_raw(
        &self,
        operation: &str,
        resource: &str,
        params: Value,
    ) -> AdapterResult<OperationResult> {
        let Some(kind) = OperationKind::parse(operation) else {
            warn!(operation, resource, "unrecognized operation type");
            return Ok(OperationResult::empty());
        };
        let request = Request::from_params(kind, params)?;
        self.dispatch(resource, request).await
    }
}

impl std::fmt::Debug for Adapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Adapter")
            .field("resources", &self.registry.names())
            .field("inline_uploads", &self.inline_uploads)
            .finish_non_exhaustive()
    }
}
