use crate::error::StorageError;
use crate::models::{
    BatchResult, FailedObject, IngestionOutcome, IngestionRequest, SaveOptions, UploadedObject,
};
use crate::services::metadata::MetadataService;
use crate::services::source::SourceResolver;
use crate::services::storage::ObjectStore;
use crate::services::tags;
use futures::future::join_all;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tracing::{error, info, warn};

/// Fans a batch of ingestion requests out across a semaphore-bounded worker
/// pool and aggregates per-item outcomes. One item's failure never aborts or
/// delays unrelated items beyond the concurrency cap.
pub struct IngestService {
    store: Arc<dyn ObjectStore>,
}

/// Per-batch state shared by every worker task.
struct BatchContext {
    store: Arc<dyn ObjectStore>,
    resolver: SourceResolver,
    save_path: String,
    tag_string: Option<String>,
    logging: bool,
}

impl IngestService {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }

    /// Resolve, inspect and upload every request under
    /// `{save_path}/{key}`.
    ///
    /// Option and tag validation failures abort the call before any I/O;
    /// after that, every error is caught at the item boundary and returned
    /// as a `FailedObject`. Each submitted request lands in exactly one of
    /// the result's two sequences, in no guaranteed order relative to
    /// completion — match by key/source_ref, not position.
    pub async fn save_files(
        &self,
        requests: Vec<IngestionRequest>,
        options: SaveOptions,
    ) -> Result<BatchResult, StorageError> {
        options.validate()?;
        let tag_list = tags::parse_tag_list(&options.tags)?;
        let resolver = SourceResolver::new(options.headers.as_ref(), options.proxy_url.as_deref())?;

        let ctx = Arc::new(BatchContext {
            store: Arc::clone(&self.store),
            resolver,
            save_path: options.save_path,
            tag_string: tags::encode_tag_set(&tag_list),
            logging: options.logging,
        });

        let batch_started = Instant::now();
        if ctx.logging {
            info!(
                items = requests.len(),
                limit = options.parallel_limit,
                save_path = %ctx.save_path,
                "🚚 starting batch ingestion"
            );
        }

        let semaphore = Arc::new(Semaphore::new(options.parallel_limit));
        let handles: Vec<_> = requests
            .iter()
            .cloned()
            .map(|request| {
                let ctx = Arc::clone(&ctx);
                let semaphore = Arc::clone(&semaphore);
                tokio::spawn(async move {
                    let _permit = semaphore
                        .acquire_owned()
                        .await
                        .expect("ingestion semaphore is never closed");
                    ingest_one(&ctx, &request).await
                })
            })
            .collect();

        let mut result = BatchResult::default();
        for (request, joined) in requests.into_iter().zip(join_all(handles).await) {
            let outcome = match joined {
                Ok(outcome) => outcome,
                // A panicked task still yields a failure record, keeping the
                // |succeeded| + |failed| = |requests| invariant.
                Err(e) => {
                    error!(key = %request.key, "ingestion task aborted: {e}");
                    IngestionOutcome::Failed(FailedObject {
                        key: request.key,
                        source_ref: request.source_ref,
                        message: format!("ingestion task aborted: {e}"),
                    })
                }
            };
            match outcome {
                IngestionOutcome::Succeeded(uploaded) => result.succeeded.push(uploaded),
                IngestionOutcome::Failed(failed) => result.failed.push(failed),
            }
        }

        if ctx.logging {
            info!(
                succeeded = result.succeeded.len(),
                failed = result.failed.len(),
                elapsed = ?batch_started.elapsed(),
                "🏁 batch ingestion finished"
            );
        }

        Ok(result)
    }
}

/// Resolve → extract → write for one item. The first stage failure
/// short-circuits the rest and records that stage's error message.
async fn ingest_one(ctx: &BatchContext, request: &IngestionRequest) -> IngestionOutcome {
    let started = Instant::now();
    let object_key = format!("{}/{}", ctx.save_path, request.key);

    let payload = match ctx.resolver.resolve(&request.source_ref).await {
        Ok(payload) => payload,
        Err(e) => return failed(ctx, request, e),
    };
    if ctx.logging {
        info!(key = %request.key, bytes = payload.len(), "📥 resolved source");
    }

    let dimensions = match MetadataService::dimensions(&payload) {
        Ok(dimensions) => dimensions,
        Err(e) => return failed(ctx, request, e),
    };
    let content_type = MetadataService::content_type_for(&request.key);
    if ctx.logging {
        info!(
            key = %request.key,
            width = dimensions.width,
            height = dimensions.height,
            content_type = %content_type,
            "🔍 extracted metadata"
        );
    }

    let metadata = HashMap::from([
        ("img-width".to_string(), dimensions.width.to_string()),
        ("img-height".to_string(), dimensions.height.to_string()),
    ]);

    if let Err(e) = ctx
        .store
        .put_object(
            &object_key,
            payload,
            &content_type,
            ctx.tag_string.as_deref(),
            metadata,
        )
        .await
    {
        return failed(ctx, request, e);
    }

    let upload_url = ctx.store.object_url(&object_key);
    if ctx.logging {
        info!(key = %request.key, url = %upload_url, elapsed = ?started.elapsed(), "📤 uploaded");
    }

    IngestionOutcome::Succeeded(UploadedObject {
        key: request.key.clone(),
        source_ref: request.source_ref.clone(),
        upload_url,
    })
}

fn failed(ctx: &BatchContext, request: &IngestionRequest, error: StorageError) -> IngestionOutcome {
    if ctx.logging {
        warn!(key = %request.key, source = %request.source_ref, "❌ ingestion failed: {error}");
    }
    IngestionOutcome::Failed(FailedObject {
        key: request.key.clone(),
        source_ref: request.source_ref.clone(),
        message: error.to_string(),
    })
}
