use crate::config::StorageConfig;
use crate::services::storage::S3ObjectStore;
use aws_sdk_s3::config::{Credentials, Region};
use std::sync::Arc;
use tracing::info;

/// Build the shared S3-backed store from validated configuration.
///
/// The returned handle is connection-pooled and shared by every in-flight
/// task; construct one per region/credentials pair (for a different target
/// bucket or region, build a second store).
pub async fn setup_storage(config: &StorageConfig) -> Arc<S3ObjectStore> {
    info!(
        "☁️  S3 Storage: region={} bucket={}",
        config.region, config.bucket
    );

    let aws_config = aws_config::from_env()
        .region(Region::new(config.region.clone()))
        .credentials_provider(Credentials::new(
            config.access_key_id.clone(),
            config.secret_access_key.clone(),
            None,
            None,
            "static",
        ))
        .load()
        .await;

    let client = aws_sdk_s3::Client::new(&aws_config);
    Arc::new(S3ObjectStore::new(
        client,
        config.bucket.clone(),
        config.region.clone(),
    ))
}
