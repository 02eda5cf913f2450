use crate::error::StorageError;
use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{Tag as S3Tag, Tagging};
use bytes::Bytes;
use std::collections::HashMap;

/// One listing page; tag reconciliation never paginates past this.
pub const LIST_PAGE_SIZE: i32 = 1000;

/// Object-storage operations the engine consumes. Implemented by
/// `S3ObjectStore` in production and by in-memory mocks in tests.
///
/// The handle is shared across every in-flight ingestion task and must never
/// be mutated after construction; build one per region/credentials pair.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// One durable write: body, content type, tagging header and metadata
    /// attached atomically with the object.
    async fn put_object(
        &self,
        key: &str,
        body: Bytes,
        content_type: &str,
        tagging: Option<&str>,
        metadata: HashMap<String, String>,
    ) -> Result<(), StorageError>;

    /// A single listing page under `prefix`, at most `max_keys` keys.
    async fn list_objects(&self, prefix: &str, max_keys: i32)
    -> Result<Vec<String>, StorageError>;

    /// Current tag set of one object, as (name, value) pairs.
    async fn get_object_tagging(&self, key: &str) -> Result<Vec<(String, String)>, StorageError>;

    /// Full replacement of one object's tag set; S3 has no partial update.
    async fn put_object_tagging(
        &self,
        key: &str,
        tags: Vec<(String, String)>,
    ) -> Result<(), StorageError>;

    /// Public URL of an uploaded object.
    fn object_url(&self, key: &str) -> String;
}

pub struct S3ObjectStore {
    client: Client,
    bucket: String,
    region: String,
}

impl S3ObjectStore {
    pub fn new(client: Client, bucket: String, region: String) -> Self {
        Self {
            client,
            bucket,
            region,
        }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put_object(
        &self,
        key: &str,
        body: Bytes,
        content_type: &str,
        tagging: Option<&str>,
        metadata: HashMap<String, String>,
    ) -> Result<(), StorageError> {
        let mut request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(body))
            .content_type(content_type)
            // Images should render in-browser instead of downloading.
            .content_disposition("inline")
            .set_metadata(Some(metadata));

        if let Some(tagging) = tagging {
            request = request.tagging(tagging);
        }

        request.send().await.map_err(|e| {
            StorageError::Write(format!("PutObject {key} failed: {}", DisplayErrorContext(&e)))
        })?;
        Ok(())
    }

    async fn list_objects(
        &self,
        prefix: &str,
        max_keys: i32,
    ) -> Result<Vec<String>, StorageError> {
        let response = self
            .client
            .list_objects_v2()
            .bucket(&self.bucket)
            .prefix(prefix)
            .max_keys(max_keys)
            .send()
            .await
            .map_err(|e| {
                StorageError::Write(format!(
                    "ListObjects {prefix} failed: {}",
                    DisplayErrorContext(&e)
                ))
            })?;

        Ok(response
            .contents
            .unwrap_or_default()
            .into_iter()
            .filter_map(|object| object.key)
            .collect())
    }

    async fn get_object_tagging(&self, key: &str) -> Result<Vec<(String, String)>, StorageError> {
        let response = self
            .client
            .get_object_tagging()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                StorageError::Write(format!(
                    "GetObjectTagging {key} failed: {}",
                    DisplayErrorContext(&e)
                ))
            })?;

        Ok(response
            .tag_set
            .into_iter()
            .map(|tag| (tag.key, tag.value))
            .collect())
    }

    async fn put_object_tagging(
        &self,
        key: &str,
        tags: Vec<(String, String)>,
    ) -> Result<(), StorageError> {
        let tag_set = tags
            .into_iter()
            .map(|(name, value)| {
                S3Tag::builder()
                    .key(name)
                    .value(value)
                    .build()
                    .map_err(|e| StorageError::Validation(format!("invalid tag for {key}: {e}")))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let tagging = Tagging::builder()
            .set_tag_set(Some(tag_set))
            .build()
            .map_err(|e| StorageError::Validation(format!("invalid tag set for {key}: {e}")))?;

        self.client
            .put_object_tagging()
            .bucket(&self.bucket)
            .key(key)
            .tagging(tagging)
            .send()
            .await
            .map_err(|e| {
                StorageError::Write(format!(
                    "PutObjectTagging {key} failed: {}",
                    DisplayErrorContext(&e)
                ))
            })?;
        Ok(())
    }

    fn object_url(&self, key: &str) -> String {
        format!(
            "https://{}.s3.{}.amazonaws.com/{}",
            self.bucket, self.region, key
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_s3::config::Region;

    #[tokio::test]
    async fn test_object_url_shape() {
        let aws_config = aws_config::from_env()
            .region(Region::new("eu-west-1"))
            .no_credentials()
            .load()
            .await;
        let store = S3ObjectStore::new(
            Client::new(&aws_config),
            "cdn-bucket".to_string(),
            "eu-west-1".to_string(),
        );

        assert_eq!(
            store.object_url("images/1234/photo.png"),
            "https://cdn-bucket.s3.eu-west-1.amazonaws.com/images/1234/photo.png"
        );
    }
}
