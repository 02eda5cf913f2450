use crate::error::StorageError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Worker pool size used when the caller does not set one.
pub const DEFAULT_PARALLEL_LIMIT: usize = 2;

/// One asset to ingest: the object key suffix (filename) and where its bytes
/// come from (local path or absolute http(s) URL).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestionRequest {
    pub key: String,
    pub source_ref: String,
}

impl IngestionRequest {
    pub fn new(key: impl Into<String>, source_ref: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            source_ref: source_ref.into(),
        }
    }
}

/// Batch-level options for `IngestService::save_files`.
///
/// Every recognized option is an explicit field with a default; the struct is
/// validated once at call entry, before any I/O.
#[derive(Debug, Clone)]
pub struct SaveOptions {
    /// Lifecycle tags in the external `"name:value"` form, applied to every
    /// uploaded object. Malformed entries fail the whole call.
    pub tags: Vec<String>,
    /// Key prefix the batch is grouped under.
    pub save_path: String,
    /// Extra request headers for URL sources.
    pub headers: Option<HashMap<String, String>>,
    /// Per-stage progress logging. Advisory only.
    pub logging: bool,
    /// Forward proxy for URL sources.
    pub proxy_url: Option<String>,
    /// Worker pool size, must be at least 1.
    pub parallel_limit: usize,
}

impl SaveOptions {
    pub fn new(save_path: impl Into<String>) -> Self {
        Self {
            tags: Vec::new(),
            save_path: save_path.into(),
            headers: None,
            logging: false,
            proxy_url: None,
            parallel_limit: DEFAULT_PARALLEL_LIMIT,
        }
    }

    pub(crate) fn validate(&self) -> Result<(), StorageError> {
        if self.save_path.trim().is_empty() {
            return Err(StorageError::Validation(
                "'save_path' must not be empty".to_string(),
            ));
        }
        if self.parallel_limit == 0 {
            return Err(StorageError::Validation(
                "'parallel_limit' must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// A successfully uploaded item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadedObject {
    pub key: String,
    pub source_ref: String,
    pub upload_url: String,
}

/// An item that failed at some stage, with the stage's error message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailedObject {
    pub key: String,
    pub source_ref: String,
    pub message: String,
}

/// Terminal state of one item: uploaded or failed, never both.
#[derive(Debug)]
pub enum IngestionOutcome {
    Succeeded(UploadedObject),
    Failed(FailedObject),
}

/// Aggregated batch outcome. Every submitted request lands in exactly one of
/// the two sequences.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct BatchResult {
    pub succeeded: Vec<UploadedObject>,
    pub failed: Vec<FailedObject>,
}
