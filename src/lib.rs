//! Bulk S3 asset ingestion with lifecycle tagging.
//!
//! Fetches a batch of sources (local paths or http(s) URLs) through a
//! bounded worker pool, uploads each under a caller-chosen prefix with
//! lifecycle tags and image-dimension metadata, and reconciles tag sets on
//! already-stored objects. The bucket's lifecycle rules (e.g. expiring
//! everything tagged `delete:60d`) consume the tags; this crate only
//! maintains them.

pub mod config;
pub mod error;
pub mod infrastructure;
pub mod models;
pub mod services;

pub use config::StorageConfig;
pub use error::StorageError;
pub use models::{BatchResult, FailedObject, IngestionRequest, SaveOptions, UploadedObject};
pub use services::ingest::IngestService;
pub use services::reconcile::TagService;
pub use services::storage::{ObjectStore, S3ObjectStore};
pub use services::tags::Tag;
