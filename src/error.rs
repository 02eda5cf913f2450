use thiserror::Error;

/// Error taxonomy of the ingestion and reconciliation engine.
///
/// Per-item errors inside a batch are caught at the item boundary and turned
/// into `FailedObject` records; only call-level problems (malformed options,
/// backend failures during reconciliation) surface as `Err`.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Network or filesystem failure while reading a source.
    #[error("Fetch error: {0}")]
    Fetch(String),

    /// The payload is not a decodable raster image.
    #[error("Decode error: {0}")]
    Decode(String),

    /// The storage backend rejected a put, listing or tagging call.
    #[error("Write error: {0}")]
    Write(String),

    /// Malformed caller input: tag string, options, proxy or headers.
    #[error("Validation error: {0}")]
    Validation(String),
}
