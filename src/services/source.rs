use crate::error::StorageError;
use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::collections::HashMap;
use std::time::Duration;

/// Upper bound on a single remote fetch. A hung source stalls only its own
/// pool slot, and only this long.
const FETCH_TIMEOUT: Duration = Duration::from_secs(60);

fn is_http(source_ref: &str) -> bool {
    source_ref.starts_with("http://") || source_ref.starts_with("https://")
}

/// Resolves a source reference into its bytes: http(s) URLs are fetched,
/// everything else is read as a local filesystem path.
#[derive(Debug)]
pub struct SourceResolver {
    client: reqwest::Client,
    headers: HeaderMap,
}

impl SourceResolver {
    /// Build a resolver for one batch. Proxy and headers are validated here,
    /// once, so malformed caller input fails the call instead of every item.
    pub fn new(
        headers: Option<&HashMap<String, String>>,
        proxy_url: Option<&str>,
    ) -> Result<Self, StorageError> {
        let mut builder = reqwest::Client::builder().timeout(FETCH_TIMEOUT);

        if let Some(url) = proxy_url {
            let proxy = reqwest::Proxy::all(url).map_err(|e| {
                StorageError::Validation(format!("invalid proxy url '{url}': {e}"))
            })?;
            builder = builder.proxy(proxy);
        }

        let mut header_map = HeaderMap::new();
        if let Some(headers) = headers {
            for (name, value) in headers {
                let header_value = HeaderValue::from_str(value).map_err(|e| {
                    StorageError::Validation(format!("invalid value for header '{name}': {e}"))
                })?;
                let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                    StorageError::Validation(format!("invalid header name '{name}': {e}"))
                })?;
                header_map.insert(header_name, header_value);
            }
        }

        let client = builder.build().map_err(|e| {
            StorageError::Validation(format!("failed to build http client: {e}"))
        })?;

        Ok(Self {
            client,
            headers: header_map,
        })
    }

    /// Fetch the full payload into memory. Buffering is deliberate: the
    /// bytes are decoded for dimensions before the upload re-reads them.
    ///
    /// Anything not literally prefixed `http://` or `https://` is read as a
    /// local path, so a mistyped URL fails with a filesystem error.
    pub async fn resolve(&self, source_ref: &str) -> Result<Bytes, StorageError> {
        if is_http(source_ref) {
            self.fetch_url(source_ref).await
        } else {
            read_file(source_ref).await
        }
    }

    async fn fetch_url(&self, url: &str) -> Result<Bytes, StorageError> {
        let response = self
            .client
            .get(url)
            .headers(self.headers.clone())
            .send()
            .await
            .map_err(|e| StorageError::Fetch(format!("GET {url} failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(StorageError::Fetch(format!("GET {url} returned {status}")));
        }

        response
            .bytes()
            .await
            .map_err(|e| StorageError::Fetch(format!("reading body of {url} failed: {e}")))
    }
}

async fn read_file(path: &str) -> Result<Bytes, StorageError> {
    tokio::fs::read(path)
        .await
        .map(Bytes::from)
        .map_err(|e| StorageError::Fetch(format!("reading {path} failed: {e}")))
}
