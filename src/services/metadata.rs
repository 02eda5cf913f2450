use crate::error::StorageError;

/// Pixel dimensions of a decoded raster payload, attached to the uploaded
/// object as `img-width` / `img-height` metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
}

pub struct MetadataService;

impl MetadataService {
    /// Decode the payload to learn its pixel dimensions. Anything that is
    /// not a decodable raster image fails the item here, before the upload.
    pub fn dimensions(payload: &[u8]) -> Result<ImageInfo, StorageError> {
        let img = image::load_from_memory(payload)
            .map_err(|e| StorageError::Decode(format!("not a decodable image: {e}")))?;
        Ok(ImageInfo {
            width: img.width(),
            height: img.height(),
        })
    }

    /// Content type derived from the key's file extension: lower-cased
    /// suffix after the last `.`, falling back to `jpg` when absent. Derived
    /// from the key string on purpose, never sniffed from content.
    pub fn content_type_for(key: &str) -> String {
        let extension = key
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_lowercase())
            .filter(|ext| !ext.is_empty())
            .unwrap_or_else(|| "jpg".to_string());
        format!("image/{extension}")
    }
}
