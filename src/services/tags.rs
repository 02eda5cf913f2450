use crate::error::StorageError;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// Characters left intact by `encodeURIComponent`; everything else in a tag
/// name or value is percent-encoded on the S3 tagging wire.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// A single lifecycle tag, exchanged externally as `"name:value"` (for
/// example `delete:60d`, matched by the bucket's expiration rules).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub name: String,
    pub value: String,
}

impl Tag {
    /// Parse the external `"name:value"` form. The split is on the first
    /// colon, so values may contain colons themselves. A missing colon or an
    /// empty name is rejected rather than coerced.
    pub fn parse(raw: &str) -> Result<Self, StorageError> {
        let (name, value) = raw.split_once(':').ok_or_else(|| {
            StorageError::Validation(format!("malformed tag '{raw}': expected 'name:value'"))
        })?;
        if name.is_empty() {
            return Err(StorageError::Validation(format!(
                "malformed tag '{raw}': empty name"
            )));
        }
        Ok(Self {
            name: name.to_string(),
            value: value.to_string(),
        })
    }
}

/// Parse a full external tag list, rejecting the first malformed entry.
pub fn parse_tag_list(raw: &[String]) -> Result<Vec<Tag>, StorageError> {
    raw.iter().map(|tag| Tag::parse(tag)).collect()
}

/// Encode tags into the S3 `Tagging` header value:
/// `percent(name)=percent(value)` pairs joined by `&`. An empty list encodes
/// to an omitted field, never an empty string.
pub fn encode_tag_set(tags: &[Tag]) -> Option<String> {
    if tags.is_empty() {
        return None;
    }
    Some(
        tags.iter()
            .map(|tag| {
                format!(
                    "{}={}",
                    utf8_percent_encode(&tag.name, COMPONENT),
                    utf8_percent_encode(&tag.value, COMPONENT)
                )
            })
            .collect::<Vec<_>>()
            .join("&"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tag() {
        let tag = Tag::parse("delete:60d").unwrap();
        assert_eq!(tag.name, "delete");
        assert_eq!(tag.value, "60d");
    }

    #[test]
    fn test_parse_splits_on_first_colon() {
        let tag = Tag::parse("source:https://example.com").unwrap();
        assert_eq!(tag.name, "source");
        assert_eq!(tag.value, "https://example.com");
    }

    #[test]
    fn test_parse_allows_empty_value() {
        let tag = Tag::parse("pinned:").unwrap();
        assert_eq!(tag.name, "pinned");
        assert_eq!(tag.value, "");
    }

    #[test]
    fn test_parse_rejects_missing_colon() {
        let err = Tag::parse("delete60d").unwrap_err();
        assert!(err.to_string().contains("expected 'name:value'"));
    }

    #[test]
    fn test_parse_rejects_empty_name() {
        assert!(Tag::parse(":60d").is_err());
    }

    #[test]
    fn test_encode_empty_list_is_omitted() {
        assert_eq!(encode_tag_set(&[]), None);
    }

    #[test]
    fn test_encode_single_tag() {
        let tags = vec![Tag::parse("delete:60d").unwrap()];
        assert_eq!(encode_tag_set(&tags).as_deref(), Some("delete=60d"));
    }

    #[test]
    fn test_encode_joins_with_ampersand() {
        let tags = parse_tag_list(&["delete:60d".to_string(), "env:prod".to_string()]).unwrap();
        assert_eq!(encode_tag_set(&tags).as_deref(), Some("delete=60d&env=prod"));
    }

    #[test]
    fn test_encode_percent_encodes_names_and_values() {
        let tags = vec![Tag::parse("owner team:a b&c").unwrap()];
        assert_eq!(
            encode_tag_set(&tags).as_deref(),
            Some("owner%20team=a%20b%26c")
        );
    }
}
