use crate::error::StorageError;
use crate::services::storage::{LIST_PAGE_SIZE, ObjectStore};
use crate::services::tags::Tag;
use std::sync::Arc;
use tracing::{debug, warn};

/// Read-modify-write tag reconciliation over one prefix listing page.
///
/// The per-object read-modify-write is not compare-and-swap protected, so
/// concurrent reconciliation of the same prefix can lose updates; callers
/// serialize calls against a prefix. Prefixes holding more than one listing
/// page (1000 objects) are only partially reconciled.
pub struct TagService {
    store: Arc<dyn ObjectStore>,
}

impl TagService {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }

    /// Strip every exact `"name:value"` match in `tags` from each object
    /// under `save_path/`. Matching is on the whole pair: an object tagged
    /// `delete:1d` is untouched by `remove_tags(.., ["delete:60d"])`.
    /// Returns whether any objects were processed.
    pub async fn remove_tags(
        &self,
        save_path: &str,
        tags: &[String],
    ) -> Result<bool, StorageError> {
        validate_save_path(save_path)?;

        let keys = self
            .store
            .list_objects(&format!("{save_path}/"), LIST_PAGE_SIZE)
            .await?;
        if keys.is_empty() {
            return Ok(false);
        }

        for key in &keys {
            let current = self.store.get_object_tagging(key).await?;
            let filtered: Vec<(String, String)> = current
                .into_iter()
                .filter(|(name, value)| !tags.iter().any(|t| t == &format!("{name}:{value}")))
                .collect();

            // Written back even when nothing matched; the replacement set is
            // the source of truth either way.
            self.store.put_object_tagging(key, filtered).await?;
        }

        debug!(save_path, objects = keys.len(), "🏷️  removed tags");
        Ok(true)
    }

    /// Merge `tags` into each object's tag set under `save_path/`, the
    /// last-applied value winning for a repeated name. Malformed entries are
    /// discarded with a warning instead of failing the call. Returns whether
    /// any objects were processed.
    pub async fn add_tags(&self, save_path: &str, tags: &[String]) -> Result<bool, StorageError> {
        validate_save_path(save_path)?;

        // An empty tag list issues no backend calls at all, not even the
        // listing.
        if tags.is_empty() {
            return Ok(false);
        }

        let mut parsed = Vec::new();
        for raw in tags {
            match Tag::parse(raw) {
                Ok(tag) => parsed.push(tag),
                Err(e) => warn!("discarding tag: {e}"),
            }
        }

        let keys = self
            .store
            .list_objects(&format!("{save_path}/"), LIST_PAGE_SIZE)
            .await?;
        if keys.is_empty() {
            return Ok(false);
        }

        for key in &keys {
            let mut merged = self.store.get_object_tagging(key).await?;
            for tag in &parsed {
                match merged.iter_mut().find(|(name, _)| name == &tag.name) {
                    Some((_, value)) => *value = tag.value.clone(),
                    None => merged.push((tag.name.clone(), tag.value.clone())),
                }
            }
            self.store.put_object_tagging(key, merged).await?;
        }

        debug!(save_path, objects = keys.len(), "🏷️  merged tags");
        Ok(true)
    }
}

fn validate_save_path(save_path: &str) -> Result<(), StorageError> {
    if save_path.trim().is_empty() {
        return Err(StorageError::Validation(
            "'save_path' must not be empty".to_string(),
        ));
    }
    Ok(())
}
