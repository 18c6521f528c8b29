use anyhow::Context;
use std::sync::Arc;

use crate::storage::{HISTORY_KEY, Storage};

pub const HISTORY_LIMIT: usize = 5;

/// Recently searched city names, most recent first, unique, at most five.
pub struct SearchHistory {
    storage: Arc<dyn Storage>,
    entries: Vec<String>,
}

impl std::fmt::Debug for SearchHistory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchHistory").field("entries", &self.entries).finish()
    }
}

impl SearchHistory {
    /// Read persisted history. Missing or malformed content yields an empty list.
    pub fn load(storage: Arc<dyn Storage>) -> Self {
        let entries = storage
            .load(HISTORY_KEY)
            .and_then(|raw| match serde_json::from_str::<Vec<String>>(&raw) {
                Ok(list) => Some(list),
                Err(e) => {
                    tracing::warn!("discarding malformed search history: {e}");
                    None
                }
            })
            .map(normalize)
            .unwrap_or_default();

        Self { storage, entries }
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Move `city` to the front (exact, case-sensitive match) and persist.
    pub fn record(&mut self, city: &str) {
        self.entries.retain(|c| c != city);
        self.entries.insert(0, city.to_owned());
        self.entries.truncate(HISTORY_LIMIT);
        self.persist();
    }

    /// Remove the stored list, then the in-memory one. On failure both are kept.
    pub fn clear(&mut self) -> anyhow::Result<()> {
        self.storage
            .remove(HISTORY_KEY)
            .context("Failed to clear search history")?;
        self.entries.clear();
        Ok(())
    }

    fn persist(&self) {
        let result = serde_json::to_string(&self.entries)
            .map_err(anyhow::Error::from)
            .and_then(|json| self.storage.save(HISTORY_KEY, &json));

        if let Err(e) = result {
            tracing::warn!("failed to persist search history: {e:#}");
        }
    }
}

/// Enforce uniqueness and the cap on lists that were persisted by someone else.
fn normalize(list: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(HISTORY_LIMIT);
    for city in list {
        if !out.contains(&city) {
            out.push(city);
        }
        if out.len() == HISTORY_LIMIT {
            break;
        }
    }
    out
}
