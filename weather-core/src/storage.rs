//! String-keyed persisted state, the local-storage capability the
//! orchestrator is handed at construction.

use anyhow::{Context, Result};
use parking_lot::Mutex;
use std::{
    collections::{BTreeMap, HashMap},
    fs,
    path::{Path, PathBuf},
};

pub const HISTORY_KEY: &str = "searchHistory";
pub const LOCATION_PROMPTED_KEY: &str = "locationPrompted";
pub const LOCATION_DENIED_KEY: &str = "locationDenied";

pub trait Storage: Send + Sync {
    fn load(&self, key: &str) -> Option<String>;

    fn save(&self, key: &str, value: &str) -> Result<()>;

    fn remove(&self, key: &str) -> Result<()>;
}

/// In-process storage, for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn load(&self, key: &str) -> Option<String> {
        self.entries.lock().get(key).cloned()
    }

    fn save(&self, key: &str, value: &str) -> Result<()> {
        self.entries.lock().insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries.lock().remove(key);
        Ok(())
    }
}

/// All keys in one JSON object file, rewritten on every mutation.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `state.json` inside `dir`.
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join("state.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Unreadable or corrupt files read as empty.
    fn read_all(&self) -> BTreeMap<String, String> {
        let Ok(contents) = fs::read_to_string(&self.path) else {
            return BTreeMap::new();
        };
        serde_json::from_str(&contents).unwrap_or_else(|e| {
            tracing::warn!(path = %self.path.display(), "discarding corrupt state file: {e}");
            BTreeMap::new()
        })
    }

    fn write_all(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create state directory: {}", parent.display())
            })?;
        }

        let json = serde_json::to_string_pretty(entries).context("Failed to serialize state")?;
        fs::write(&self.path, json)
            .with_context(|| format!("Failed to write state file: {}", self.path.display()))
    }
}

impl Storage for FileStorage {
    fn load(&self, key: &str) -> Option<String> {
        self.read_all().remove(key)
    }

    fn save(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.read_all();
        entries.insert(key.to_owned(), value.to_owned());
        self.write_all(&entries)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self.read_all();
        if entries.remove(key).is_some() {
            self.write_all(&entries)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_storage_save_load_remove() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.load("k"), None);

        storage.save("k", "v").unwrap();
        assert_eq!(storage.load("k").as_deref(), Some("v"));

        storage.remove("k").unwrap();
        assert_eq!(storage.load("k"), None);
    }

    #[test]
    fn file_storage_keeps_other_keys() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::in_dir(dir.path());

        storage.save(HISTORY_KEY, r#"["Oslo"]"#).unwrap();
        storage.save(LOCATION_PROMPTED_KEY, "true").unwrap();

        let reopened = FileStorage::in_dir(dir.path());
        assert_eq!(reopened.load(HISTORY_KEY).as_deref(), Some(r#"["Oslo"]"#));
        assert_eq!(reopened.load(LOCATION_PROMPTED_KEY).as_deref(), Some("true"));
    }

    #[test]
    fn corrupt_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::in_dir(dir.path());
        fs::write(storage.path(), "{not json").unwrap();

        assert_eq!(storage.load(HISTORY_KEY), None);
        storage.save(HISTORY_KEY, "[]").unwrap();
        assert_eq!(storage.load(HISTORY_KEY).as_deref(), Some("[]"));
    }
}
