//! String key-value storage backends.
//!
//! The file backend keeps a flat JSON object on disk:
//! ```text
//! {
//!   "autoRotate": "true",
//!   "wireframe": "false"
//! }
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Errors from storage writes.
#[derive(Debug, thiserror::Error)]
pub enum PrefsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Host key-value storage holding string values.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&mut self, key: &str, value: &str) -> Result<(), PrefsError>;
}

/// Volatile storage, useful for tests and headless runs.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PrefsError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Storage backed by a JSON object file, rewritten on every `set`.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl JsonFileStore {
    /// Open the store at `path`.
    ///
    /// A missing file starts empty. An unreadable or malformed file is
    /// logged and also starts empty; the next write replaces it.
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let entries = match std::fs::read_to_string(&path) {
            Ok(text) => match serde_json::from_str::<BTreeMap<String, serde_json::Value>>(&text) {
                Ok(map) => map
                    .into_iter()
                    .filter_map(|(k, v)| match v {
                        serde_json::Value::String(s) => Some((k, s)),
                        other => {
                            tracing::warn!("ignoring non-string preference {k}={other}");
                            None
                        }
                    })
                    .collect(),
                Err(e) => {
                    tracing::warn!("malformed preference file {}: {e}", path.display());
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                tracing::warn!("cannot read preference file {}: {e}", path.display());
                BTreeMap::new()
            }
        };
        Self { path, entries }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<(), PrefsError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let file = std::fs::File::create(&self.path)?;
        serde_json::to_writer_pretty(file, &self.entries)?;
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PrefsError> {
        self.entries.insert(key.to_string(), value.to_string());
        self.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_overwrites() {
        let mut store = MemoryStore::new();
        store.set("wireframe", "true").unwrap();
        store.set("wireframe", "false").unwrap();
        assert_eq!(store.get("wireframe").as_deref(), Some("false"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn file_store_persists_across_opens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        {
            let mut store = JsonFileStore::open(&path);
            assert!(store.get("autoRotate").is_none());
            store.set("autoRotate", "false").unwrap();
        }
        let store = JsonFileStore::open(&path);
        assert_eq!(store.get("autoRotate").as_deref(), Some("false"));
    }

    #[test]
    fn file_store_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("prefs.json");
        let mut store = JsonFileStore::open(&path);
        store.set("wireframe", "true").unwrap();
        assert!(path.exists());
    }

    #[test]
    fn malformed_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        std::fs::write(&path, "{ not json").unwrap();
        let mut store = JsonFileStore::open(&path);
        assert!(store.get("wireframe").is_none());
        store.set("wireframe", "true").unwrap();
        assert_eq!(
            JsonFileStore::open(&path).get("wireframe").as_deref(),
            Some("true")
        );
    }

    #[test]
    fn non_string_values_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        std::fs::write(&path, r#"{"wireframe": true, "autoRotate": "false"}"#).unwrap();
        let store = JsonFileStore::open(&path);
        assert!(store.get("wireframe").is_none());
        assert_eq!(store.get("autoRotate").as_deref(), Some("false"));
    }
}
