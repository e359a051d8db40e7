use crate::storage::{KeyValueStore, PrefsError};

pub const WIREFRAME_KEY: &str = "wireframe";
pub const AUTO_ROTATE_KEY: &str = "autoRotate";

/// The two persisted viewer flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preferences {
    pub wireframe: bool,
    pub auto_rotate: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            wireframe: false,
            auto_rotate: true,
        }
    }
}

/// Reads and writes [`Preferences`] through a key-value store.
#[derive(Debug)]
pub struct PreferenceStore<S> {
    storage: S,
}

impl<S: KeyValueStore> PreferenceStore<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Read both flags, substituting defaults for anything absent or malformed.
    pub fn load(&self) -> Preferences {
        let defaults = Preferences::default();
        let prefs = Preferences {
            wireframe: self.flag(WIREFRAME_KEY, defaults.wireframe),
            auto_rotate: self.flag(AUTO_ROTATE_KEY, defaults.auto_rotate),
        };
        tracing::debug!(?prefs, "loaded preferences");
        prefs
    }

    /// Write both flags as `"true"`/`"false"`.
    pub fn save(&mut self, prefs: &Preferences) -> Result<(), PrefsError> {
        self.storage
            .set(WIREFRAME_KEY, bool_literal(prefs.wireframe))?;
        self.storage
            .set(AUTO_ROTATE_KEY, bool_literal(prefs.auto_rotate))?;
        Ok(())
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn into_inner(self) -> S {
        self.storage
    }

    fn flag(&self, key: &str, default: bool) -> bool {
        match self.storage.get(key).as_deref() {
            Some("true") => true,
            Some("false") => false,
            None => default,
            Some(other) => {
                tracing::warn!("malformed preference {key}={other:?}, using {default}");
                default
            }
        }
    }
}

fn bool_literal(value: bool) -> &'static str {
    if value { "true" } else { "false" }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{JsonFileStore, MemoryStore};

    #[test]
    fn empty_store_gives_defaults() {
        let store = PreferenceStore::new(MemoryStore::new());
        assert_eq!(
            store.load(),
            Preferences {
                wireframe: false,
                auto_rotate: true
            }
        );
    }

    #[test]
    fn save_then_load_round_trips() {
        let mut store = PreferenceStore::new(MemoryStore::new());
        let prefs = Preferences {
            wireframe: true,
            auto_rotate: false,
        };
        store.save(&prefs).unwrap();
        assert_eq!(store.load(), prefs);
    }

    #[test]
    fn values_are_string_literals() {
        let mut store = PreferenceStore::new(MemoryStore::new());
        store
            .save(&Preferences {
                wireframe: true,
                auto_rotate: false,
            })
            .unwrap();
        let kv = store.into_inner();
        assert_eq!(kv.get("wireframe").as_deref(), Some("true"));
        assert_eq!(kv.get("autoRotate").as_deref(), Some("false"));
    }

    #[test]
    fn malformed_values_fall_back() {
        let mut kv = MemoryStore::new();
        kv.set("wireframe", "yes").unwrap();
        kv.set("autoRotate", "").unwrap();
        let store = PreferenceStore::new(kv);
        assert_eq!(store.load(), Preferences::default());
    }

    #[test]
    fn one_flag_present_other_defaults() {
        let mut kv = MemoryStore::new();
        kv.set("wireframe", "true").unwrap();
        let store = PreferenceStore::new(kv);
        assert_eq!(
            store.load(),
            Preferences {
                wireframe: true,
                auto_rotate: true
            }
        );
    }

    #[test]
    fn survives_reopen_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        let prefs = Preferences {
            wireframe: true,
            auto_rotate: false,
        };
        PreferenceStore::new(JsonFileStore::open(&path))
            .save(&prefs)
            .unwrap();
        assert_eq!(PreferenceStore::new(JsonFileStore::open(&path)).load(), prefs);
    }
}
