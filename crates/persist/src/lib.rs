//! Persistence: viewer preferences in string key-value storage.
//!
//! # Invariants
//! - Each flag is stored under its own key as `"true"` or `"false"`.
//! - Loading never fails: absent or malformed values take their defaults.
//! - Writes are last-write-wins; there is a single writer.

pub mod prefs;
pub mod storage;

pub use prefs::{PreferenceStore, Preferences};
pub use storage::{JsonFileStore, KeyValueStore, MemoryStore, PrefsError};
