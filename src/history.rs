//! Bounded, persisted history of generation results.
//!
//! The whole log is stored as one JSON array snapshot under a single key,
//! rewritten on every change and reloaded at startup. Encoded images are
//! large, so the log is capped; unbounded growth would eventually make every
//! write fail against a small storage quota.

use crate::types::GenerationResult;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

/// Maximum number of entries kept in the log.
pub const HISTORY_CAPACITY: usize = 10;

/// Storage key under which the snapshot lives.
pub const HISTORY_KEY: &str = "nano_banana_history";

/// Scoped string key-value storage, the persistence collaborator.
///
/// Single-writer: one controller instance owns the snapshot. Concurrent
/// writers to the same key race with last-write-wins semantics.
pub trait Storage {
    /// Reads the value stored under `key`, if any.
    fn get(&self, key: &str) -> io::Result<Option<String>>;

    /// Writes `value` under `key`, overwriting any prior value.
    fn set(&mut self, key: &str, value: &str) -> io::Result<()>;

    /// Removes the value stored under `key`. Removing an absent key is fine.
    fn remove(&mut self, key: &str) -> io::Result<()>;
}

/// File-backed storage: one `<key>.json` file per key under a directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Creates storage rooted at `dir`. The directory is created lazily on
    /// first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Creates storage under the platform data directory
    /// (e.g. `~/.local/share/nanostudio`).
    pub fn in_data_dir() -> io::Result<Self> {
        let base = dirs::data_dir().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, "no platform data directory")
        })?;
        Ok(Self::new(base.join("nanostudio")))
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    /// Returns the directory this storage writes into.
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> io::Result<Option<String>> {
        match std::fs::read_to_string(self.key_path(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> io::Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(self.key_path(key), value)
    }

    fn remove(&mut self, key: &str) -> io::Result<()> {
        match std::fs::remove_file(self.key_path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}

/// In-memory storage, for tests and ephemeral embedding.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    values: HashMap<String, String>,
}

impl MemoryStorage {
    /// Creates empty in-memory storage.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> io::Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> io::Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> io::Result<()> {
        self.values.remove(key);
        Ok(())
    }
}

/// Ordered log of past results, most-recent-first, capped at
/// [`HISTORY_CAPACITY`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HistoryLog(Vec<GenerationResult>);

impl HistoryLog {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a new log with `entry` prepended and the tail truncated to
    /// capacity. The receiver is left untouched.
    pub fn append(&self, entry: GenerationResult) -> Self {
        let mut entries = Vec::with_capacity((self.0.len() + 1).min(HISTORY_CAPACITY));
        entries.push(entry);
        entries.extend(
            self.0
                .iter()
                .take(HISTORY_CAPACITY - 1)
                .cloned(),
        );
        Self(entries)
    }

    /// Number of entries in the log.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the log holds no entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the entry at `index`, newest first.
    pub fn get(&self, index: usize) -> Option<&GenerationResult> {
        self.0.get(index)
    }

    /// Iterates entries newest first.
    pub fn iter(&self) -> impl Iterator<Item = &GenerationResult> {
        self.0.iter()
    }
}

/// Loads, persists, and clears the history snapshot.
///
/// Persistence failures degrade gracefully: they are logged as warnings and
/// the in-memory log stays the source of truth for the session.
#[derive(Debug)]
pub struct HistoryStore<S: Storage> {
    storage: S,
}

impl<S: Storage> HistoryStore<S> {
    /// Creates a store over the given storage backend.
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Reads the persisted snapshot. An absent, unreadable, or unparsable
    /// snapshot yields an empty log; this never fails.
    pub fn load(&self) -> HistoryLog {
        let raw = match self.storage.get(HISTORY_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return HistoryLog::new(),
            Err(e) => {
                tracing::warn!("failed to load history: {e}");
                return HistoryLog::new();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(log) => log,
            Err(e) => {
                tracing::warn!("failed to parse history snapshot: {e}");
                HistoryLog::new()
            }
        }
    }

    /// Writes the full log as one snapshot, overwriting any prior one.
    pub fn persist(&mut self, log: &HistoryLog) {
        let snapshot = match serde_json::to_string(log) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::warn!("failed to serialize history: {e}");
                return;
            }
        };
        if let Err(e) = self.storage.set(HISTORY_KEY, &snapshot) {
            tracing::warn!("failed to save history: {e}");
        }
    }

    /// Removes the persisted snapshot.
    pub fn clear(&mut self) {
        if let Err(e) = self.storage.remove(HISTORY_KEY) {
            tracing::warn!("failed to clear history: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(prompt: &str, timestamp: i64) -> GenerationResult {
        GenerationResult {
            url: format!("data:image/png;base64,{prompt}"),
            prompt: prompt.to_string(),
            timestamp,
        }
    }

    #[test]
    fn test_append_prepends() {
        let log = HistoryLog::new().append(entry("first", 1)).append(entry("second", 2));

        assert_eq!(log.len(), 2);
        assert_eq!(log.get(0).unwrap().prompt, "second");
        assert_eq!(log.get(1).unwrap().prompt, "first");
    }

    #[test]
    fn test_append_is_pure() {
        let log = HistoryLog::new().append(entry("kept", 1));
        let _bigger = log.append(entry("new", 2));
        assert_eq!(log.len(), 1);
        assert_eq!(log.get(0).unwrap().prompt, "kept");
    }

    #[test]
    fn test_append_evicts_oldest_at_capacity() {
        let mut log = HistoryLog::new();
        for i in 0..HISTORY_CAPACITY {
            log = log.append(entry(&format!("p{i}"), i as i64));
        }
        assert_eq!(log.len(), HISTORY_CAPACITY);
        assert_eq!(log.get(HISTORY_CAPACITY - 1).unwrap().prompt, "p0");

        log = log.append(entry("newest", 99));
        assert_eq!(log.len(), HISTORY_CAPACITY);
        assert_eq!(log.get(0).unwrap().prompt, "newest");
        // p0 fell off the tail; p1 is now last
        assert_eq!(log.get(HISTORY_CAPACITY - 1).unwrap().prompt, "p1");
    }

    #[test]
    fn test_persist_load_round_trip() {
        let mut store = HistoryStore::new(MemoryStorage::new());
        let log = HistoryLog::new()
            .append(entry("one", 1))
            .append(entry("two", 2));

        store.persist(&log);
        assert_eq!(store.load(), log);
    }

    #[test]
    fn test_load_missing_snapshot_is_empty() {
        let store = HistoryStore::new(MemoryStorage::new());
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_load_corrupt_snapshot_is_empty() {
        let mut storage = MemoryStorage::new();
        storage.set(HISTORY_KEY, "{not valid json").unwrap();
        let store = HistoryStore::new(storage);
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_load_wrong_shape_is_empty() {
        let mut storage = MemoryStorage::new();
        storage.set(HISTORY_KEY, r#"{"url": "not-an-array"}"#).unwrap();
        let store = HistoryStore::new(storage);
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_clear_removes_snapshot() {
        let mut store = HistoryStore::new(MemoryStorage::new());
        store.persist(&HistoryLog::new().append(entry("gone", 1)));
        assert_eq!(store.load().len(), 1);

        store.clear();
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_snapshot_is_plain_json_array() {
        let mut store = HistoryStore::new(MemoryStorage::new());
        store.persist(&HistoryLog::new().append(entry("shape", 7)));

        let raw = store.storage.get(HISTORY_KEY).unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert!(value.is_array());
        assert_eq!(value[0]["prompt"], "shape");
        assert_eq!(value[0]["timestamp"], 7);
    }

    #[test]
    fn test_file_storage_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = FileStorage::new(dir.path().join("store"));

        assert_eq!(storage.get("k").unwrap(), None);
        storage.set("k", "v").unwrap();
        assert_eq!(storage.get("k").unwrap().as_deref(), Some("v"));

        storage.set("k", "v2").unwrap();
        assert_eq!(storage.get("k").unwrap().as_deref(), Some("v2"));

        storage.remove("k").unwrap();
        assert_eq!(storage.get("k").unwrap(), None);
        // Removing again is not an error
        storage.remove("k").unwrap();
    }
}
