//! Key-value persistence for the shared clock record

use std::{
    collections::HashMap,
    fmt::Debug,
    fs,
    io::ErrorKind,
    path::PathBuf,
    sync::Mutex,
};
use anyhow::{anyhow, Context, Result};
use tracing::debug;

/// Key of the clock record
pub const CLOCK_KEY: &str = "tournamentTimer";
/// Key of the tournament metadata record
pub const TOURNAMENT_KEY: &str = "tournamentData";
/// Key of the mirrored reward list
pub const PRIZES_KEY: &str = "tournamentPrizes";

/// Opaque record storage shared by every clock instance.
///
/// Writers never coordinate: the last `save` for a key wins.
pub trait StateStore: Send + Sync + Debug {
    /// Read the raw record stored under `key`, `None` when absent
    fn load(&self, key: &str) -> Result<Option<String>>;

    /// Replace the record stored under `key`
    fn save(&self, key: &str, value: &str) -> Result<()>;

    /// Delete the record stored under `key`; absent keys are not an error
    fn remove(&self, key: &str) -> Result<()>;
}

/// One JSON file per key inside a data directory
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl StateStore for FileStore {
    fn load(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).context(format!("Failed to read record {}", path.display())),
        }
    }

    fn save(&self, key: &str, value: &str) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .context(format!("Failed to create data directory: {}", self.dir.display()))?;

        // readers polling the file must never see a half-written record
        let path = self.path_for(key);
        let tmp = self.dir.join(format!(".{}.json.tmp", key));
        fs::write(&tmp, value)
            .context(format!("Failed to write record to {}", tmp.display()))?;
        fs::rename(&tmp, &path)
            .context(format!("Failed to move record into {}", path.display()))?;

        debug!(key = %key, bytes = value.len(), "Record saved");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.path_for(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).context(format!("Failed to remove record {}", path.display())),
        }
    }
}

/// In-process store, shared between engines through an `Arc`
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<String>> {
        let records = self.records.lock()
            .map_err(|e| anyhow!("Failed to lock memory store: {}", e))?;
        Ok(records.get(key).cloned())
    }

    fn save(&self, key: &str, value: &str) -> Result<()> {
        let mut records = self.records.lock()
            .map_err(|e| anyhow!("Failed to lock memory store: {}", e))?;
        records.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut records = self.records.lock()
            .map_err(|e| anyhow!("Failed to lock memory store: {}", e))?;
        records.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("data"));

        assert_eq!(store.load(CLOCK_KEY).unwrap(), None);
        store.save(CLOCK_KEY, "{\"a\":1}").unwrap();
        assert_eq!(store.load(CLOCK_KEY).unwrap().as_deref(), Some("{\"a\":1}"));

        store.remove(CLOCK_KEY).unwrap();
        assert_eq!(store.load(CLOCK_KEY).unwrap(), None);
        // removing twice is fine
        store.remove(CLOCK_KEY).unwrap();
    }

    #[test]
    fn test_memory_store_last_write_wins() {
        let store = MemoryStore::new();
        store.save(TOURNAMENT_KEY, "first").unwrap();
        store.save(TOURNAMENT_KEY, "second").unwrap();
        assert_eq!(store.load(TOURNAMENT_KEY).unwrap().as_deref(), Some("second"));
    }
}
