use std::fs;
use std::io;
use std::path::PathBuf;

use anyhow::Context;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

/// Local key-value storage: one pretty-printed JSON file per named slot.
///
/// Reads and writes never fail the caller. A missing, unreadable or corrupt
/// slot reads as `None`; a failed write is logged and skipped.
#[derive(Debug, Clone)]
pub struct LocalStore {
    dir: PathBuf,
}

impl LocalStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn slot_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }

    pub fn read<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let path = self.slot_path(key);
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "slot is empty");
                return None;
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "failed to read slot");
                return None;
            }
        };

        match serde_json::from_str(&text) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(path = %path.display(), error = %err, "corrupt slot, ignoring");
                None
            }
        }
    }

    /// Returns whether the value reached disk.
    pub fn write<T: Serialize>(&self, key: &str, value: &T) -> bool {
        let path = self.slot_path(key);
        let result = (|| -> anyhow::Result<()> {
            fs::create_dir_all(&self.dir).with_context(|| {
                format!("Failed to create data directory '{}'", self.dir.display())
            })?;
            let json = serde_json::to_string_pretty(value)
                .with_context(|| format!("Failed to serialize slot '{}'", key))?;
            fs::write(&path, json).context("Failed to write slot file")?;
            Ok(())
        })();

        match result {
            Ok(()) => {
                debug!(path = %path.display(), "slot written");
                true
            }
            Err(error) => {
                let error = format!("{:#}", error);
                warn!(path = %path.display(), %error, "failed to write slot, skipping");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_write_then_read_slot() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path().join("nested"));
        let value: BTreeMap<String, u32> = [("oeufs".to_string(), 6)].into_iter().collect();

        assert!(store.write("counts", &value));
        assert_eq!(store.read::<BTreeMap<String, u32>>("counts"), Some(value));
    }

    #[test]
    fn test_missing_and_corrupt_slots_read_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path());

        assert_eq!(store.read::<Vec<String>>("absent"), None);

        fs::write(store.slot_path("broken"), "{ not json").unwrap();
        assert_eq!(store.read::<Vec<String>>("broken"), None);
    }

    #[test]
    fn test_write_failure_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, "x").unwrap();

        // A regular file where the directory should be.
        let store = LocalStore::new(&blocker);
        assert!(!store.write("slot", &vec![1, 2, 3]));
    }
}
