//! JSON file backed score store

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use super::{ScoreStore, StoreError};

/// Whole file is one JSON object of `key -> number`, rewritten on each set.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, f64>, StoreError> {
        match fs::read_to_string(&self.path) {
            Ok(json) => Ok(serde_json::from_str(&json)?),
            // No file yet is just an empty store
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, key: &str, value: f64) -> Result<(), StoreError> {
        let mut all = self.read_all()?;
        all.insert(key.to_string(), value);
        let json = serde_json::to_string_pretty(&all)?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}

impl ScoreStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<f64> {
        match self.read_all() {
            Ok(all) => all.get(key).copied(),
            Err(e) => {
                log::warn!("Reading {} failed: {e}", self.path.display());
                None
            }
        }
    }

    fn set(&mut self, key: &str, value: f64) -> bool {
        match self.write(key, value) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Writing {} failed: {e}", self.path.display());
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch(name: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "arcade-trio-{}-{}.json",
            name,
            std::process::id()
        ));
        let _ = fs::remove_file(&path);
        path
    }

    #[test]
    fn test_missing_file_reads_empty() {
        let store = JsonFileStore::new(scratch("missing"));
        assert_eq!(store.get("snake"), None);
    }

    #[test]
    fn test_values_survive_reopen() {
        let path = scratch("reopen");
        let mut store = JsonFileStore::new(&path);
        assert!(store.set("snake", 90.0));
        assert!(store.set("tiles", 2048.0));

        let reopened = JsonFileStore::new(&path);
        assert_eq!(reopened.get("snake"), Some(90.0));
        assert_eq!(reopened.get("tiles"), Some(2048.0));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn test_corrupt_file_degrades() {
        let path = scratch("corrupt");
        fs::write(&path, "{ not json").unwrap();
        let mut store = JsonFileStore::new(&path);
        assert_eq!(store.get("snake"), None);
        assert!(!store.set("snake", 1.0));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn test_unwritable_path_degrades() {
        let dir = scratch("dir-as-file");
        fs::create_dir_all(&dir).unwrap();
        let mut store = JsonFileStore::new(&dir);
        assert!(!store.set("snake", 1.0));
        assert_eq!(store.get("snake"), None);
        let _ = fs::remove_dir_all(dir);
    }
}
