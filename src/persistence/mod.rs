//! Best-score persistence
//!
//! Stores are small key/value maps of numbers. A failing store never takes a
//! game down: reads come back empty, writes report `false`, and the cause is
//! logged at `warn`.

mod file;

pub use file::JsonFileStore;

use std::collections::HashMap;

use thiserror::Error;

/// Why a store operation failed. Only seen inside the store boundary.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed score file: {0}")]
    Format(#[from] serde_json::Error),
    #[error("store unavailable")]
    Unavailable,
}

pub trait ScoreStore {
    /// Saved value for `key`, `None` if missing or unreadable
    fn get(&self, key: &str) -> Option<f64>;

    /// Save `value` under `key`; `false` if the write was skipped
    fn set(&mut self, key: &str, value: f64) -> bool;
}

impl<S: ScoreStore + ?Sized> ScoreStore for Box<S> {
    fn get(&self, key: &str) -> Option<f64> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: f64) -> bool {
        (**self).set(key, value)
    }
}

/// In-process store. `failing()` builds one that rejects every call.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, f64>,
    failing: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            values: HashMap::new(),
            failing: true,
        }
    }

    pub fn with_value(mut self, key: &str, value: f64) -> Self {
        self.values.insert(key.to_string(), value);
        self
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.failing {
            Err(StoreError::Unavailable)
        } else {
            Ok(())
        }
    }
}

impl ScoreStore for MemoryStore {
    fn get(&self, key: &str) -> Option<f64> {
        match self.check() {
            Ok(()) => self.values.get(key).copied(),
            Err(e) => {
                log::warn!("Score read for {key:?} failed: {e}");
                None
            }
        }
    }

    fn set(&mut self, key: &str, value: f64) -> bool {
        match self.check() {
            Ok(()) => {
                self.values.insert(key.to_string(), value);
                true
            }
            Err(e) => {
                log::warn!("Score write for {key:?} skipped: {e}");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_round_trip() {
        let mut store = MemoryStore::new();
        assert_eq!(store.get("snake"), None);
        assert!(store.set("snake", 120.0));
        assert_eq!(store.get("snake"), Some(120.0));
        assert_eq!(store.get("tiles"), None);
    }

    #[test]
    fn test_failing_store_degrades() {
        let mut store = MemoryStore::failing().with_value("snake", 5.0);
        assert_eq!(store.get("snake"), None);
        assert!(!store.set("snake", 10.0));
    }

    #[test]
    fn test_boxed_store_delegates() {
        let mut store: Box<dyn ScoreStore> = Box::new(MemoryStore::new());
        assert!(store.set("breakout", 40.0));
        assert_eq!(store.get("breakout"), Some(40.0));
    }
}
