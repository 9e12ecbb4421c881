//! In-memory store.

use std::{cell::RefCell, collections::HashMap};

use super::{HoleStore, Result, StorageError};

/// A `HashMap`-backed store. Can be switched into a failing mode to
/// exercise the paths where persistence is unavailable.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<HashMap<String, String>>,
    failing: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose every call fails.
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    /// Raw value under `key`, bypassing the failure switch.
    pub fn peek(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    fn check(&self) -> Result<()> {
        if self.failing {
            return Err(StorageError::Unavailable("memory store is failing".into()));
        }
        Ok(())
    }
}

impl HoleStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.check()?;
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.check()?;
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_then_get() {
        let store = MemoryStore::new();
        store.set("k", "v").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
        assert_eq!(store.get("missing").unwrap(), None);
    }

    #[test]
    fn failing_store_rejects_everything() {
        let store = MemoryStore::failing();
        assert!(matches!(
            store.set("k", "v").unwrap_err(),
            StorageError::Unavailable(_)
        ));
        assert!(store.get("k").is_err());
        assert_eq!(store.peek("k"), None);
    }
}
