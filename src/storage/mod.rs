//! Key-value hint cache shared across sessions.
//!
//! The decorator reads the last identity provider hint and identity
//! management id before asking the BFF for configuration, and writes back
//! whatever the BFF returns. Keys live in [`crate::consts`].

pub mod sqlite;

use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::Result;

/// String key-value storage. Implementations must tolerate missing keys.
pub trait HintStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// Process-local store. Contents vanish with the process.
#[derive(Debug, Default)]
pub struct MemoryHintStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryHintStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store, e.g. with values a previous session left behind.
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let entries = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            entries: Mutex::new(entries),
        }
    }
}

impl HintStore for MemoryHintStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries.lock().unwrap().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_is_none() {
        let store = MemoryHintStore::new();
        assert!(store.get("kcIdpHint").unwrap().is_none());
    }

    #[test]
    fn seeded_entries_are_readable() {
        let store = MemoryHintStore::with_entries([("kcIdpHint", "corp-idp")]);
        assert_eq!(store.get("kcIdpHint").unwrap().as_deref(), Some("corp-idp"));
    }

    #[test]
    fn set_overwrites_and_remove_clears() {
        let store = MemoryHintStore::new();
        store.set("idmId", "one").unwrap();
        store.set("idmId", "two").unwrap();
        assert_eq!(store.get("idmId").unwrap().as_deref(), Some("two"));

        store.remove("idmId").unwrap();
        assert!(store.get("idmId").unwrap().is_none());
    }
}
