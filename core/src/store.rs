//! Key-value sources for the API credential.
//!
//! # Design
//! The credential is read once, when a `ClientConfig` is built, from
//! whichever store the host provides. `JsonFileStore` is the persistent
//! option: a flat JSON object on disk, read and written whole.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

/// Read-only lookup of string values by key.
pub trait CredentialStore {
    fn get(&self, key: &str) -> Option<String>;
}

/// In-memory store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }
}

impl CredentialStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}

/// Reads keys from process environment variables.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvStore;

impl CredentialStore for EnvStore {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// A JSON object file of string values.
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

    /// Write `key` to the file, keeping every other entry.
    pub fn set(&self, key: &str, value: &str) -> io::Result<()> {
        let mut values = self.load().unwrap_or_default();
        values.insert(key.to_string(), value.to_string());
        let json = serde_json::to_string_pretty(&values)?;
        std::fs::write(&self.path, json)
    }

    fn load(&self) -> Option<HashMap<String, String>> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "could not read credential store");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(values) => Some(values),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "credential store is not a JSON object of strings");
                None
            }
        }
    }
}

impl CredentialStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.load()?.remove(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_returns_what_was_set() {
        let mut store = MemoryStore::new();
        assert!(store.get("API_KEY").is_none());
        store.set("API_KEY", "abc");
        assert_eq!(store.get("API_KEY").as_deref(), Some("abc"));
    }

    #[test]
    fn json_file_store_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("missing.json"));
        assert!(store.get("API_KEY").is_none());
    }

    #[test]
    fn json_file_store_persists_and_keeps_other_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        std::fs::write(&path, r#"{"theme":"dark"}"#).unwrap();

        let store = JsonFileStore::new(&path);
        store.set("API_KEY", "from-disk").unwrap();

        let reopened = JsonFileStore::new(&path);
        assert_eq!(reopened.get("API_KEY").as_deref(), Some("from-disk"));
        assert_eq!(reopened.get("theme").as_deref(), Some("dark"));
    }

    #[test]
    fn json_file_store_ignores_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(JsonFileStore::new(&path).get("API_KEY").is_none());
    }
}
