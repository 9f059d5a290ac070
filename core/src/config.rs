//! Client configuration: base URL and API credential.
//!
//! A `ClientConfig` is built once and moved into the `ApiClient`; nothing
//! in the crate reads configuration from globals after that.

use crate::store::{CredentialStore, EnvStore};

/// Store key the credential is read from.
pub const API_KEY_STORAGE_KEY: &str = "API_KEY";

/// Credential used when the store has none. The development backend
/// accepts it; production deployments are expected to set their own.
pub const DEFAULT_API_KEY: &str = "dev_key_change_me";

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Environment variable holding the base URL for `from_env`.
pub const BASE_URL_ENV: &str = "ADMIN_API_BASE_URL";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    base_url: String,
    api_key: Option<String>,
}

impl ClientConfig {
    /// A configuration with no credential. Requests go out unauthenticated
    /// and a 401 is never retried.
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: None,
        }
    }

    /// Set the credential. An empty key counts as none.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        let key = api_key.into();
        self.api_key = (!key.is_empty()).then_some(key);
        self
    }

    /// Read the credential from `store`, falling back to
    /// [`DEFAULT_API_KEY`].
    pub fn from_store(base_url: &str, store: &dyn CredentialStore) -> Self {
        let key = match store.get(API_KEY_STORAGE_KEY).filter(|k| !k.is_empty()) {
            Some(key) => key,
            None => {
                tracing::warn!(
                    key = API_KEY_STORAGE_KEY,
                    "no stored API key, using the development default"
                );
                DEFAULT_API_KEY.to_string()
            }
        };
        Self::new(base_url).with_api_key(key)
    }

    /// Base URL from `ADMIN_API_BASE_URL`, credential from the `API_KEY`
    /// environment variable.
    pub fn from_env() -> Self {
        let base_url = std::env::var(BASE_URL_ENV).unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Self::from_store(&base_url, &EnvStore)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn trailing_slash_is_stripped() {
        let config = ClientConfig::new("http://localhost:8000/");
        assert_eq!(config.base_url(), "http://localhost:8000");
    }

    #[test]
    fn empty_key_means_no_credential() {
        let config = ClientConfig::new(DEFAULT_BASE_URL).with_api_key("");
        assert!(config.api_key().is_none());
    }

    #[test]
    fn store_key_wins_over_default() {
        let mut store = MemoryStore::new();
        store.set(API_KEY_STORAGE_KEY, "stored");
        let config = ClientConfig::from_store(DEFAULT_BASE_URL, &store);
        assert_eq!(config.api_key(), Some("stored"));
    }

    #[test]
    fn missing_store_key_falls_back_to_default() {
        let config = ClientConfig::from_store(DEFAULT_BASE_URL, &MemoryStore::new());
        assert_eq!(config.api_key(), Some(DEFAULT_API_KEY));
    }

    #[test]
    fn empty_store_key_falls_back_to_default() {
        let mut store = MemoryStore::new();
        store.set(API_KEY_STORAGE_KEY, "");
        let config = ClientConfig::from_store(DEFAULT_BASE_URL, &store);
        assert_eq!(config.api_key(), Some(DEFAULT_API_KEY));
    }
}
