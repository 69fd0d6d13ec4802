//! Durable per-visitor key/value storage.
//!
//! The storefront keeps a visitor's bearer token, role, and cart snapshot as
//! plain strings under fixed keys. [`LocalStorage`] is the port; the
//! production adapter is the visitor's `tower_sessions::Session`, and
//! [`MemoryStorage`] backs unit tests.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

use thiserror::Error;
use tower_sessions::Session;

/// Errors reading or writing visitor storage.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The session store failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),
}

/// String key/value storage scoped to one visitor.
pub trait LocalStorage: Send + Sync {
    /// Read the value under `key`.
    fn get_item(&self, key: &str)
    -> impl Future<Output = Result<Option<String>, StorageError>> + Send;

    /// Store `value` under `key`, replacing any previous value.
    fn set_item(
        &self,
        key: &str,
        value: String,
    ) -> impl Future<Output = Result<(), StorageError>> + Send;

    /// Delete `key`. Deleting a missing key is not an error.
    fn remove_item(&self, key: &str) -> impl Future<Output = Result<(), StorageError>> + Send;
}

impl LocalStorage for Session {
    async fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.get::<String>(key).await?)
    }

    async fn set_item(&self, key: &str, value: String) -> Result<(), StorageError> {
        Ok(self.insert(key, value).await?)
    }

    async fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.remove::<serde_json::Value>(key).await?;
        Ok(())
    }
}

/// In-memory [`LocalStorage`], shared between clones.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    items: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStorage {
    /// Create empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `key` currently holds a value.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.lock().contains_key(key)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.items.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl LocalStorage for MemoryStorage {
    async fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.lock().get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: String) -> Result<(), StorageError> {
        self.lock().insert(key.to_string(), value);
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.lock().remove(key);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_storage_set_get_remove() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get_item("token").await.unwrap(), None);

        storage.set_item("token", "abc".to_string()).await.unwrap();
        assert_eq!(storage.get_item("token").await.unwrap().as_deref(), Some("abc"));

        storage.remove_item("token").await.unwrap();
        assert!(!storage.contains("token"));
        storage.remove_item("token").await.unwrap();
    }

    #[tokio::test]
    async fn test_memory_storage_clones_share_state() {
        let storage = MemoryStorage::new();
        let view = storage.clone();

        storage.set_item("role", "ADMIN".to_string()).await.unwrap();
        assert_eq!(view.get_item("role").await.unwrap().as_deref(), Some("ADMIN"));
    }
}
