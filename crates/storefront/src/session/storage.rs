//! Key/value session storage backends.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use thiserror::Error;

/// Errors from a storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The cookie session could not be read or written.
    #[error("session store error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// A value could not be serialized.
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// String key/value storage scoped to one visitor.
#[async_trait]
pub trait SessionStorage: Send + Sync {
    /// Read a value.
    async fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write a value, replacing any previous one.
    async fn set_item(&self, key: &str, value: String) -> Result<(), StorageError>;

    /// Delete a value. Deleting a missing key is not an error.
    async fn remove_item(&self, key: &str) -> Result<(), StorageError>;
}

/// Cookie-identified server-side session (production backend).
#[async_trait]
impl SessionStorage for tower_sessions::Session {
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

/// In-process storage, used by tests and tools.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    /// Create empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether no keys are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_empty()
    }
}

#[async_trait]
impl SessionStorage for MemoryStorage {
    async fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self
            .items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned())
    }

    async fn set_item(&self, key: &str, value: String) -> Result<(), StorageError> {
        self.items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value);
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use tower_sessions::{MemoryStore, Session};

    use super::*;

    #[tokio::test]
    async fn test_memory_storage_roundtrip() {
        let storage = MemoryStorage::new();
        storage.set_item("token", "abc".to_string()).await.unwrap();
        assert_eq!(storage.get_item("token").await.unwrap().as_deref(), Some("abc"));

        storage.remove_item("token").await.unwrap();
        storage.remove_item("token").await.unwrap();
        assert!(storage.get_item("token").await.unwrap().is_none());
        assert!(storage.is_empty());
    }

    #[tokio::test]
    async fn test_tower_session_backend() {
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);

        session.set_item("user", r#"{"uid":"1"}"#.to_string()).await.unwrap();
        assert_eq!(
            session.get_item("user").await.unwrap().as_deref(),
            Some(r#"{"uid":"1"}"#)
        );

        session.remove_item("user").await.unwrap();
        assert!(session.get_item("user").await.unwrap().is_none());
    }
}
