//! Per-visitor key/value storage.
//!
//! Cart, wishlist, currency preference and visitor identity are persisted
//! under fixed keys (see [`crate::models::session::keys`]). In the running
//! server the backing store is the visitor's `tower_sessions::Session`; tests
//! and tooling use [`MemoryStorage`].

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tower_sessions::Session;

/// Errors raised by a [`Storage`] backend.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("storage lock poisoned")]
    Poisoned,
}

/// Async key/value store holding JSON-serializable values.
pub trait Storage: Send + Sync {
    /// Read the value under `key`, or `None` if unset.
    fn fetch<T>(&self, key: &str) -> impl Future<Output = Result<Option<T>, StorageError>> + Send
    where
        T: DeserializeOwned + Send;

    /// Write `value` under `key`, replacing any previous value.
    fn put<T>(&self, key: &str, value: &T) -> impl Future<Output = Result<(), StorageError>> + Send
    where
        T: Serialize + Sync;

    /// Remove the value under `key`.
    fn evict(&self, key: &str) -> impl Future<Output = Result<(), StorageError>> + Send;
}

impl Storage for Session {
    async fn fetch<T>(&self, key: &str) -> Result<Option<T>, StorageError>
    where
        T: DeserializeOwned + Send,
    {
        Ok(self.get::<T>(key).await?)
    }

    async fn put<T>(&self, key: &str, value: &T) -> Result<(), StorageError>
    where
        T: Serialize + Sync,
    {
        self.insert(key, value).await?;
        Ok(())
    }

    async fn evict(&self, key: &str) -> Result<(), StorageError> {
        self.remove_value(key).await?;
        Ok(())
    }
}

/// In-process storage backed by a JSON map.
///
/// Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    values: Arc<Mutex<HashMap<String, serde_json::Value>>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw JSON stored under `key`.
    #[must_use]
    pub fn raw(&self, key: &str) -> Option<serde_json::Value> {
        self.values.lock().ok()?.get(key).cloned()
    }

    /// Store raw JSON under `key`, bypassing serialization.
    pub fn set_raw(&self, key: &str, value: serde_json::Value) {
        if let Ok(mut values) = self.values.lock() {
            values.insert(key.to_string(), value);
        }
    }
}

impl Storage for MemoryStorage {
    async fn fetch<T>(&self, key: &str) -> Result<Option<T>, StorageError>
    where
        T: DeserializeOwned + Send,
    {
        let value = {
            let values = self.values.lock().map_err(|_| StorageError::Poisoned)?;
            values.get(key).cloned()
        };
        value
            .map(serde_json::from_value)
            .transpose()
            .map_err(StorageError::from)
    }

    async fn put<T>(&self, key: &str, value: &T) -> Result<(), StorageError>
    where
        T: Serialize + Sync,
    {
        let json = serde_json::to_value(value)?;
        self.values
            .lock()
            .map_err(|_| StorageError::Poisoned)?
            .insert(key.to_string(), json);
        Ok(())
    }

    async fn evict(&self, key: &str) -> Result<(), StorageError> {
        self.values
            .lock()
            .map_err(|_| StorageError::Poisoned)?
            .remove(key);
        Ok(())
    }
}
