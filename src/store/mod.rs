// ABOUTME: Key-value store abstraction backing the upload ledger and summary cache
// ABOUTME: Pluggable backends (in-memory, JSON file) with typed JSON helpers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// JSON file backed store that survives restarts
pub mod file;
/// In-memory store for tests and ephemeral sessions
pub mod memory;

pub use file::JsonFileStore;
pub use memory::InMemoryStore;

use crate::errors::AppResult;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Persisted key-value store
///
/// Values are opaque strings; callers namespace their keys with a prefix so several
/// consumers can share one store and clear only their own entries.
///
/// # Examples
///
/// ```rust,no_run
/// use pierre_workout_sync::store::{InMemoryStore, KeyValueStore, KeyValueStoreExt};
/// # async fn example() -> Result<(), pierre_workout_sync::errors::AppError> {
/// let store = InMemoryStore::new();
/// store.set_json("prefs:units", &"metric").await?;
/// let units: Option<String> = store.get_json("prefs:units").await?;
/// assert_eq!(units.as_deref(), Some("metric"));
/// store.remove("prefs:units").await?;
/// # Ok(())
/// # }
/// ```
#[async_trait::async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the raw value stored under `key`
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read
    async fn get(&self, key: &str) -> AppResult<Option<String>>;

    /// Store `value` under `key`, replacing any previous value
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written
    async fn set(&self, key: &str, value: String) -> AppResult<()>;

    /// Remove `key`; removing a missing key is not an error
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written
    async fn remove(&self, key: &str) -> AppResult<()>;

    /// All keys starting with `prefix`
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read
    async fn keys_with_prefix(&self, prefix: &str) -> AppResult<Vec<String>>;
}

/// Typed JSON helpers over any [`KeyValueStore`]
#[async_trait::async_trait]
pub trait KeyValueStoreExt: KeyValueStore {
    /// Read and deserialize the value under `key`
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails or the stored JSON does not match `T`
    async fn get_json<T: DeserializeOwned>(&self, key: &str) -> AppResult<Option<T>> {
        match self.get(key).await? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// Serialize and store `value` under `key`
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails
    async fn set_json<T: Serialize + Sync>(&self, key: &str, value: &T) -> AppResult<()> {
        let raw = serde_json::to_string(value)?;
        self.set(key, raw).await
    }

    /// Remove every key starting with `prefix`, returning how many were removed
    ///
    /// # Errors
    ///
    /// Returns an error if listing or removal fails
    async fn remove_prefix(&self, prefix: &str) -> AppResult<usize> {
        let keys = self.keys_with_prefix(prefix).await?;
        for key in &keys {
            self.remove(key).await?;
        }
        Ok(keys.len())
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStoreExt for S {}
