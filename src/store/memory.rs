// ABOUTME: In-memory key-value store implementation
// ABOUTME: Shared map behind an async RwLock; clones share the same entries
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::KeyValueStore;
use crate::errors::AppResult;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory key-value store
///
/// Uses `Arc<RwLock<HashMap>>` so that clones handed to the tracker and the summary
/// cache observe each other's writes, the same way two handles on a persisted store would.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    entries: Arc<RwLock<HashMap<String, String>>>,
}

impl InMemoryStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Whether the store has no entries
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait::async_trait]
impl KeyValueStore for InMemoryStore {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> AppResult<()> {
        self.entries.write().await.insert(key.to_owned(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> AppResult<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }

    async fn keys_with_prefix(&self, prefix: &str) -> AppResult<Vec<String>> {
        let entries = self.entries.read().await;
        let mut keys: Vec<String> = entries
            .keys()
            .filter(|key| key.starts_with(prefix))
            .cloned()
            .collect();
        drop(entries);
        keys.sort();
        Ok(keys)
    }
}
