// ABOUTME: JSON file backed key-value store that survives process restarts
// ABOUTME: Loads the whole map on open and rewrites it atomically on every mutation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::KeyValueStore;
use crate::errors::{AppError, AppResult};
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::debug;

/// Key-value store persisted as a single JSON object on disk
///
/// Writes go to a sibling temporary file which is then renamed over the target, so a
/// crash mid-write leaves the previous contents intact.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl JsonFileStore {
    /// Open the store at `path`, starting empty if the file does not exist
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or is not a JSON object
    pub async fn open(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref().to_path_buf();
        let entries = match tokio::fs::read_to_string(&path).await {
            Ok(raw) if raw.trim().is_empty() => BTreeMap::new(),
            Ok(raw) => serde_json::from_str(&raw).map_err(|e| {
                AppError::storage(format!("corrupt store file {}", path.display())).with_source(e)
            })?,
            Err(e) if e.kind() == ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        debug!(path = %path.display(), entries = entries.len(), "Opened JSON file store");
        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    /// Location of the backing file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self, entries: &BTreeMap<String, String>) -> AppResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let raw = serde_json::to_vec_pretty(entries)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, raw).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl KeyValueStore for JsonFileStore {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> AppResult<()> {
        let mut entries = self.entries.lock().await;
        let previous = entries.insert(key.to_owned(), value);
        if let Err(e) = self.persist(&entries).await {
            // Keep memory consistent with disk
            match previous {
                Some(old) => entries.insert(key.to_owned(), old),
                None => entries.remove(key),
            };
            return Err(e);
        }
        Ok(())
    }

    async fn remove(&self, key: &str) -> AppResult<()> {
        let mut entries = self.entries.lock().await;
        let Some(previous) = entries.remove(key) else {
            return Ok(());
        };
        if let Err(e) = self.persist(&entries).await {
            entries.insert(key.to_owned(), previous);
            return Err(e);
        }
        Ok(())
    }

    async fn keys_with_prefix(&self, prefix: &str) -> AppResult<Vec<String>> {
        Ok(self
            .entries
            .lock()
            .await
            .keys()
            .filter(|key| key.starts_with(prefix))
            .cloned()
            .collect())
    }
}
