// ABOUTME: Upload tracker persisting which workouts the remote service has confirmed
// ABOUTME: Namespaced idempotency ledger over an injected key-value store, cleared on logout
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{info, warn};

use crate::clock::Clock;
use crate::constants::store::TRACKER_PREFIX;
use crate::errors::AppResult;
use crate::models::UploadRecord;
use crate::store::{KeyValueStore, KeyValueStoreExt};

/// Idempotency ledger for workout uploads
///
/// A record is only written after the remote service confirms an upload, and once
/// written `is_uploaded` stays true until [`UploadTracker::clear`]. Forced re-uploads
/// overwrite the record on success and never remove it beforehand.
///
/// Reads fail open: an unreadable record is reported as "not uploaded".
#[derive(Clone)]
pub struct UploadTracker {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
}

impl UploadTracker {
    /// Create a tracker over `store`
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    fn key(workout_id: &str) -> String {
        format!("{TRACKER_PREFIX}{workout_id}")
    }

    /// Ledger entry for a workout, if any
    pub async fn record(&self, workout_id: &str) -> Option<UploadRecord> {
        match self.store.get_json::<UploadRecord>(&Self::key(workout_id)).await {
            Ok(record) => record,
            Err(e) => {
                warn!(workout_id = %workout_id, error = %e, "Unreadable upload record, treating as not uploaded");
                None
            }
        }
    }

    /// Whether the workout has a confirmed upload
    pub async fn is_uploaded(&self, workout_id: &str) -> bool {
        self.record(workout_id)
            .await
            .is_some_and(|record| record.uploaded)
    }

    /// Whether the confirmed upload carried heart rate data
    pub async fn has_heart_rate(&self, workout_id: &str) -> bool {
        self.record(workout_id)
            .await
            .is_some_and(|record| record.has_heart_rate)
    }

    /// When the upload was confirmed
    pub async fn uploaded_at(&self, workout_id: &str) -> Option<DateTime<Utc>> {
        self.record(workout_id)
            .await
            .map(|record| record.uploaded_at)
    }

    /// Record a confirmed upload
    ///
    /// # Errors
    ///
    /// Returns an error if the ledger cannot be written
    pub async fn mark_uploaded(
        &self,
        workout_id: &str,
        has_heart_rate: bool,
    ) -> AppResult<UploadRecord> {
        let record = UploadRecord {
            uploaded: true,
            has_heart_rate,
            uploaded_at: self.clock.now(),
        };
        self.store
            .set_json(&Self::key(workout_id), &record)
            .await?;
        Ok(record)
    }

    /// Ids of every workout in the ledger
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be listed
    pub async fn uploaded_ids(&self) -> AppResult<Vec<String>> {
        Ok(self
            .store
            .keys_with_prefix(TRACKER_PREFIX)
            .await?
            .into_iter()
            .filter_map(|key| key.strip_prefix(TRACKER_PREFIX).map(str::to_owned))
            .collect())
    }

    /// Wipe the whole ledger, e.g. on logout
    ///
    /// # Errors
    ///
    /// Returns an error if entries cannot be removed
    pub async fn clear(&self) -> AppResult<()> {
        let removed = self.store.remove_prefix(TRACKER_PREFIX).await?;
        info!(removed, "Cleared upload tracker");
        Ok(())
    }
}
