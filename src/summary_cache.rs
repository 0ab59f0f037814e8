// ABOUTME: Per-workout summary cache recording what was uploaded for each workout
// ABOUTME: Secondary consumer of the persisted store, written best-effort after confirmed uploads
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;
use tracing::{debug, warn};

use crate::constants::store::SUMMARY_PREFIX;
use crate::errors::AppResult;
use crate::models::WorkoutSummary;
use crate::store::{KeyValueStore, KeyValueStoreExt};

/// Cache of uploaded workout summaries for display without re-querying the health store
#[derive(Clone)]
pub struct WorkoutSummaryCache {
    store: Arc<dyn KeyValueStore>,
}

impl WorkoutSummaryCache {
    /// Create a cache over `store`
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    fn key(workout_id: &str) -> String {
        format!("{SUMMARY_PREFIX}{workout_id}")
    }

    /// Cached summary for a workout
    ///
    /// # Errors
    ///
    /// Returns an error if the stored summary cannot be read
    pub async fn get(&self, workout_id: &str) -> AppResult<Option<WorkoutSummary>> {
        self.store.get_json(&Self::key(workout_id)).await
    }

    /// Store a summary; failures are logged and never surface to the upload caller
    pub async fn put(&self, summary: &WorkoutSummary) {
        match self
            .store
            .set_json(&Self::key(&summary.workout_id), summary)
            .await
        {
            Ok(()) => debug!(workout_id = %summary.workout_id, "Cached workout summary"),
            Err(e) => warn!(workout_id = %summary.workout_id, error = %e, "Failed to cache workout summary"),
        }
    }

    /// Remove every cached summary
    ///
    /// # Errors
    ///
    /// Returns an error if entries cannot be removed
    pub async fn clear(&self) -> AppResult<usize> {
        self.store.remove_prefix(SUMMARY_PREFIX).await
    }
}
