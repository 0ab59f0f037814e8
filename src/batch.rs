// ABOUTME: Batch upload orchestrator running a set of workouts through the coordinator in sequence
// ABOUTME: Deduplicates identical batches, paces uploads, aggregates results, publishes one update event
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use sha2::{Digest, Sha256};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::constants::upload::{BATCH_KEY_PREFIX, BATCH_NOTIFY_DELAY_MS, BATCH_PACING_MS};
use crate::coordinator::UploadCoordinator;
use crate::models::{
    BatchFailure, BatchUploadSummary, UploadOptions, WorkoutRecord, WorkoutsUpdated,
};
use crate::notifications::NotificationBus;
use crate::registry::TaskRegistry;

/// Reason attached to every workout when the batch task itself ended without a result
const BATCH_CANCELLED_REASON: &str = "batch upload cancelled";

/// Uploads many workouts as one deduplicated unit
#[derive(Clone)]
pub struct BatchUploadOrchestrator {
    coordinator: UploadCoordinator,
    registry: Arc<TaskRegistry<BatchUploadSummary>>,
    notifications: Arc<dyn NotificationBus>,
    clock: Arc<dyn Clock>,
    pacing: Duration,
    notify_delay: Duration,
}

impl BatchUploadOrchestrator {
    /// Create an orchestrator with default pacing and notification delay
    #[must_use]
    pub fn new(
        coordinator: UploadCoordinator,
        registry: Arc<TaskRegistry<BatchUploadSummary>>,
        notifications: Arc<dyn NotificationBus>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            coordinator,
            registry,
            notifications,
            clock,
            pacing: Duration::from_millis(BATCH_PACING_MS),
            notify_delay: Duration::from_millis(BATCH_NOTIFY_DELAY_MS),
        }
    }

    /// Override the delay between consecutive uploads
    #[must_use]
    pub const fn with_pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }

    /// Override the delay before the update event is published
    #[must_use]
    pub const fn with_notify_delay(mut self, delay: Duration) -> Self {
        self.notify_delay = delay;
        self
    }

    /// Single-flight key for a batch, derived from its membership in order
    #[must_use]
    pub fn batch_key(workouts: &[WorkoutRecord]) -> String {
        let mut hasher = Sha256::new();
        for workout in workouts {
            hasher.update(workout.id().as_bytes());
        }
        format!("{BATCH_KEY_PREFIX}{}", hex::encode(hasher.finalize()))
    }

    /// Upload every workout in order and report aggregate counts
    ///
    /// `force` re-uploads workouts the ledger already knows. `retry_heart_rate` forces only
    /// those previously uploaded without heart rate data. A concurrent call with the same
    /// membership shares the first call's summary.
    pub async fn upload_batch(
        &self,
        workouts: Vec<WorkoutRecord>,
        force: bool,
        retry_heart_rate: bool,
    ) -> BatchUploadSummary {
        if workouts.is_empty() {
            debug!("Empty batch, nothing to upload");
            return BatchUploadSummary::default();
        }

        let key = Self::batch_key(&workouts);
        let ids: Vec<String> = workouts.iter().map(WorkoutRecord::id).collect();
        let runner = self.clone();

        let summary = self
            .registry
            .execute(key.clone(), move || async move {
                runner.run_batch(workouts, force, retry_heart_rate).await
            })
            .await;

        summary.unwrap_or_else(|| {
            debug!(key = %key, "Batch task ended without a result");
            BatchUploadSummary {
                total: ids.len(),
                success: 0,
                failed: ids.len(),
                failures: ids
                    .into_iter()
                    .map(|workout_id| BatchFailure {
                        workout_id,
                        reason: BATCH_CANCELLED_REASON.to_owned(),
                    })
                    .collect(),
            }
        })
    }

    async fn run_batch(
        self,
        workouts: Vec<WorkoutRecord>,
        force: bool,
        retry_heart_rate: bool,
    ) -> BatchUploadSummary {
        let total = workouts.len();
        let mut summary = BatchUploadSummary {
            total,
            ..BatchUploadSummary::default()
        };
        info!(total, force, retry_heart_rate, "Starting batch upload");

        for (index, workout) in workouts.iter().enumerate() {
            let options = UploadOptions {
                force: force || (retry_heart_rate && self.needs_heart_rate_retry(workout).await),
            };

            match self.coordinator.upload_workout(workout, options).await {
                Ok(outcome) => {
                    summary.success += 1;
                    debug!(
                        workout_id = %outcome.workout_id,
                        status = ?outcome.status,
                        index,
                        "Batch item succeeded"
                    );
                }
                Err(e) => {
                    summary.failed += 1;
                    let workout_id = workout.id();
                    if e.is_cancelled() {
                        debug!(workout_id = %workout_id, index, error = %e, "Batch item cancelled");
                    } else {
                        warn!(workout_id = %workout_id, index, error = %e, "Batch item failed");
                    }
                    summary.failures.push(BatchFailure {
                        workout_id,
                        reason: e.user_reason(),
                    });
                }
            }

            if index + 1 < total {
                self.clock.sleep(self.pacing).await;
            }
        }

        if summary.success > 0 {
            self.clock.sleep(self.notify_delay).await;
            self.notifications.publish(WorkoutsUpdated {
                batch_upload: true,
                count: summary.success,
            });
        }

        info!(
            total = summary.total,
            success = summary.success,
            failed = summary.failed,
            "Batch upload finished"
        );
        summary
    }

    async fn needs_heart_rate_retry(&self, workout: &WorkoutRecord) -> bool {
        let workout_id = workout.id();
        self.coordinator
            .tracker()
            .record(&workout_id)
            .await
            .is_some_and(|record| record.uploaded && !record.has_heart_rate)
    }
}
