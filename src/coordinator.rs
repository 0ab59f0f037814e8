// ABOUTME: Upload coordinator orchestrating one workout from dedup to ledger update
// ABOUTME: Single-flight keyed by workout id; tracker check, collection, validation, settling delay, submit
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Upload Coordinator
//!
//! State flow for one workout:
//!
//! ```text
//! Idle -> InFlight -> AlreadyUploaded
//!                  -> Collecting -> Validating -> Rejected
//!                                              -> Delaying -> Uploading -> Uploaded | Failed
//! ```
//!
//! Every attempt for a workout id runs through the [`TaskRegistry`] under
//! `upload_workout_<id>`, so concurrent callers share one physical attempt. The ledger is
//! written only after the remote service confirms the upload.

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::attribution;
use crate::clock::Clock;
use crate::client::UploadClient;
use crate::constants::upload::{SETTLING_DELAY_SECS, WORKOUT_KEY_PREFIX};
use crate::errors::UploadError;
use crate::health::HealthDataCollector;
use crate::models::{
    UploadOptions, UploadOutcome, UploadStatus, WorkoutRecord, WorkoutSummary,
    WorkoutUploadPayload,
};
use crate::registry::TaskRegistry;
use crate::summary_cache::WorkoutSummaryCache;
use crate::tracker::UploadTracker;
use crate::validation::DataQualityValidator;

/// Result shared by every caller of one single-flight attempt
pub type UploadResult = Result<UploadOutcome, UploadError>;

/// Coordinates the upload of individual workouts
///
/// Cheap to clone; clones share the registry, tracker, and collaborators.
#[derive(Clone)]
pub struct UploadCoordinator {
    collector: HealthDataCollector,
    validator: DataQualityValidator,
    tracker: UploadTracker,
    registry: Arc<TaskRegistry<UploadResult>>,
    client: Arc<dyn UploadClient>,
    clock: Arc<dyn Clock>,
    summary_cache: Option<WorkoutSummaryCache>,
    settling_delay: Duration,
}

impl UploadCoordinator {
    /// Wire a coordinator from its collaborators
    #[must_use]
    pub fn new(
        collector: HealthDataCollector,
        validator: DataQualityValidator,
        tracker: UploadTracker,
        registry: Arc<TaskRegistry<UploadResult>>,
        client: Arc<dyn UploadClient>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            collector,
            validator,
            tracker,
            registry,
            client,
            clock,
            summary_cache: None,
            settling_delay: Duration::from_secs(SETTLING_DELAY_SECS),
        }
    }

    /// Override the settling delay before submission
    #[must_use]
    pub const fn with_settling_delay(mut self, delay: Duration) -> Self {
        self.settling_delay = delay;
        self
    }

    /// Record a summary of every confirmed upload
    #[must_use]
    pub fn with_summary_cache(mut self, cache: WorkoutSummaryCache) -> Self {
        self.summary_cache = Some(cache);
        self
    }

    /// The idempotency ledger used by this coordinator
    #[must_use]
    pub const fn tracker(&self) -> &UploadTracker {
        &self.tracker
    }

    /// Single-flight key for a workout id
    #[must_use]
    pub fn task_key(workout_id: &str) -> String {
        format!("{WORKOUT_KEY_PREFIX}{workout_id}")
    }

    /// Upload one workout exactly once
    ///
    /// Concurrent calls for the same workout share the outcome of a single attempt,
    /// including the `force` flag of whichever call started it.
    ///
    /// # Errors
    ///
    /// - `InvalidWorkoutData` if the duration is not positive or validation rejects the data
    /// - `UploadTransport` if the remote service did not confirm the upload
    /// - `Storage` if the upload was confirmed but the ledger could not be written
    /// - `TaskCancelled` if the attempt ended without a result
    pub async fn upload_workout(
        &self,
        workout: &WorkoutRecord,
        options: UploadOptions,
    ) -> UploadResult {
        let workout_id = workout.id();
        let key = Self::task_key(&workout_id);

        let pipeline = self.clone();
        let workout = workout.clone();
        let result = self
            .registry
            .execute(key.clone(), move || async move {
                pipeline.run_pipeline(workout, workout_id, options).await
            })
            .await;

        result.unwrap_or_else(|| {
            debug!(key = %key, "Upload task ended without a result");
            Err(UploadError::TaskCancelled { key })
        })
    }

    /// Wipe the ledger and summary cache, e.g. on logout
    ///
    /// # Errors
    ///
    /// Returns an error if the ledger cannot be cleared
    pub async fn clear_upload_history(&self) -> Result<(), UploadError> {
        self.tracker.clear().await?;
        if let Some(cache) = &self.summary_cache {
            cache.clear().await?;
        }
        Ok(())
    }

    async fn run_pipeline(
        self,
        workout: WorkoutRecord,
        workout_id: String,
        options: UploadOptions,
    ) -> UploadResult {
        debug!(workout_id = %workout_id, force = options.force, state = "in_flight", "Upload attempt started");

        if !options.force {
            if let Some(record) = self.tracker.record(&workout_id).await {
                if record.uploaded {
                    debug!(workout_id = %workout_id, state = "already_uploaded", "Workout already uploaded");
                    return Ok(UploadOutcome {
                        workout_id,
                        status: UploadStatus::AlreadyUploaded,
                        has_heart_rate: record.has_heart_rate,
                    });
                }
            }
        }

        let duration = workout.duration_seconds();
        if duration.is_nan() || duration <= 0.0 {
            warn!(workout_id = %workout_id, duration, state = "rejected", "Workout has no positive duration");
            return Err(UploadError::invalid_data(
                workout_id,
                format!("duration must be positive, got {duration}s"),
            ));
        }

        debug!(workout_id = %workout_id, state = "collecting", "Collecting workout channels");
        let bundle = self.collector.collect(&workout).await;

        debug!(workout_id = %workout_id, state = "validating", "Validating collected data");
        let report = self.validator.validate(&bundle, duration);
        if !report.is_accepted() {
            warn!(
                workout_id = %workout_id,
                state = "rejected",
                summary = %report.diagnostic_summary(),
                "Insufficient data, skipping upload"
            );
            let reason = report
                .reason
                .unwrap_or_else(|| "insufficient data".to_owned());
            return Err(UploadError::invalid_data(workout_id, reason));
        }

        debug!(
            workout_id = %workout_id,
            state = "delaying",
            delay_secs = self.settling_delay.as_secs_f64(),
            "Waiting for health store to settle"
        );
        self.clock.sleep(self.settling_delay).await;

        let attribution = attribution::resolve(workout.device());
        let payload = WorkoutUploadPayload::assemble(
            &workout,
            &bundle,
            Some(attribution.source.clone()),
            attribution.device.clone(),
        );
        let counts = bundle.counts();

        debug!(workout_id = %workout_id, state = "uploading", "Submitting workout");
        if let Err(failure) = self.client.submit(&payload).await {
            error!(
                workout_id = %workout_id,
                state = "failed",
                category = %failure.category,
                status = failure.status,
                counts = %counts,
                source = %attribution.source,
                device = attribution.device.as_deref().unwrap_or("unknown"),
                activity_type = %workout.activity_type(),
                detail = failure.detail.as_deref().unwrap_or(""),
                "Workout upload failed"
            );
            return Err(UploadError::UploadTransport {
                workout_id,
                failure,
            });
        }

        let has_heart_rate = counts.has_heart_rate();
        let record = self
            .tracker
            .mark_uploaded(&workout_id, has_heart_rate)
            .await?;

        if let Some(cache) = &self.summary_cache {
            cache
                .put(&WorkoutSummary {
                    workout_id: workout_id.clone(),
                    counts,
                    source: Some(attribution.source),
                    uploaded_at: record.uploaded_at,
                })
                .await;
        }

        info!(
            workout_id = %workout_id,
            state = "uploaded",
            has_heart_rate,
            counts = %counts,
            "Workout uploaded"
        );
        Ok(UploadOutcome {
            workout_id,
            status: UploadStatus::Uploaded,
            has_heart_rate,
        })
    }
}
