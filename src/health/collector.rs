// ABOUTME: Health data collector fetching every channel for a workout
// ABOUTME: Required channels below the floor are re-fetched with forced refresh, keeping the best result
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;
use tracing::{debug, info, warn};

use super::retry::{keep_best, RetryPolicy};
use super::HealthDataSource;
use crate::clock::Clock;
use crate::models::{ChannelKind, ChannelSample, ChannelSeries, RequiredDataBundle, WorkoutRecord};

/// Collects every relevant channel for a workout into a [`RequiredDataBundle`]
///
/// Heart rate is always required; speed and cadence are required for running-related
/// workouts. Every other channel, calories, and laps are fetched once and never block
/// an upload. Individual fetch failures are logged and treated as empty channels.
#[derive(Clone)]
pub struct HealthDataCollector {
    source: Arc<dyn HealthDataSource>,
    clock: Arc<dyn Clock>,
    policy: RetryPolicy,
}

impl HealthDataCollector {
    /// Create a collector over a health source
    #[must_use]
    pub fn new(
        source: Arc<dyn HealthDataSource>,
        clock: Arc<dyn Clock>,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            source,
            clock,
            policy,
        }
    }

    /// Retry policy applied to insufficient required channels
    #[must_use]
    pub const fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Fetch every channel for `workout`
    ///
    /// Never fails: the returned bundle reflects whatever could be collected.
    pub async fn collect(&self, workout: &WorkoutRecord) -> RequiredDataBundle {
        let workout_id = workout.id();
        let running_related = workout.is_running_related();
        let mut bundle = RequiredDataBundle::new(workout_id.clone(), running_related);

        for kind in ChannelKind::ALL {
            let samples = self.fetch_once(kind, workout, &workout_id, false, 0).await;
            bundle.set_series(kind, ChannelSeries::new(samples));
        }

        bundle.calories = match self.source.fetch_calories(workout).await {
            Ok(calories) => calories,
            Err(e) => {
                warn!(workout_id = %workout_id, error = %e, "Calories fetch failed");
                None
            }
        };
        bundle.laps = match self.source.fetch_laps(workout).await {
            Ok(laps) => laps,
            Err(e) => {
                warn!(workout_id = %workout_id, error = %e, "Lap fetch failed");
                None
            }
        };

        for kind in ChannelKind::ALL
            .into_iter()
            .filter(|kind| kind.is_required(running_related))
        {
            let initial = bundle.series(kind).samples().to_vec();
            if self.policy.needs_retry(initial.len()) {
                let best = self
                    .retry_channel(kind, workout, &workout_id, initial)
                    .await;
                bundle.set_series(kind, ChannelSeries::new(best));
            }
        }

        debug!(
            workout_id = %workout_id,
            running_related,
            counts = %bundle.counts(),
            "Collected workout channels"
        );
        bundle
    }

    /// Re-fetch a required channel with forced refresh until it is complete or attempts run out
    async fn retry_channel(
        &self,
        kind: ChannelKind,
        workout: &WorkoutRecord,
        workout_id: &str,
        initial: Vec<ChannelSample>,
    ) -> Vec<ChannelSample> {
        let mut best = initial;
        info!(
            workout_id = %workout_id,
            channel = %kind,
            count = best.len(),
            max_attempts = self.policy.max_attempts,
            "Required channel insufficient, retrying with forced refresh"
        );

        for attempt in 1..=self.policy.max_attempts {
            self.clock.sleep(self.policy.interval).await;
            let fetched = self
                .fetch_once(kind, workout, workout_id, true, attempt)
                .await;
            debug!(
                workout_id = %workout_id,
                channel = %kind,
                attempt,
                fetched = fetched.len(),
                best = best.len(),
                "Forced refresh attempt finished"
            );
            best = keep_best(best, fetched);
            if self.policy.is_satisfied(best.len()) {
                info!(
                    workout_id = %workout_id,
                    channel = %kind,
                    attempt,
                    count = best.len(),
                    "Required channel complete after retry"
                );
                return best;
            }
        }

        if best.len() < self.policy.sufficiency_floor {
            warn!(
                workout_id = %workout_id,
                channel = %kind,
                count = best.len(),
                "Required channel still insufficient after all retries"
            );
        }
        best
    }

    async fn fetch_once(
        &self,
        kind: ChannelKind,
        workout: &WorkoutRecord,
        workout_id: &str,
        force_refresh: bool,
        attempt: u32,
    ) -> Vec<ChannelSample> {
        match self
            .source
            .fetch_channel(kind, workout, force_refresh, attempt)
            .await
        {
            Ok(samples) => samples,
            Err(e) => {
                let device = workout.device();
                warn!(
                    workout_id = %workout_id,
                    channel = %kind,
                    attempt,
                    force_refresh,
                    source_name = device.source_name.as_deref().unwrap_or("unknown"),
                    device_name = device.device_name.as_deref().unwrap_or("unknown"),
                    device_model = device.device_model.as_deref().unwrap_or("unknown"),
                    error = %e,
                    "Channel fetch failed, treating as empty"
                );
                Vec::new()
            }
        }
    }
}
