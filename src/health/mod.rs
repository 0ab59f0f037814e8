// ABOUTME: Health data source abstraction and channel collection for workout uploads
// ABOUTME: Source trait, keep-best retry policy, collector, and JSON export source
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Collects every channel for a workout with bounded retry for required channels
pub mod collector;
/// Health source backed by an exported JSON file
pub mod export;
/// Retry policy value with keep-best reduction
pub mod retry;

pub use collector::HealthDataCollector;
pub use export::JsonExportSource;
pub use retry::RetryPolicy;

use crate::errors::HealthSourceError;
use crate::models::{ChannelKind, ChannelSample, LapSplit, WorkoutRecord};

/// Device health store queried for workout channels
///
/// Implementations may fail transiently; the collector absorbs every failure.
#[async_trait::async_trait]
pub trait HealthDataSource: Send + Sync {
    /// Fetch samples for one channel within the workout's time window
    ///
    /// `force_refresh` asks the source to bypass any cache; `attempt` is 0 for the
    /// initial fetch and 1-based for forced retries.
    ///
    /// # Errors
    ///
    /// Returns an error if the channel cannot be queried
    async fn fetch_channel(
        &self,
        kind: ChannelKind,
        workout: &WorkoutRecord,
        force_refresh: bool,
        attempt: u32,
    ) -> Result<Vec<ChannelSample>, HealthSourceError>;

    /// Fetch lap splits, `None` when the device recorded none
    ///
    /// # Errors
    ///
    /// Returns an error if laps cannot be queried
    async fn fetch_laps(
        &self,
        workout: &WorkoutRecord,
    ) -> Result<Option<Vec<LapSplit>>, HealthSourceError>;

    /// Fetch total calories; defaults to the energy recorded on the workout
    ///
    /// # Errors
    ///
    /// Returns an error if calories cannot be queried
    async fn fetch_calories(
        &self,
        workout: &WorkoutRecord,
    ) -> Result<Option<f64>, HealthSourceError> {
        Ok(workout.total_energy_kcal())
    }
}
