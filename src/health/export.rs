// ABOUTME: Health data source backed by an exported JSON file of workouts and channels
// ABOUTME: Lets the CLI run the upload pipeline without a device health store
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use super::HealthDataSource;
use crate::errors::{AppError, AppResult, HealthSourceError};
use crate::models::{ChannelKind, ChannelSample, LapSplit, WorkoutRecord};

/// One workout with its recorded channels, as written by a health store export
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportedWorkout {
    /// Workout metadata
    pub workout: WorkoutRecord,
    /// Samples keyed by channel
    #[serde(default)]
    pub channels: HashMap<ChannelKind, Vec<ChannelSample>>,
    /// Lap splits, if recorded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub laps: Option<Vec<LapSplit>>,
    /// Total calories, if recorded separately from the workout
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calories: Option<f64>,
}

/// Top-level export file layout
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HealthExport {
    /// Exported workouts
    pub workouts: Vec<ExportedWorkout>,
}

/// Read-only health source over a [`HealthExport`]
#[derive(Debug, Clone)]
pub struct JsonExportSource {
    workouts: Vec<WorkoutRecord>,
    entries: HashMap<String, ExportedWorkout>,
}

impl JsonExportSource {
    /// Build a source from an in-memory export
    #[must_use]
    pub fn from_export(export: HealthExport) -> Self {
        let workouts = export
            .workouts
            .iter()
            .map(|entry| entry.workout.clone())
            .collect();
        let entries = export
            .workouts
            .into_iter()
            .map(|entry| (entry.workout.id(), entry))
            .collect();
        Self { workouts, entries }
    }

    /// Load an export file from disk
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed
    pub async fn load(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
            AppError::invalid_input(format!("cannot read export {}", path.display()))
                .with_source(e)
        })?;
        let export: HealthExport = serde_json::from_str(&raw)?;
        Ok(Self::from_export(export))
    }

    /// Workouts in export order
    #[must_use]
    pub fn workouts(&self) -> &[WorkoutRecord] {
        &self.workouts
    }

    fn entry(&self, workout: &WorkoutRecord) -> Result<&ExportedWorkout, HealthSourceError> {
        let workout_id = workout.id();
        self.entries
            .get(&workout_id)
            .ok_or(HealthSourceError::WorkoutNotFound { workout_id })
    }
}

#[async_trait::async_trait]
impl HealthDataSource for JsonExportSource {
    async fn fetch_channel(
        &self,
        kind: ChannelKind,
        workout: &WorkoutRecord,
        _force_refresh: bool,
        _attempt: u32,
    ) -> Result<Vec<ChannelSample>, HealthSourceError> {
        let entry = self.entry(workout)?;
        let start = workout.start();
        let end = workout.end();
        Ok(entry
            .channels
            .get(&kind)
            .map(|samples| {
                samples
                    .iter()
                    .filter(|sample| sample.timestamp >= start && sample.timestamp <= end)
                    .copied()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn fetch_laps(
        &self,
        workout: &WorkoutRecord,
    ) -> Result<Option<Vec<LapSplit>>, HealthSourceError> {
        Ok(self.entry(workout)?.laps.clone())
    }

    async fn fetch_calories(
        &self,
        workout: &WorkoutRecord,
    ) -> Result<Option<f64>, HealthSourceError> {
        Ok(self
            .entry(workout)?
            .calories
            .or_else(|| workout.total_energy_kcal()))
    }
}
