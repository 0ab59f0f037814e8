// ABOUTME: Upload ledger records, coordinator outcomes, and batch summaries
// ABOUTME: Wire payload for the remote workouts endpoint with epoch-second series entries
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::bundle::{ChannelCounts, RequiredDataBundle};
use super::channel::{ChannelSeries, LapSplit};
use super::workout::WorkoutRecord;

/// Persisted idempotency ledger entry for one workout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadRecord {
    /// Whether the remote service confirmed the upload
    pub uploaded: bool,
    /// Whether the uploaded payload carried usable heart rate data
    pub has_heart_rate: bool,
    /// When the upload was confirmed
    pub uploaded_at: DateTime<Utc>,
}

/// Per-workout summary kept alongside the ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkoutSummary {
    /// Deterministic workout id
    pub workout_id: String,
    /// Channel counts that were uploaded
    pub counts: ChannelCounts,
    /// Source label resolved at upload time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// When the upload was confirmed
    pub uploaded_at: DateTime<Utc>,
}

/// Options for a single workout upload
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UploadOptions {
    /// Bypass the already-uploaded gate
    pub force: bool,
}

impl UploadOptions {
    /// Options for a forced re-upload
    #[must_use]
    pub const fn forced() -> Self {
        Self { force: true }
    }
}

/// How a successful upload call was satisfied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadStatus {
    /// The workout was submitted and confirmed by this call
    Uploaded,
    /// The ledger already recorded the workout; nothing was fetched or sent
    AlreadyUploaded,
}

/// Successful result of a single workout upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadOutcome {
    /// Deterministic workout id
    pub workout_id: String,
    /// How the call was satisfied
    pub status: UploadStatus,
    /// Whether the server copy has heart rate data
    pub has_heart_rate: bool,
}

/// One failed workout in a batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchFailure {
    /// Deterministic workout id
    pub workout_id: String,
    /// Short user-facing reason
    pub reason: String,
}

/// Aggregate result of a batch upload
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchUploadSummary {
    /// Workouts in the batch
    pub total: usize,
    /// Workouts uploaded or already uploaded
    pub success: usize,
    /// Workouts that failed
    pub failed: usize,
    /// Detail for every failure, in batch order
    pub failures: Vec<BatchFailure>,
}

/// Aggregate event published once after a batch with at least one success
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutsUpdated {
    /// Whether the event came from a batch upload
    pub batch_upload: bool,
    /// Number of workouts uploaded successfully
    pub count: usize,
}

/// One series entry on the wire
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    /// Epoch seconds (millisecond precision)
    pub time: f64,
    /// Sample value
    pub value: f64,
}

/// One lap on the wire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LapPayload {
    /// Zero-based lap index
    pub index: u32,
    /// Epoch seconds
    pub start: i64,
    /// Epoch seconds
    pub end: i64,
    /// Seconds
    pub duration: f64,
    /// Metres
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
}

/// JSON body for `POST /workouts`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutUploadPayload {
    /// Deterministic workout id
    pub id: String,
    /// Display name
    pub name: String,
    /// Activity type label
    #[serde(rename = "type")]
    pub activity_type: String,
    /// Start (RFC 3339)
    pub start: DateTime<Utc>,
    /// End (RFC 3339)
    pub end: DateTime<Utc>,
    /// Duration in seconds
    pub duration: f64,
    /// Distance in metres
    pub distance: f64,
    /// Heart rate series
    pub heart_rates: Vec<SeriesPoint>,
    /// Speed series
    pub speeds: Vec<SeriesPoint>,
    /// Stride length series
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stride_lengths: Option<Vec<SeriesPoint>>,
    /// Cadence series
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cadences: Option<Vec<SeriesPoint>>,
    /// Ground contact time series
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ground_contact_times: Option<Vec<SeriesPoint>>,
    /// Vertical oscillation series
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vertical_oscillations: Option<Vec<SeriesPoint>>,
    /// Total calories
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_calories: Option<f64>,
    /// Lap splits
    #[serde(skip_serializing_if = "Option::is_none")]
    pub laps: Option<Vec<LapPayload>>,
    /// Canonical source label
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Canonical device label
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,
}

impl WorkoutUploadPayload {
    /// Assemble the payload from a workout, its collected channels, and resolved attribution
    #[must_use]
    pub fn assemble(
        workout: &WorkoutRecord,
        bundle: &RequiredDataBundle,
        source: Option<String>,
        device: Option<String>,
    ) -> Self {
        Self {
            id: workout.id(),
            name: workout.name(),
            activity_type: workout.activity_type().as_str().to_owned(),
            start: workout.start(),
            end: workout.end(),
            duration: workout.duration_seconds(),
            distance: workout.distance_meters().unwrap_or(0.0),
            heart_rates: to_points(&bundle.heart_rate),
            speeds: to_points(&bundle.speed),
            stride_lengths: non_empty_points(&bundle.stride_length),
            cadences: non_empty_points(&bundle.cadence),
            ground_contact_times: non_empty_points(&bundle.ground_contact_time),
            vertical_oscillations: non_empty_points(&bundle.vertical_oscillation),
            total_calories: bundle.calories.or_else(|| workout.total_energy_kcal()),
            laps: bundle
                .laps
                .as_ref()
                .filter(|laps| !laps.is_empty())
                .map(|laps| laps.iter().map(LapPayload::from).collect()),
            source,
            device,
        }
    }
}

impl From<&LapSplit> for LapPayload {
    fn from(lap: &LapSplit) -> Self {
        Self {
            index: lap.index,
            start: lap.start.timestamp(),
            end: lap.end.timestamp(),
            duration: lap.duration_seconds,
            distance: lap.distance_meters,
        }
    }
}

fn to_points(series: &ChannelSeries) -> Vec<SeriesPoint> {
    series
        .samples()
        .iter()
        .map(|sample| SeriesPoint {
            time: sample.timestamp.timestamp_millis() as f64 / 1000.0,
            value: sample.value,
        })
        .collect()
}

fn non_empty_points(series: &ChannelSeries) -> Option<Vec<SeriesPoint>> {
    if series.is_empty() {
        None
    } else {
        Some(to_points(series))
    }
}
