// ABOUTME: Workout record model with deterministic identity and device metadata
// ABOUTME: Activity type classification for running-related channel requirements
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Number of hex characters kept from the identity digest
const WORKOUT_ID_HEX_LEN: usize = 32;

/// Activity type as reported by the health store
///
/// Unknown types are preserved verbatim in `Other` so they still hash to a stable id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ActivityType {
    /// Outdoor or treadmill running
    Running,
    /// Track and field events
    TrackAndField,
    /// Hiking
    Hiking,
    /// Walking
    Walking,
    /// Cycling
    Cycling,
    /// Swimming
    Swimming,
    /// Yoga
    Yoga,
    /// Weight or strength training
    StrengthTraining,
    /// High intensity interval training
    Hiit,
    /// Rowing
    Rowing,
    /// Elliptical trainer
    Elliptical,
    /// Any other activity type, stored normalized
    Other(String),
}

impl ActivityType {
    /// Canonical label used in payloads and workout ids
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Running => "running",
            Self::TrackAndField => "track_and_field",
            Self::Hiking => "hiking",
            Self::Walking => "walking",
            Self::Cycling => "cycling",
            Self::Swimming => "swimming",
            Self::Yoga => "yoga",
            Self::StrengthTraining => "strength_training",
            Self::Hiit => "hiit",
            Self::Rowing => "rowing",
            Self::Elliptical => "elliptical",
            Self::Other(name) => name,
        }
    }

    /// Whether speed and cadence are required channels for this activity
    #[must_use]
    pub const fn is_running_related(&self) -> bool {
        matches!(
            self,
            Self::Running | Self::TrackAndField | Self::Hiking | Self::Walking
        )
    }

    /// Parse a health store activity label, tolerating case and separators
    #[must_use]
    pub fn parse(label: &str) -> Self {
        let normalized = label.trim().to_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "running" | "run" => Self::Running,
            "track_and_field" | "trackandfield" => Self::TrackAndField,
            "hiking" | "hike" => Self::Hiking,
            "walking" | "walk" => Self::Walking,
            "cycling" | "ride" | "biking" => Self::Cycling,
            "swimming" | "swim" => Self::Swimming,
            "yoga" => Self::Yoga,
            "strength_training" | "traditional_strength_training" => Self::StrengthTraining,
            "hiit" | "high_intensity_interval_training" => Self::Hiit,
            "rowing" => Self::Rowing,
            "elliptical" => Self::Elliptical,
            _ => Self::Other(normalized),
        }
    }
}

impl From<String> for ActivityType {
    fn from(label: String) -> Self {
        Self::parse(&label)
    }
}

impl From<ActivityType> for String {
    fn from(activity_type: ActivityType) -> Self {
        activity_type.as_str().to_owned()
    }
}

impl fmt::Display for ActivityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Source and device metadata attached to a workout by the health store
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceMetadata {
    /// Name of the app or device that wrote the workout
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_name: Option<String>,
    /// Bundle identifier of the writing app
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_bundle_id: Option<String>,
    /// Device display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_name: Option<String>,
    /// Device manufacturer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_manufacturer: Option<String>,
    /// Device model
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_model: Option<String>,
}

impl DeviceMetadata {
    /// All populated fields, in matching order
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        [
            &self.source_name,
            &self.source_bundle_id,
            &self.device_name,
            &self.device_manufacturer,
            &self.device_model,
        ]
        .into_iter()
        .filter_map(|field| field.as_deref())
    }
}

/// A completed workout read from the health store
///
/// Immutable once built. Use [`WorkoutBuilder`] to construct one.
///
/// # Examples
///
/// ```rust
/// use chrono::{Duration, TimeZone, Utc};
/// use pierre_sync_core::models::{ActivityType, WorkoutBuilder};
///
/// let start = Utc.with_ymd_and_hms(2025, 3, 1, 7, 0, 0).unwrap();
/// let workout = WorkoutBuilder::new(ActivityType::Running, start, start + Duration::minutes(30))
///     .distance_meters(5_000.0)
///     .build();
///
/// let again = WorkoutBuilder::new(ActivityType::Running, start, start + Duration::minutes(31))
///     .distance_meters(5_000.2)
///     .build();
/// assert_eq!(workout.id(), again.id());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutRecord {
    activity_type: ActivityType,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    duration_seconds: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    distance_meters: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    total_energy_kcal: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default)]
    device: DeviceMetadata,
}

impl WorkoutRecord {
    /// Deterministic id derived from activity type, start time, and distance
    ///
    /// Distance is rounded to whole metres so re-reads with float jitter match.
    #[must_use]
    pub fn id(&self) -> String {
        let distance = self.distance_meters.map_or(0, |d| d.round() as i64);
        let identity = format!(
            "{}_{}_{}",
            self.activity_type.as_str(),
            self.start.timestamp(),
            distance
        );
        let digest = Sha256::digest(identity.as_bytes());
        let mut id = hex::encode(digest);
        id.truncate(WORKOUT_ID_HEX_LEN);
        id
    }

    /// Activity type
    #[must_use]
    pub const fn activity_type(&self) -> &ActivityType {
        &self.activity_type
    }

    /// Start time (UTC)
    #[must_use]
    pub const fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// End time (UTC)
    #[must_use]
    pub const fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Recorded duration in seconds
    #[must_use]
    pub fn duration_seconds(&self) -> f64 {
        self.duration_seconds
    }

    /// Distance in metres, if recorded
    #[must_use]
    pub fn distance_meters(&self) -> Option<f64> {
        self.distance_meters
    }

    /// Total active energy in kilocalories, if recorded
    #[must_use]
    pub fn total_energy_kcal(&self) -> Option<f64> {
        self.total_energy_kcal
    }

    /// Display name, defaulting to a title derived from the activity type
    #[must_use]
    pub fn name(&self) -> String {
        self.name.clone().unwrap_or_else(|| {
            let label = self.activity_type.as_str().replace('_', " ");
            let mut chars = label.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars).collect()
            })
        })
    }

    /// Source and device metadata
    #[must_use]
    pub const fn device(&self) -> &DeviceMetadata {
        &self.device
    }

    /// Whether speed and cadence are required for this workout
    #[must_use]
    pub const fn is_running_related(&self) -> bool {
        self.activity_type.is_running_related()
    }
}

/// Builder for [`WorkoutRecord`]
#[derive(Debug, Clone)]
pub struct WorkoutBuilder {
    record: WorkoutRecord,
}

impl WorkoutBuilder {
    /// Start a workout; duration defaults to `end - start`
    #[must_use]
    pub fn new(activity_type: ActivityType, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        let duration_seconds = (end - start).num_milliseconds() as f64 / 1000.0;
        Self {
            record: WorkoutRecord {
                activity_type,
                start,
                end,
                duration_seconds,
                distance_meters: None,
                total_energy_kcal: None,
                name: None,
                device: DeviceMetadata::default(),
            },
        }
    }

    /// Override the recorded duration
    #[must_use]
    pub fn duration_seconds(mut self, seconds: f64) -> Self {
        self.record.duration_seconds = seconds;
        self
    }

    /// Set distance in metres
    #[must_use]
    pub fn distance_meters(mut self, meters: f64) -> Self {
        self.record.distance_meters = Some(meters);
        self
    }

    /// Set total active energy
    #[must_use]
    pub fn total_energy_kcal(mut self, kcal: f64) -> Self {
        self.record.total_energy_kcal = Some(kcal);
        self
    }

    /// Set display name
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.record.name = Some(name.into());
        self
    }

    /// Set source and device metadata
    #[must_use]
    pub fn device(mut self, device: DeviceMetadata) -> Self {
        self.record.device = device;
        self
    }

    /// Finish building
    #[must_use]
    pub fn build(self) -> WorkoutRecord {
        self.record
    }
}
