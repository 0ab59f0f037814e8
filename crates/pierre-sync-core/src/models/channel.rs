// ABOUTME: Health signal channel models: channel kinds, timestamped samples, and ordered series
// ABOUTME: Lap splits reported alongside workouts by the health store
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A named time-series health signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelKind {
    /// Heart rate (bpm)
    HeartRate,
    /// Running or walking speed (m/s)
    Speed,
    /// Step cadence (steps/min)
    Cadence,
    /// Stride length (m)
    StrideLength,
    /// Ground contact time (ms)
    GroundContactTime,
    /// Vertical oscillation (m)
    VerticalOscillation,
}

impl ChannelKind {
    /// Every channel the collector fetches, in fetch order
    pub const ALL: [Self; 6] = [
        Self::HeartRate,
        Self::Speed,
        Self::Cadence,
        Self::StrideLength,
        Self::GroundContactTime,
        Self::VerticalOscillation,
    ];

    /// Stable channel label for logs and store keys
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::HeartRate => "heart_rate",
            Self::Speed => "speed",
            Self::Cadence => "cadence",
            Self::StrideLength => "stride_length",
            Self::GroundContactTime => "ground_contact_time",
            Self::VerticalOscillation => "vertical_oscillation",
        }
    }

    /// Unit of the sample values
    #[must_use]
    pub const fn unit(&self) -> &'static str {
        match self {
            Self::HeartRate => "bpm",
            Self::Speed => "m/s",
            Self::Cadence => "steps/min",
            Self::StrideLength | Self::VerticalOscillation => "m",
            Self::GroundContactTime => "ms",
        }
    }

    /// Whether a workout cannot be uploaded without this channel
    ///
    /// Heart rate is always required; speed and cadence only for running-related workouts.
    #[must_use]
    pub const fn is_required(&self, running_related: bool) -> bool {
        match self {
            Self::HeartRate => true,
            Self::Speed | Self::Cadence => running_related,
            Self::StrideLength | Self::GroundContactTime | Self::VerticalOscillation => false,
        }
    }
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single timestamped measurement
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChannelSample {
    /// When the measurement was taken
    pub timestamp: DateTime<Utc>,
    /// Measured value in the channel's unit
    pub value: f64,
}

impl ChannelSample {
    /// Create a sample
    #[must_use]
    pub fn new(timestamp: DateTime<Utc>, value: f64) -> Self {
        Self { timestamp, value }
    }
}

/// Samples for one channel, ordered ascending by timestamp
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<ChannelSample>", into = "Vec<ChannelSample>")]
pub struct ChannelSeries {
    samples: Vec<ChannelSample>,
}

impl ChannelSeries {
    /// Build a series, sorting samples by timestamp
    #[must_use]
    pub fn new(mut samples: Vec<ChannelSample>) -> Self {
        samples.sort_by_key(|sample| sample.timestamp);
        Self { samples }
    }

    /// An empty series
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            samples: Vec::new(),
        }
    }

    /// Number of samples
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the series has no samples
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Ordered samples
    #[must_use]
    pub fn samples(&self) -> &[ChannelSample] {
        &self.samples
    }

    /// Raw values in timestamp order
    #[must_use]
    pub fn values(&self) -> Vec<f64> {
        self.samples.iter().map(|sample| sample.value).collect()
    }

    /// Seconds between the first and last sample, zero for fewer than two samples
    #[must_use]
    pub fn span_seconds(&self) -> f64 {
        match (self.samples.first(), self.samples.last()) {
            (Some(first), Some(last)) => {
                (last.timestamp - first.timestamp).num_milliseconds() as f64 / 1000.0
            }
            _ => 0.0,
        }
    }
}

impl From<Vec<ChannelSample>> for ChannelSeries {
    fn from(samples: Vec<ChannelSample>) -> Self {
        Self::new(samples)
    }
}

impl From<ChannelSeries> for Vec<ChannelSample> {
    fn from(series: ChannelSeries) -> Self {
        series.samples
    }
}

/// A lap or split recorded by the device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LapSplit {
    /// Zero-based lap index
    pub index: u32,
    /// Lap start time
    pub start: DateTime<Utc>,
    /// Lap end time
    pub end: DateTime<Utc>,
    /// Lap duration in seconds
    pub duration_seconds: f64,
    /// Lap distance in metres
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_meters: Option<f64>,
}
