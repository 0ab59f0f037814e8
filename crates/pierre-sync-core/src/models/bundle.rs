// ABOUTME: Per-workout aggregate of every collected health channel
// ABOUTME: Channel counts and the side-effect free required-data availability rule
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde::{Deserialize, Serialize};
use std::fmt;

use super::channel::{ChannelKind, ChannelSeries, LapSplit};
use crate::constants::collection::SUFFICIENCY_FLOOR;

/// Sample counts per channel, used for validation and diagnostics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelCounts {
    /// Heart rate samples
    pub heart_rate: usize,
    /// Speed samples
    pub speed: usize,
    /// Cadence samples
    pub cadence: usize,
    /// Stride length samples
    pub stride_length: usize,
    /// Ground contact time samples
    pub ground_contact_time: usize,
    /// Vertical oscillation samples
    pub vertical_oscillation: usize,
}

impl ChannelCounts {
    /// Count for one channel
    #[must_use]
    pub const fn get(&self, kind: ChannelKind) -> usize {
        match kind {
            ChannelKind::HeartRate => self.heart_rate,
            ChannelKind::Speed => self.speed,
            ChannelKind::Cadence => self.cadence,
            ChannelKind::StrideLength => self.stride_length,
            ChannelKind::GroundContactTime => self.ground_contact_time,
            ChannelKind::VerticalOscillation => self.vertical_oscillation,
        }
    }

    /// Whether every required channel reaches the sufficiency floor
    #[must_use]
    pub fn meets_required(&self, running_related: bool) -> bool {
        self.first_insufficient(running_related).is_none()
    }

    /// First required channel below the sufficiency floor, if any
    #[must_use]
    pub fn first_insufficient(&self, running_related: bool) -> Option<ChannelKind> {
        ChannelKind::ALL
            .into_iter()
            .filter(|kind| kind.is_required(running_related))
            .find(|kind| self.get(*kind) < SUFFICIENCY_FLOOR)
    }

    /// Whether the heart rate channel counts as present on the server
    #[must_use]
    pub const fn has_heart_rate(&self) -> bool {
        self.heart_rate >= SUFFICIENCY_FLOOR
    }
}

impl fmt::Display for ChannelCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "hr={} speed={} cadence={} stride={} gct={} vo={}",
            self.heart_rate,
            self.speed,
            self.cadence,
            self.stride_length,
            self.ground_contact_time,
            self.vertical_oscillation
        )
    }
}

/// Every channel collected for one workout
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequiredDataBundle {
    /// Deterministic workout id
    pub workout_id: String,
    /// Whether speed and cadence are required
    pub running_related: bool,
    /// Heart rate series
    pub heart_rate: ChannelSeries,
    /// Speed series
    pub speed: ChannelSeries,
    /// Cadence series
    pub cadence: ChannelSeries,
    /// Stride length series
    pub stride_length: ChannelSeries,
    /// Ground contact time series
    pub ground_contact_time: ChannelSeries,
    /// Vertical oscillation series
    pub vertical_oscillation: ChannelSeries,
    /// Total calories, if the health store reported them
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calories: Option<f64>,
    /// Lap splits, if the health store reported them
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub laps: Option<Vec<LapSplit>>,
}

impl RequiredDataBundle {
    /// Empty bundle for a workout
    #[must_use]
    pub fn new(workout_id: impl Into<String>, running_related: bool) -> Self {
        Self {
            workout_id: workout_id.into(),
            running_related,
            ..Self::default()
        }
    }

    /// Series for one channel
    #[must_use]
    pub const fn series(&self, kind: ChannelKind) -> &ChannelSeries {
        match kind {
            ChannelKind::HeartRate => &self.heart_rate,
            ChannelKind::Speed => &self.speed,
            ChannelKind::Cadence => &self.cadence,
            ChannelKind::StrideLength => &self.stride_length,
            ChannelKind::GroundContactTime => &self.ground_contact_time,
            ChannelKind::VerticalOscillation => &self.vertical_oscillation,
        }
    }

    /// Replace the series for one channel
    pub fn set_series(&mut self, kind: ChannelKind, series: ChannelSeries) {
        let slot = match kind {
            ChannelKind::HeartRate => &mut self.heart_rate,
            ChannelKind::Speed => &mut self.speed,
            ChannelKind::Cadence => &mut self.cadence,
            ChannelKind::StrideLength => &mut self.stride_length,
            ChannelKind::GroundContactTime => &mut self.ground_contact_time,
            ChannelKind::VerticalOscillation => &mut self.vertical_oscillation,
        };
        *slot = series;
    }

    /// Sample counts per channel
    #[must_use]
    pub fn counts(&self) -> ChannelCounts {
        ChannelCounts {
            heart_rate: self.heart_rate.len(),
            speed: self.speed.len(),
            cadence: self.cadence.len(),
            stride_length: self.stride_length.len(),
            ground_contact_time: self.ground_contact_time.len(),
            vertical_oscillation: self.vertical_oscillation.len(),
        }
    }

    /// Whether every required channel has enough samples to upload
    #[must_use]
    pub fn is_all_required_data_available(&self) -> bool {
        self.counts().meets_required(self.running_related)
    }
}
