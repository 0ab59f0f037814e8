// ABOUTME: Data quality validator deciding whether collected channels are sufficient to upload
// ABOUTME: Count rule per activity class plus an optional strict heart rate quality mode
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Data Quality Validation
//!
//! Pure decision functions over a [`RequiredDataBundle`]. Nothing here performs I/O;
//! a rejected workout never reaches the network.
//!
//! Count rule: running-related workouts need at least two heart rate, speed, and
//! cadence samples; every other workout needs at least two heart rate samples.

/// Heart rate outlier filtering and coverage assessment
pub mod heart_rate;

pub use heart_rate::{HeartRateIssue, HeartRateQuality};

use serde::Serialize;

use crate::constants::collection::SUFFICIENCY_FLOOR;
use crate::models::{ChannelCounts, RequiredDataBundle};

/// Which rules the validator enforces
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationMode {
    /// Required channel counts only
    #[default]
    CountsOnly,
    /// Counts plus heart rate plausibility and coverage
    Strict,
}

/// Decision for one workout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationOutcome {
    /// Enough data to upload
    Sufficient,
    /// Upload must not be attempted
    InsufficientData,
}

/// Decision plus the evidence behind it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationReport {
    /// Final decision
    pub outcome: ValidationOutcome,
    /// Whether speed and cadence were required
    pub running_related: bool,
    /// Sample counts per channel
    pub counts: ChannelCounts,
    /// Why the workout was rejected
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Heart rate assessment, present in strict mode
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heart_rate_quality: Option<HeartRateQuality>,
}

impl ValidationReport {
    /// Whether the workout may be uploaded
    #[must_use]
    pub fn is_accepted(&self) -> bool {
        self.outcome == ValidationOutcome::Sufficient
    }

    /// One-line summary for logs
    #[must_use]
    pub fn diagnostic_summary(&self) -> String {
        let class = if self.running_related {
            "running"
        } else {
            "non-running"
        };
        let quality = self
            .heart_rate_quality
            .as_ref()
            .map(|q| {
                format!(
                    " hr_valid={:.0}% hr_coverage={}",
                    q.valid_ratio * 100.0,
                    q.coverage_ratio
                        .map_or_else(|| "n/a".to_owned(), |c| format!("{:.0}%", c * 100.0))
                )
            })
            .unwrap_or_default();
        match &self.reason {
            Some(reason) => format!("rejected ({class}) {}{quality}: {reason}", self.counts),
            None => format!("accepted ({class}) {}{quality}", self.counts),
        }
    }
}

/// Decides upload eligibility for collected workout data
#[derive(Debug, Clone, Copy, Default)]
pub struct DataQualityValidator {
    mode: ValidationMode,
}

impl DataQualityValidator {
    /// Create a validator enforcing `mode`
    #[must_use]
    pub const fn new(mode: ValidationMode) -> Self {
        Self { mode }
    }

    /// Validator that also enforces heart rate quality
    #[must_use]
    pub const fn strict() -> Self {
        Self::new(ValidationMode::Strict)
    }

    /// Active mode
    #[must_use]
    pub const fn mode(&self) -> ValidationMode {
        self.mode
    }

    /// Validate a bundle collected for a workout lasting `workout_duration_secs`
    #[must_use]
    pub fn validate(
        &self,
        bundle: &RequiredDataBundle,
        workout_duration_secs: f64,
    ) -> ValidationReport {
        let counts = bundle.counts();
        let running_related = bundle.running_related;

        let mut reason = counts
            .first_insufficient(running_related)
            .map(|kind| {
                format!(
                    "{kind} has {} samples (need {SUFFICIENCY_FLOOR})",
                    counts.get(kind)
                )
            });

        let heart_rate_quality = match self.mode {
            ValidationMode::CountsOnly => None,
            ValidationMode::Strict => {
                let quality = heart_rate::assess(&bundle.heart_rate, workout_duration_secs);
                if reason.is_none() {
                    reason = quality.issue().map(|issue| issue.to_string());
                }
                Some(quality)
            }
        };

        ValidationReport {
            outcome: if reason.is_none() {
                ValidationOutcome::Sufficient
            } else {
                ValidationOutcome::InsufficientData
            },
            running_related,
            counts,
            reason,
            heart_rate_quality,
        }
    }
}

/// Count rule alone, without building a report
#[must_use]
pub fn is_all_required_data_available(bundle: &RequiredDataBundle) -> bool {
    bundle.is_all_required_data_available()
}
