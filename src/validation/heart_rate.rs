// ABOUTME: Heart rate quality assessment with IQR outlier filtering and coverage checks
// ABOUTME: Physiological plausibility ratio and first-to-last sample span against workout duration
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde::Serialize;
use std::fmt;

use crate::constants::heart_rate::{
    COVERAGE_MIN_DURATION_SECS, IQR_FENCE_MULTIPLIER, MAX_PLAUSIBLE_BPM, MIN_COVERAGE_RATIO,
    MIN_PLAUSIBLE_BPM, MIN_VALID_RATIO,
};
use crate::models::ChannelSeries;

/// Why a heart rate series failed the quality check
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "issue")]
pub enum HeartRateIssue {
    /// Too few samples survived outlier filtering inside the plausible range
    TooFewValidSamples {
        /// Fraction of raw samples that were valid
        valid_ratio: f64,
    },
    /// Samples do not span enough of the workout
    InsufficientCoverage {
        /// Fraction of the workout duration covered
        coverage_ratio: f64,
    },
}

impl fmt::Display for HeartRateIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooFewValidSamples { valid_ratio } => write!(
                f,
                "only {:.0}% of heart rate samples are plausible (need {:.0}%)",
                valid_ratio * 100.0,
                MIN_VALID_RATIO * 100.0
            ),
            Self::InsufficientCoverage { coverage_ratio } => write!(
                f,
                "heart rate covers {:.0}% of the workout (need {:.0}%)",
                coverage_ratio * 100.0,
                MIN_COVERAGE_RATIO * 100.0
            ),
        }
    }
}

/// Result of assessing one heart rate series
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeartRateQuality {
    /// Samples before filtering
    pub raw_count: usize,
    /// Samples inside the IQR fences and the plausible range
    pub valid_count: usize,
    /// `valid_count / raw_count`
    pub valid_ratio: f64,
    /// Lower and upper IQR fences, when the series has samples
    pub fences: Option<(f64, f64)>,
    /// Span covered divided by workout duration, when coverage applies
    pub coverage_ratio: Option<f64>,
}

impl HeartRateQuality {
    /// First failed rule, if any
    #[must_use]
    pub fn issue(&self) -> Option<HeartRateIssue> {
        if self.valid_ratio < MIN_VALID_RATIO {
            return Some(HeartRateIssue::TooFewValidSamples {
                valid_ratio: self.valid_ratio,
            });
        }
        match self.coverage_ratio {
            Some(coverage_ratio) if coverage_ratio < MIN_COVERAGE_RATIO => {
                Some(HeartRateIssue::InsufficientCoverage { coverage_ratio })
            }
            _ => None,
        }
    }

    /// Whether the series passes every rule
    #[must_use]
    pub fn is_acceptable(&self) -> bool {
        self.issue().is_none()
    }
}

/// Assess a heart rate series against a workout of `workout_duration_secs`
#[must_use]
pub fn assess(series: &ChannelSeries, workout_duration_secs: f64) -> HeartRateQuality {
    let values = series.values();
    let raw_count = values.len();

    let mut sorted = values.clone();
    sorted.sort_by(f64::total_cmp);
    let fences = quartiles(&sorted).map(|(q1, q3)| {
        let iqr = q3 - q1;
        (
            IQR_FENCE_MULTIPLIER.mul_add(-iqr, q1),
            IQR_FENCE_MULTIPLIER.mul_add(iqr, q3),
        )
    });

    let valid_count = fences.map_or(0, |(lower, upper)| {
        values
            .iter()
            .filter(|bpm| (lower..=upper).contains(*bpm))
            .filter(|bpm| (MIN_PLAUSIBLE_BPM..=MAX_PLAUSIBLE_BPM).contains(*bpm))
            .count()
    });
    let valid_ratio = if raw_count == 0 {
        0.0
    } else {
        valid_count as f64 / raw_count as f64
    };

    let coverage_ratio = (workout_duration_secs > COVERAGE_MIN_DURATION_SECS)
        .then(|| series.span_seconds() / workout_duration_secs);

    HeartRateQuality {
        raw_count,
        valid_count,
        valid_ratio,
        fences,
        coverage_ratio,
    }
}

/// First and third quartiles of an ascending slice, linearly interpolated
#[must_use]
pub fn quartiles(sorted: &[f64]) -> Option<(f64, f64)> {
    Some((percentile(sorted, 0.25)?, percentile(sorted, 0.75)?))
}

fn percentile(sorted: &[f64], fraction: f64) -> Option<f64> {
    let last = sorted.len().checked_sub(1)?;
    let position = fraction * last as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let weight = position - lower as f64;
    Some((sorted[upper] - sorted[lower]).mul_add(weight, sorted[lower]))
}
