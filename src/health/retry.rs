// ABOUTME: Retry policy for required channels that came back below the sufficiency floor
// ABOUTME: Bounded attempts at a fixed interval with a keep-best sample reducer
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::constants::collection::{
    RETRY_INTERVAL_SECS, RETRY_MAX_ATTEMPTS, RETRY_SUCCESS_THRESHOLD, SUFFICIENCY_FLOOR,
};
use std::time::Duration;

/// Forced-refresh retry behavior for insufficient required channels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum forced-refresh attempts
    pub max_attempts: u32,
    /// Wait before each attempt
    pub interval: Duration,
    /// Below this many samples a required channel is retried
    pub sufficiency_floor: usize,
    /// At or above this many samples retrying stops early
    pub success_threshold: usize,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: RETRY_MAX_ATTEMPTS,
            interval: Duration::from_secs(RETRY_INTERVAL_SECS),
            sufficiency_floor: SUFFICIENCY_FLOOR,
            success_threshold: RETRY_SUCCESS_THRESHOLD,
        }
    }
}

impl RetryPolicy {
    /// Create a policy with explicit values
    #[must_use]
    pub const fn new(
        max_attempts: u32,
        interval: Duration,
        sufficiency_floor: usize,
        success_threshold: usize,
    ) -> Self {
        Self {
            max_attempts,
            interval,
            sufficiency_floor,
            success_threshold,
        }
    }

    /// Policy that never retries
    #[must_use]
    pub const fn disabled() -> Self {
        Self::new(0, Duration::ZERO, SUFFICIENCY_FLOOR, RETRY_SUCCESS_THRESHOLD)
    }

    /// Whether a channel with `count` samples should be retried at all
    #[must_use]
    pub const fn needs_retry(&self, count: usize) -> bool {
        self.max_attempts > 0 && count < self.sufficiency_floor
    }

    /// Whether a channel with `count` samples is complete enough to stop retrying
    #[must_use]
    pub const fn is_satisfied(&self, count: usize) -> bool {
        count >= self.success_threshold
    }

    /// Upper bound on the extra latency this policy can add per channel
    #[must_use]
    pub fn max_added_latency(&self) -> Duration {
        self.interval.saturating_mul(self.max_attempts)
    }
}

/// Keep whichever sample set is larger; ties keep the current one
///
/// A later, smaller result never overwrites a larger earlier one.
#[must_use]
pub fn keep_best<T>(current: Vec<T>, candidate: Vec<T>) -> Vec<T> {
    if candidate.len() > current.len() {
        candidate
    } else {
        current
    }
}
