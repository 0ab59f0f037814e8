// ABOUTME: Upload pipeline constants for channel sufficiency, retry pacing, and store keys
// ABOUTME: Defaults consumed by the collector, validator, coordinator, and batch orchestrator
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Channel collection thresholds and retry pacing
pub mod collection {
    /// Minimum samples a required channel needs for the workout to be uploadable
    pub const SUFFICIENCY_FLOOR: usize = 2;

    /// Sample count at which a retried channel is considered complete
    pub const RETRY_SUCCESS_THRESHOLD: usize = 5;

    /// Maximum forced-refresh attempts per insufficient required channel
    pub const RETRY_MAX_ATTEMPTS: u32 = 5;

    /// Wait between forced-refresh attempts in seconds
    pub const RETRY_INTERVAL_SECS: u64 = 30;
}

/// Heart rate quality validation bounds
pub mod heart_rate {
    /// Lowest physiologically plausible heart rate (bpm)
    pub const MIN_PLAUSIBLE_BPM: f64 = 30.0;

    /// Highest physiologically plausible heart rate (bpm)
    pub const MAX_PLAUSIBLE_BPM: f64 = 250.0;

    /// Interquartile range multiplier for outlier fences
    pub const IQR_FENCE_MULTIPLIER: f64 = 1.5;

    /// Fraction of raw samples that must survive filtering and range checks
    pub const MIN_VALID_RATIO: f64 = 0.70;

    /// Fraction of the workout duration the heart rate samples must span
    pub const MIN_COVERAGE_RATIO: f64 = 0.30;

    /// Coverage is only enforced for workouts longer than this (seconds)
    pub const COVERAGE_MIN_DURATION_SECS: f64 = 300.0;
}

/// Coordinator and batch timing
pub mod upload {
    /// Settling delay before submission so the health store finishes reconciling (seconds)
    pub const SETTLING_DELAY_SECS: u64 = 20;

    /// Pacing between sequential uploads in a batch (milliseconds)
    pub const BATCH_PACING_MS: u64 = 500;

    /// Delay before the aggregate batch notification is published (milliseconds)
    pub const BATCH_NOTIFY_DELAY_MS: u64 = 1_000;

    /// Single-flight key prefix for per-workout uploads
    pub const WORKOUT_KEY_PREFIX: &str = "upload_workout_";

    /// Single-flight key prefix for batch uploads
    pub const BATCH_KEY_PREFIX: &str = "upload_batch_";
}

/// Persisted store namespaces
pub mod store {
    /// Namespace for the idempotency ledger
    pub const TRACKER_PREFIX: &str = "upload_tracker:";

    /// Namespace for per-workout summaries
    pub const SUMMARY_PREFIX: &str = "workout_summary:";

    /// Default file name for the JSON-backed store
    pub const DEFAULT_STORE_FILE: &str = "pierre-sync-store.json";
}

/// HTTP transport defaults for the upload client
pub mod transport {
    /// Default API base URL
    pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8081/api";

    /// Upload endpoint path, appended to the base URL
    pub const WORKOUTS_PATH: &str = "/workouts";

    /// Request timeout in seconds
    pub const HTTP_TIMEOUT_SECS: u64 = 30;

    /// Connect timeout in seconds
    pub const HTTP_CONNECT_TIMEOUT_SECS: u64 = 10;

    /// Maximum response body length kept for diagnostics
    pub const MAX_DIAGNOSTIC_BODY_LEN: usize = 512;
}

/// Service names used in structured logging
pub mod service_names {
    /// Default service name
    pub const PIERRE_WORKOUT_SYNC: &str = "pierre-workout-sync";
}
