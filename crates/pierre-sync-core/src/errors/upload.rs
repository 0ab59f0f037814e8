// ABOUTME: Error taxonomy for the workout upload pipeline
// ABOUTME: Invalid data, transport failures, cancelled tasks, and absorbed channel fetch errors
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Upload Error Types
//!
//! - `UploadError` - terminal outcomes of a single workout upload attempt
//! - `HealthSourceError` - a single channel fetch failed; the collector absorbs it
//! - `TransportFailure` - why the remote submission failed, kept for diagnostics

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use super::AppError;

/// Broad classification of a failed remote submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureCategory {
    /// Server answered with a non-2xx status
    HttpStatus,
    /// Request did not complete within the transport timeout
    Timeout,
    /// Connection could not be established or was dropped
    Network,
    /// Payload could not be encoded
    Encoding,
}

impl FailureCategory {
    /// Stable label for logs and batch failure reasons
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::HttpStatus => "http_status",
            Self::Timeout => "timeout",
            Self::Network => "network",
            Self::Encoding => "encoding",
        }
    }
}

impl fmt::Display for FailureCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Details of a failed remote submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportFailure {
    /// What kind of failure occurred
    pub category: FailureCategory,
    /// HTTP status if the server answered
    pub status: Option<u16>,
    /// Response body or transport message, captured for diagnostics only
    pub detail: Option<String>,
}

impl TransportFailure {
    /// Non-2xx response from the upload endpoint
    #[must_use]
    pub fn http_status(status: u16, body: impl Into<String>) -> Self {
        Self {
            category: FailureCategory::HttpStatus,
            status: Some(status),
            detail: Some(body.into()),
        }
    }

    /// Failure without an HTTP response
    #[must_use]
    pub fn without_response(category: FailureCategory, detail: impl Into<String>) -> Self {
        Self {
            category,
            status: None,
            detail: Some(detail.into()),
        }
    }

    /// Short user-facing summary that never includes the raw body
    #[must_use]
    pub fn summary(&self) -> String {
        self.status.map_or_else(
            || format!("upload failed ({})", self.category),
            |status| format!("upload failed ({} {status})", self.category),
        )
    }
}

impl fmt::Display for TransportFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary())
    }
}

/// Terminal outcome of a failed single-workout upload attempt
///
/// Cloneable so one physical attempt can be handed to every concurrent waiter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UploadError {
    /// Structural defect or failed data validation; not retried internally
    #[error("invalid workout data for {workout_id}: {reason}")]
    InvalidWorkoutData {
        /// Deterministic workout id
        workout_id: String,
        /// Why the workout was rejected
        reason: String,
    },
    /// Remote submission failed; the ledger was left untouched
    #[error("upload of {workout_id} failed: {failure}")]
    UploadTransport {
        /// Deterministic workout id
        workout_id: String,
        /// Transport failure details
        failure: TransportFailure,
    },
    /// The in-flight task ended without producing a result
    #[error("upload task {key} was cancelled")]
    TaskCancelled {
        /// Single-flight key of the cancelled task
        key: String,
    },
    /// Persisted ledger could not be written
    #[error("upload ledger error: {message}")]
    Storage {
        /// Underlying storage failure
        message: String,
    },
}

impl UploadError {
    /// Create an invalid data error
    #[must_use]
    pub fn invalid_data(workout_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidWorkoutData {
            workout_id: workout_id.into(),
            reason: reason.into(),
        }
    }

    /// Whether a later attempt could succeed without the data changing
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::UploadTransport { .. } | Self::Storage { .. })
    }

    /// Whether this is a caller-side cancellation rather than a real failure
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::TaskCancelled { .. })
    }

    /// Short reason suitable for aggregate batch results
    #[must_use]
    pub fn user_reason(&self) -> String {
        match self {
            Self::InvalidWorkoutData { reason, .. } => format!("insufficient data: {reason}"),
            Self::UploadTransport { failure, .. } => failure.summary(),
            Self::TaskCancelled { .. } => "upload cancelled".to_owned(),
            Self::Storage { .. } => "could not record upload".to_owned(),
        }
    }
}

impl From<AppError> for UploadError {
    fn from(error: AppError) -> Self {
        Self::Storage {
            message: error.to_string(),
        }
    }
}

/// A single health channel could not be fetched
#[derive(Debug, Clone, Error)]
pub enum HealthSourceError {
    /// The health store denied access to the channel
    #[error("access to {channel} denied")]
    AccessDenied {
        /// Channel name
        channel: String,
    },
    /// The query failed, possibly transiently
    #[error("query for {channel} failed: {message}")]
    QueryFailed {
        /// Channel name
        channel: String,
        /// Failure message
        message: String,
    },
    /// The workout is unknown to the source
    #[error("workout {workout_id} not found in health source")]
    WorkoutNotFound {
        /// Deterministic workout id
        workout_id: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_summary_hides_body() {
        let failure = TransportFailure::http_status(500, "stack trace with secrets");
        assert_eq!(failure.summary(), "upload failed (http_status 500)");
        let error = UploadError::UploadTransport {
            workout_id: "w1".to_owned(),
            failure,
        };
        assert!(!error.user_reason().contains("secrets"));
        assert!(error.is_retryable());
    }

    #[test]
    fn test_invalid_data_is_terminal() {
        let error = UploadError::invalid_data("w1", "speed has 1 samples");
        assert!(!error.is_retryable());
        assert!(!error.is_cancelled());
        assert!(error.user_reason().starts_with("insufficient data"));
    }
}
