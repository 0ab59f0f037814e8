// ABOUTME: Injectable clock for wall-clock time and cooperative sleeps
// ABOUTME: Retry waits, settling delays, and batch pacing go through this seam
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::{DateTime, Utc};
use std::time::Duration;

/// Source of time and suspension points for the upload pipeline
///
/// Every wait in the pipeline yields through `sleep` so that tests can substitute
/// a clock that returns immediately and records what was requested.
#[async_trait::async_trait]
pub trait Clock: Send + Sync {
    /// Current wall-clock time
    fn now(&self) -> DateTime<Utc>;

    /// Suspend the current task for `duration` without blocking a thread
    async fn sleep(&self, duration: Duration);
}

/// Clock backed by `chrono::Utc` and `tokio::time::sleep`
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

#[async_trait::async_trait]
impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    async fn sleep(&self, duration: Duration) {
        if !duration.is_zero() {
            tokio::time::sleep(duration).await;
        }
    }
}
