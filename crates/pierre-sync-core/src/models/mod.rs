// ABOUTME: Data models for the workout upload pipeline
// ABOUTME: Workouts, channel series, collected bundles, ledger records, and upload payloads
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Data Models
//!
//! Workouts are owned by the device health store and are read-only here. Everything
//! derived from a workout (collected channels, payloads, ledger entries) is keyed by
//! the deterministic [`WorkoutRecord::id`].

/// Collected channel bundle and per-channel counts
pub mod bundle;
/// Channel kinds, samples, series, and lap splits
pub mod channel;
/// Ledger records, outcomes, batch summaries, and the wire payload
pub mod upload;
/// Workout record, activity type, and device metadata
pub mod workout;

pub use bundle::{ChannelCounts, RequiredDataBundle};
pub use channel::{ChannelKind, ChannelSample, ChannelSeries, LapSplit};
pub use upload::{
    BatchFailure, BatchUploadSummary, LapPayload, SeriesPoint, UploadOptions, UploadOutcome,
    UploadRecord, UploadStatus, WorkoutSummary, WorkoutUploadPayload, WorkoutsUpdated,
};
pub use workout::{ActivityType, DeviceMetadata, WorkoutBuilder, WorkoutRecord};
