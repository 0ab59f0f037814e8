// ABOUTME: Main library entry point for the Pierre workout sync pipeline
// ABOUTME: Exactly-once upload of device-recorded workouts with collection retries and validation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Pierre Workout Sync
//!
//! Uploads workouts recorded on a device health store to the Pierre backend, each one
//! exactly once, and only when the collected data is good enough to be useful.
//!
//! ## Architecture
//!
//! - **Registry**: single-flight execution keyed by string
//! - **Health**: per-channel collection with bounded forced-refresh retries
//! - **Validation**: count sufficiency plus optional heart rate quality checks
//! - **Tracker**: persisted idempotency ledger over a key-value store
//! - **Coordinator**: end-to-end upload of one workout
//! - **Batch**: sequential, paced, deduplicated upload of many workouts
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use pierre_workout_sync::config::SyncConfig;
//! use pierre_workout_sync::errors::AppResult;
//!
//! fn main() -> AppResult<()> {
//!     let config = SyncConfig::from_env()?;
//!     println!("Uploading to {}", config.transport.api_base_url);
//!     Ok(())
//! }
//! ```

pub use pierre_sync_core::{constants, errors, models};

/// Device and source attribution
pub mod attribution;

/// Batch upload orchestration
pub mod batch;

/// Remote upload client
pub mod client;

/// Injectable time source
pub mod clock;

/// Environment configuration
pub mod config;

/// Single-workout upload coordination
pub mod coordinator;

/// Health data collection
pub mod health;

/// Structured logging setup
pub mod logging;

/// Workout update notifications
pub mod notifications;

/// Single-flight task registry
pub mod registry;

/// Key-value persistence
pub mod store;

/// Per-workout upload summaries
pub mod summary_cache;

/// Upload idempotency ledger
pub mod tracker;

/// Data quality validation
pub mod validation;
