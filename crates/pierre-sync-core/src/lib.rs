// ABOUTME: Core types and constants for the Pierre workout upload pipeline
// ABOUTME: Foundation crate with error handling, upload thresholds, and workout data models
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Pierre Sync Core
//!
//! Foundation crate providing shared types and constants for the workout upload
//! pipeline. It has no async runtime dependency so the models and error types can
//! be shared by the pipeline, its adapters, and any client embedding them.
//!
//! ## Modules
//!
//! - **errors**: `AppError`/`ErrorCode` plus the upload pipeline error taxonomy
//! - **constants**: Thresholds, delays, and store namespaces for the pipeline
//! - **models**: Workouts, channel samples, data bundles, upload records and payloads

/// Unified error handling and upload pipeline errors
pub mod errors;

/// Pipeline constants organized by component
pub mod constants;

/// Core data models (`WorkoutRecord`, `ChannelSeries`, `RequiredDataBundle`, etc.)
pub mod models;
