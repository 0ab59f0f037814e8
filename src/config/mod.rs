// ABOUTME: Environment-driven configuration for the workout upload pipeline
// ABOUTME: Transport endpoint and timeouts, retry pacing, batch timing, validation mode, store path
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::constants::collection::{
    RETRY_INTERVAL_SECS, RETRY_MAX_ATTEMPTS, RETRY_SUCCESS_THRESHOLD, SUFFICIENCY_FLOOR,
};
use crate::constants::store::DEFAULT_STORE_FILE;
use crate::constants::transport::{
    DEFAULT_API_BASE_URL, HTTP_CONNECT_TIMEOUT_SECS, HTTP_TIMEOUT_SECS,
};
use crate::constants::upload::{BATCH_NOTIFY_DELAY_MS, BATCH_PACING_MS, SETTLING_DELAY_SECS};
use crate::errors::{AppError, AppResult};
use crate::health::RetryPolicy;
use crate::validation::ValidationMode;

/// Remote service connection settings
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Base URL; uploads go to `{base_url}/workouts`
    pub api_base_url: String,
    /// Optional bearer token
    pub api_token: Option<String>,
    /// Whole-request timeout
    pub timeout: Duration,
    /// Connection establishment timeout
    pub connect_timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_owned(),
            api_token: None,
            timeout: Duration::from_secs(HTTP_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(HTTP_CONNECT_TIMEOUT_SECS),
        }
    }
}

/// Complete pipeline configuration
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Remote service settings
    pub transport: TransportConfig,
    /// Collector retry policy
    pub retry: RetryPolicy,
    /// Wait between validation and submission
    pub settling_delay: Duration,
    /// Wait between consecutive batch uploads
    pub batch_pacing: Duration,
    /// Wait before the aggregate batch event is published
    pub notify_delay: Duration,
    /// Validation strictness
    pub validation_mode: ValidationMode,
    /// Persisted ledger location
    pub store_path: PathBuf,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            transport: TransportConfig::default(),
            retry: RetryPolicy::default(),
            settling_delay: Duration::from_secs(SETTLING_DELAY_SECS),
            batch_pacing: Duration::from_millis(BATCH_PACING_MS),
            notify_delay: Duration::from_millis(BATCH_NOTIFY_DELAY_MS),
            validation_mode: ValidationMode::CountsOnly,
            store_path: PathBuf::from(DEFAULT_STORE_FILE),
        }
    }
}

impl SyncConfig {
    /// Load configuration from `PIERRE_SYNC_*` environment variables
    ///
    /// # Errors
    ///
    /// Returns a config error if a numeric or boolean variable cannot be parsed
    pub fn from_env() -> AppResult<Self> {
        let api_token = env::var("PIERRE_SYNC_API_TOKEN")
            .ok()
            .filter(|token| !token.trim().is_empty());

        let transport = TransportConfig {
            api_base_url: env_var_or("PIERRE_SYNC_API_BASE_URL", DEFAULT_API_BASE_URL),
            api_token,
            timeout: Duration::from_secs(parse_env(
                "PIERRE_SYNC_HTTP_TIMEOUT_SECS",
                HTTP_TIMEOUT_SECS,
            )?),
            connect_timeout: Duration::from_secs(parse_env(
                "PIERRE_SYNC_HTTP_CONNECT_TIMEOUT_SECS",
                HTTP_CONNECT_TIMEOUT_SECS,
            )?),
        };

        let retry = RetryPolicy::new(
            parse_env("PIERRE_SYNC_RETRY_MAX_ATTEMPTS", RETRY_MAX_ATTEMPTS)?,
            Duration::from_secs(parse_env(
                "PIERRE_SYNC_RETRY_INTERVAL_SECS",
                RETRY_INTERVAL_SECS,
            )?),
            SUFFICIENCY_FLOOR,
            RETRY_SUCCESS_THRESHOLD,
        );

        let validation_mode = if parse_bool_env("PIERRE_SYNC_STRICT_HR_VALIDATION", false)? {
            ValidationMode::Strict
        } else {
            ValidationMode::CountsOnly
        };

        Ok(Self {
            transport,
            retry,
            settling_delay: Duration::from_secs(parse_env(
                "PIERRE_SYNC_SETTLING_DELAY_SECS",
                SETTLING_DELAY_SECS,
            )?),
            batch_pacing: Duration::from_millis(parse_env(
                "PIERRE_SYNC_BATCH_PACING_MS",
                BATCH_PACING_MS,
            )?),
            notify_delay: Duration::from_millis(parse_env(
                "PIERRE_SYNC_NOTIFY_DELAY_MS",
                BATCH_NOTIFY_DELAY_MS,
            )?),
            validation_mode,
            store_path: PathBuf::from(env_var_or("PIERRE_SYNC_STORE_PATH", DEFAULT_STORE_FILE)),
        })
    }
}

/// Get environment variable or default value
fn env_var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_owned())
}

/// Parse an environment variable, falling back to `default` when unset
fn parse_env<T: FromStr>(key: &str, default: T) -> AppResult<T> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::config_invalid(key, &raw)),
        Err(_) => Ok(default),
    }
}

fn parse_bool_env(key: &str, default: bool) -> AppResult<bool> {
    match env::var(key) {
        Ok(raw) => match raw.trim().to_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(AppError::config_invalid(key, &raw)),
        },
        Err(_) => Ok(default),
    }
}
