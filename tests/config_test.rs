// ABOUTME: Integration tests for environment-driven pipeline configuration
// ABOUTME: Tests defaults, overrides, and rejection of malformed values
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
#![allow(missing_docs)]

use pierre_workout_sync::config::SyncConfig;
use pierre_workout_sync::errors::ErrorCode;
use pierre_workout_sync::validation::ValidationMode;
use serial_test::serial;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

const VARS: [&str; 11] = [
    "PIERRE_SYNC_API_BASE_URL",
    "PIERRE_SYNC_API_TOKEN",
    "PIERRE_SYNC_HTTP_TIMEOUT_SECS",
    "PIERRE_SYNC_HTTP_CONNECT_TIMEOUT_SECS",
    "PIERRE_SYNC_SETTLING_DELAY_SECS",
    "PIERRE_SYNC_RETRY_MAX_ATTEMPTS",
    "PIERRE_SYNC_RETRY_INTERVAL_SECS",
    "PIERRE_SYNC_BATCH_PACING_MS",
    "PIERRE_SYNC_NOTIFY_DELAY_MS",
    "PIERRE_SYNC_STRICT_HR_VALIDATION",
    "PIERRE_SYNC_STORE_PATH",
];

fn clear_env() {
    for var in VARS {
        env::remove_var(var);
    }
}

#[test]
#[serial]
fn test_defaults_without_environment() {
    clear_env();

    let config = SyncConfig::from_env().unwrap();

    assert_eq!(config.transport.api_base_url, "http://localhost:8081/api");
    assert!(config.transport.api_token.is_none());
    assert_eq!(config.transport.timeout, Duration::from_secs(30));
    assert_eq!(config.settling_delay, Duration::from_secs(20));
    assert_eq!(config.retry.max_attempts, 5);
    assert_eq!(config.retry.interval, Duration::from_secs(30));
    assert_eq!(config.batch_pacing, Duration::from_millis(500));
    assert_eq!(config.notify_delay, Duration::from_secs(1));
    assert_eq!(config.validation_mode, ValidationMode::CountsOnly);
    assert_eq!(config.store_path, PathBuf::from("pierre-sync-store.json"));
}

#[test]
#[serial]
fn test_environment_overrides() {
    clear_env();
    env::set_var("PIERRE_SYNC_API_BASE_URL", "https://pierre.example.com/api");
    env::set_var("PIERRE_SYNC_API_TOKEN", "secret-token");
    env::set_var("PIERRE_SYNC_SETTLING_DELAY_SECS", "0");
    env::set_var("PIERRE_SYNC_RETRY_MAX_ATTEMPTS", "2");
    env::set_var("PIERRE_SYNC_RETRY_INTERVAL_SECS", "5");
    env::set_var("PIERRE_SYNC_BATCH_PACING_MS", "250");
    env::set_var("PIERRE_SYNC_STRICT_HR_VALIDATION", "true");
    env::set_var("PIERRE_SYNC_STORE_PATH", "/tmp/ledger.json");

    let config = SyncConfig::from_env().unwrap();
    clear_env();

    assert_eq!(config.transport.api_base_url, "https://pierre.example.com/api");
    assert_eq!(config.transport.api_token.as_deref(), Some("secret-token"));
    assert_eq!(config.settling_delay, Duration::ZERO);
    assert_eq!(config.retry.max_attempts, 2);
    assert_eq!(config.retry.interval, Duration::from_secs(5));
    assert_eq!(config.batch_pacing, Duration::from_millis(250));
    assert_eq!(config.validation_mode, ValidationMode::Strict);
    assert_eq!(config.store_path, PathBuf::from("/tmp/ledger.json"));
}

#[test]
#[serial]
fn test_blank_token_is_ignored() {
    clear_env();
    env::set_var("PIERRE_SYNC_API_TOKEN", "  ");

    let config = SyncConfig::from_env().unwrap();
    clear_env();

    assert!(config.transport.api_token.is_none());
}

#[test]
#[serial]
fn test_malformed_number_is_config_error() {
    clear_env();
    env::set_var("PIERRE_SYNC_RETRY_MAX_ATTEMPTS", "many");

    let error = SyncConfig::from_env().unwrap_err();
    clear_env();

    assert_eq!(error.code, ErrorCode::ConfigInvalid);
    assert!(error.message.contains("PIERRE_SYNC_RETRY_MAX_ATTEMPTS"));
}

#[test]
#[serial]
fn test_malformed_boolean_is_config_error() {
    clear_env();
    env::set_var("PIERRE_SYNC_STRICT_HR_VALIDATION", "sometimes");

    let result = SyncConfig::from_env();
    clear_env();

    assert!(result.is_err());
}
