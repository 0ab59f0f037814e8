// ABOUTME: Integration tests for the JSON export health source
// ABOUTME: Tests file loading, workout window filtering, calorie fallback, and unknown workouts
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
#![allow(missing_docs)]

mod helpers;

use helpers::yoga_workout;
use pierre_workout_sync::errors::HealthSourceError;
use pierre_workout_sync::health::{HealthDataSource, JsonExportSource};
use pierre_workout_sync::models::{ActivityType, ChannelKind};
use tempfile::TempDir;

const EXPORT: &str = r#"{
  "workouts": [
    {
      "workout": {
        "activity_type": "Running",
        "start": "2025-06-01T07:00:00Z",
        "end": "2025-06-01T07:30:00Z",
        "duration_seconds": 1800.0,
        "distance_meters": 5000.0,
        "total_energy_kcal": 320.0,
        "device": { "device_manufacturer": "Garmin" }
      },
      "channels": {
        "heart_rate": [
          { "timestamp": "2025-06-01T06:55:00Z", "value": 80.0 },
          { "timestamp": "2025-06-01T07:05:00Z", "value": 148.0 },
          { "timestamp": "2025-06-01T07:20:00Z", "value": 161.0 }
        ],
        "speed": [
          { "timestamp": "2025-06-01T07:10:00Z", "value": 3.1 }
        ]
      }
    }
  ]
}"#;

async fn load_export() -> (TempDir, JsonExportSource) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("export.json");
    tokio::fs::write(&path, EXPORT).await.unwrap();
    let source = JsonExportSource::load(&path).await.unwrap();
    (dir, source)
}

#[tokio::test]
async fn test_load_parses_workouts() {
    let (_dir, source) = load_export().await;

    let workouts = source.workouts();
    assert_eq!(workouts.len(), 1);
    assert_eq!(workouts[0].activity_type(), &ActivityType::Running);
    assert_eq!(
        workouts[0].device().device_manufacturer.as_deref(),
        Some("Garmin")
    );
}

#[tokio::test]
async fn test_samples_outside_workout_window_are_dropped() {
    let (_dir, source) = load_export().await;
    let workout = source.workouts()[0].clone();

    let heart_rate = source
        .fetch_channel(ChannelKind::HeartRate, &workout, false, 0)
        .await
        .unwrap();
    let cadence = source
        .fetch_channel(ChannelKind::Cadence, &workout, true, 1)
        .await
        .unwrap();

    assert_eq!(heart_rate.len(), 2);
    assert!(heart_rate.iter().all(|sample| sample.value > 100.0));
    assert!(cadence.is_empty());
}

#[tokio::test]
async fn test_calories_fall_back_to_workout_energy() {
    let (_dir, source) = load_export().await;
    let workout = source.workouts()[0].clone();

    assert_eq!(source.fetch_calories(&workout).await.unwrap(), Some(320.0));
    assert_eq!(source.fetch_laps(&workout).await.unwrap(), None);
}

#[tokio::test]
async fn test_unknown_workout_is_reported() {
    let (_dir, source) = load_export().await;

    let error = source
        .fetch_channel(ChannelKind::HeartRate, &yoga_workout(0), false, 0)
        .await
        .unwrap_err();

    assert!(matches!(error, HealthSourceError::WorkoutNotFound { .. }));
}

#[tokio::test]
async fn test_missing_export_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    assert!(JsonExportSource::load(dir.path().join("absent.json"))
        .await
        .is_err());
}
