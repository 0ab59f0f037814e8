// ABOUTME: Integration tests for the batch upload orchestrator
// ABOUTME: Tests aggregation, pacing, single notification, heart rate retry, batch deduplication
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
#![allow(missing_docs)]

mod helpers;

use helpers::{running_workout, Pipeline, RecordingNotificationBus, ScriptedHealthSource, Step};
use pierre_workout_sync::batch::BatchUploadOrchestrator;
use pierre_workout_sync::errors::TransportFailure;
use pierre_workout_sync::models::{
    BatchFailure, ChannelKind, UploadOptions, WorkoutRecord, WorkoutsUpdated,
};
use pierre_workout_sync::registry::TaskRegistry;
use std::sync::Arc;
use std::time::Duration;

fn orchestrator(pipeline: &Pipeline, bus: &Arc<RecordingNotificationBus>) -> BatchUploadOrchestrator {
    BatchUploadOrchestrator::new(
        pipeline.coordinator.clone(),
        Arc::new(TaskRegistry::new()),
        bus.clone(),
        pipeline.clock.clone(),
    )
}

fn three_runs() -> Vec<WorkoutRecord> {
    vec![running_workout(0), running_workout(60), running_workout(120)]
}

#[tokio::test]
async fn test_batch_aggregates_partial_failure() {
    let pipeline = Pipeline::new(ScriptedHealthSource::complete());
    let bus = Arc::new(RecordingNotificationBus::new());
    let workouts = three_runs();
    let failing = workouts[1].id();
    pipeline
        .client
        .fail_workout(&failing, TransportFailure::http_status(500, "internal error detail"));

    let summary = orchestrator(&pipeline, &bus)
        .upload_batch(workouts, false, false)
        .await;

    assert_eq!(summary.total, 3);
    assert_eq!(summary.success, 2);
    assert_eq!(summary.failed, 1);
    assert_eq!(
        summary.failures,
        vec![BatchFailure {
            workout_id: failing,
            reason: "upload failed (http_status 500)".to_owned(),
        }]
    );
    assert_eq!(
        bus.events(),
        vec![WorkoutsUpdated {
            batch_upload: true,
            count: 2,
        }]
    );
}

#[tokio::test]
async fn test_batch_paces_between_uploads_and_delays_notification() {
    let pipeline = Pipeline::new(ScriptedHealthSource::complete());
    let bus = Arc::new(RecordingNotificationBus::new());

    orchestrator(&pipeline, &bus)
        .upload_batch(three_runs(), false, false)
        .await;

    let sleeps = pipeline.clock.sleeps();
    let pacing = sleeps
        .iter()
        .filter(|sleep| **sleep == Duration::from_millis(500))
        .count();
    assert_eq!(pacing, 2);
    assert_eq!(sleeps.last(), Some(&Duration::from_secs(1)));
    assert_eq!(pipeline.client.submission_count(), 3);
}

#[tokio::test]
async fn test_batch_without_success_publishes_nothing() {
    let pipeline = Pipeline::new(ScriptedHealthSource::new());
    let bus = Arc::new(RecordingNotificationBus::new());

    let summary = orchestrator(&pipeline, &bus)
        .with_pacing(Duration::ZERO)
        .upload_batch(three_runs(), false, false)
        .await;

    assert_eq!(summary.success, 0);
    assert_eq!(summary.failed, 3);
    assert!(summary
        .failures
        .iter()
        .all(|failure| failure.reason.starts_with("insufficient data")));
    assert!(bus.events().is_empty());
    assert_eq!(pipeline.client.submission_count(), 0);
}

#[tokio::test]
async fn test_already_uploaded_workouts_count_as_success() {
    let pipeline = Pipeline::new(ScriptedHealthSource::complete());
    let bus = Arc::new(RecordingNotificationBus::new());
    let workouts = three_runs();
    pipeline
        .coordinator
        .upload_workout(&workouts[0], UploadOptions::default())
        .await
        .unwrap();

    let summary = orchestrator(&pipeline, &bus)
        .upload_batch(workouts, false, false)
        .await;

    assert_eq!(summary.success, 3);
    assert_eq!(pipeline.client.submission_count(), 3);
    assert_eq!(bus.events()[0].count, 3);
}

#[tokio::test]
async fn test_retry_heart_rate_forces_only_workouts_missing_heart_rate() {
    let pipeline = Pipeline::new(ScriptedHealthSource::complete());
    let bus = Arc::new(RecordingNotificationBus::new());
    let workouts = three_runs();
    pipeline.tracker.mark_uploaded(&workouts[0].id(), false).await.unwrap();
    pipeline.tracker.mark_uploaded(&workouts[1].id(), true).await.unwrap();
    pipeline.tracker.mark_uploaded(&workouts[2].id(), true).await.unwrap();

    let summary = orchestrator(&pipeline, &bus)
        .upload_batch(workouts.clone(), false, true)
        .await;

    assert_eq!(summary.success, 3);
    assert_eq!(pipeline.client.submitted_ids(), vec![workouts[0].id()]);
    assert!(pipeline.tracker.has_heart_rate(&workouts[0].id()).await);
}

#[tokio::test]
async fn test_without_retry_heart_rate_known_workouts_are_skipped() {
    let pipeline = Pipeline::new(ScriptedHealthSource::complete());
    let bus = Arc::new(RecordingNotificationBus::new());
    let workouts = three_runs();
    for workout in &workouts {
        pipeline.tracker.mark_uploaded(&workout.id(), false).await.unwrap();
    }

    let summary = orchestrator(&pipeline, &bus)
        .upload_batch(workouts, false, false)
        .await;

    assert_eq!(summary.success, 3);
    assert_eq!(pipeline.client.submission_count(), 0);
}

#[tokio::test]
async fn test_identical_concurrent_batches_run_once() {
    let pipeline = Pipeline::new(ScriptedHealthSource::complete());
    let bus = Arc::new(RecordingNotificationBus::new());
    let batch = orchestrator(&pipeline, &bus);

    let (first, second) = tokio::join!(
        batch.upload_batch(three_runs(), false, false),
        batch.upload_batch(three_runs(), false, false),
    );

    assert_eq!(first, second);
    assert_eq!(pipeline.client.submission_count(), 3);
    assert_eq!(bus.events().len(), 1);
}

#[tokio::test]
async fn test_crashed_uploads_are_reported_as_cancelled() {
    let pipeline = Pipeline::new(
        ScriptedHealthSource::complete().with_channel(ChannelKind::HeartRate, [Step::Panic]),
    );
    let bus = Arc::new(RecordingNotificationBus::new());
    let workouts = three_runs();

    let summary = orchestrator(&pipeline, &bus)
        .upload_batch(workouts.clone(), false, false)
        .await;

    assert_eq!(summary.success, 0);
    assert_eq!(summary.failed, 3);
    assert!(summary
        .failures
        .iter()
        .all(|failure| failure.reason == "upload cancelled"));
    assert!(bus.events().is_empty());
    for workout in &workouts {
        assert!(!pipeline.tracker.is_uploaded(&workout.id()).await);
    }
}

#[tokio::test]
async fn test_crashed_batch_fails_every_workout() {
    let pipeline = Pipeline::new(ScriptedHealthSource::complete());
    let bus = Arc::new(RecordingNotificationBus::crashing());
    let workouts = three_runs();
    let ids: Vec<String> = workouts.iter().map(WorkoutRecord::id).collect();

    let summary = orchestrator(&pipeline, &bus)
        .upload_batch(workouts, false, false)
        .await;

    assert_eq!(summary.total, 3);
    assert_eq!(summary.success, 0);
    assert_eq!(summary.failed, 3);
    assert_eq!(
        summary
            .failures
            .iter()
            .map(|failure| failure.workout_id.clone())
            .collect::<Vec<_>>(),
        ids
    );
    assert!(summary
        .failures
        .iter()
        .all(|failure| failure.reason == "batch upload cancelled"));
    assert!(bus.events().is_empty());

    // Uploads confirmed before the crash stay in the ledger
    assert_eq!(pipeline.client.submission_count(), 3);
    for id in &ids {
        assert!(pipeline.tracker.is_uploaded(id).await);
    }
}

#[tokio::test]
async fn test_empty_batch_is_a_no_op() {
    let pipeline = Pipeline::new(ScriptedHealthSource::complete());
    let bus = Arc::new(RecordingNotificationBus::new());

    let summary = orchestrator(&pipeline, &bus)
        .upload_batch(Vec::new(), false, false)
        .await;

    assert_eq!(summary.total, 0);
    assert!(bus.events().is_empty());
    assert!(pipeline.clock.sleeps().is_empty());
}

#[test]
fn test_batch_key_depends_on_membership_and_order() {
    let forward = three_runs();
    let mut reversed = three_runs();
    reversed.reverse();

    let key = BatchUploadOrchestrator::batch_key(&forward);
    assert!(key.starts_with("upload_batch_"));
    assert_eq!(key, BatchUploadOrchestrator::batch_key(&three_runs()));
    assert_ne!(key, BatchUploadOrchestrator::batch_key(&reversed));
    assert_ne!(key, BatchUploadOrchestrator::batch_key(&forward[..2]));
}
