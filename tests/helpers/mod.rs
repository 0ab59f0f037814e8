// ABOUTME: Shared fakes for upload pipeline integration tests
// ABOUTME: Scripted health source, recording upload client, instant clock, recording notification bus
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
#![allow(
    dead_code,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::panic,
    clippy::unwrap_used
)]
//! Shared test utilities for `pierre_workout_sync`

use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, TimeZone, Utc};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use pierre_workout_sync::{
    clock::Clock,
    client::UploadClient,
    coordinator::UploadCoordinator,
    errors::{HealthSourceError, TransportFailure},
    health::{HealthDataCollector, HealthDataSource, RetryPolicy},
    models::{
        ActivityType, ChannelKind, ChannelSample, LapSplit, WorkoutBuilder, WorkoutRecord,
        WorkoutUploadPayload, WorkoutsUpdated,
    },
    notifications::NotificationBus,
    registry::TaskRegistry,
    store::{InMemoryStore, KeyValueStore},
    summary_cache::WorkoutSummaryCache,
    tracker::UploadTracker,
    validation::{DataQualityValidator, ValidationMode},
};

/// Fixed reference time for deterministic workouts
pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 7, 0, 0).unwrap()
}

/// 30 minute run starting `offset_minutes` after the base time
pub fn running_workout(offset_minutes: i64) -> WorkoutRecord {
    let start = base_time() + ChronoDuration::minutes(offset_minutes);
    WorkoutBuilder::new(
        ActivityType::Running,
        start,
        start + ChronoDuration::minutes(30),
    )
    .distance_meters(5_000.0)
    .build()
}

/// 45 minute yoga session starting `offset_minutes` after the base time
pub fn yoga_workout(offset_minutes: i64) -> WorkoutRecord {
    let start = base_time() + ChronoDuration::minutes(offset_minutes);
    WorkoutBuilder::new(ActivityType::Yoga, start, start + ChronoDuration::minutes(45)).build()
}

/// `count` samples spread evenly across the workout window
pub fn samples_for(kind: ChannelKind, workout: &WorkoutRecord, count: usize) -> Vec<ChannelSample> {
    let span = (workout.end() - workout.start()).num_seconds().max(1);
    let step = span / i64::try_from(count.max(1)).unwrap();
    (0..count)
        .map(|i| {
            let offset = step * i64::try_from(i).unwrap();
            let value = match kind {
                ChannelKind::HeartRate => 140.0 + (i % 10) as f64,
                ChannelKind::Speed => 3.2,
                ChannelKind::Cadence => 172.0,
                ChannelKind::StrideLength => 1.1,
                ChannelKind::GroundContactTime => 240.0,
                ChannelKind::VerticalOscillation => 8.5,
            };
            ChannelSample::new(workout.start() + ChronoDuration::seconds(offset), value)
        })
        .collect()
}

/// One scripted response for a channel fetch
#[derive(Debug, Clone, Copy)]
pub enum Step {
    /// Return this many samples
    Samples(usize),
    /// Fail the query
    Fail,
    /// Panic inside the fetch, killing the upload task
    Panic,
}

/// One observed `fetch_channel` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchCall {
    pub kind: ChannelKind,
    pub force_refresh: bool,
    pub attempt: u32,
}

/// Health source answering from per-channel scripts
///
/// Each call pops the next step for the channel; once a script runs out its last step
/// repeats. Channels without a script return no samples.
#[derive(Default)]
pub struct ScriptedHealthSource {
    scripts: Mutex<HashMap<ChannelKind, VecDeque<Step>>>,
    last: Mutex<HashMap<ChannelKind, Step>>,
    calls: Mutex<Vec<FetchCall>>,
}

impl ScriptedHealthSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Source where heart rate, speed, and cadence all have plenty of samples
    pub fn complete() -> Self {
        Self::new()
            .with_channel(ChannelKind::HeartRate, [Step::Samples(30)])
            .with_channel(ChannelKind::Speed, [Step::Samples(30)])
            .with_channel(ChannelKind::Cadence, [Step::Samples(30)])
    }

    #[must_use]
    pub fn with_channel(self, kind: ChannelKind, steps: impl IntoIterator<Item = Step>) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .insert(kind, steps.into_iter().collect());
        self
    }

    pub fn calls(&self) -> Vec<FetchCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_for(&self, kind: ChannelKind) -> usize {
        self.calls().iter().filter(|call| call.kind == kind).count()
    }

    pub fn forced_calls_for(&self, kind: ChannelKind) -> usize {
        self.calls()
            .iter()
            .filter(|call| call.kind == kind && call.force_refresh)
            .count()
    }

    fn next_step(&self, kind: ChannelKind) -> Step {
        let popped = self
            .scripts
            .lock()
            .unwrap()
            .get_mut(&kind)
            .and_then(VecDeque::pop_front);
        let mut last = self.last.lock().unwrap();
        match popped {
            Some(step) => {
                last.insert(kind, step);
                step
            }
            None => last.get(&kind).copied().unwrap_or(Step::Samples(0)),
        }
    }
}

#[async_trait]
impl HealthDataSource for ScriptedHealthSource {
    async fn fetch_channel(
        &self,
        kind: ChannelKind,
        workout: &WorkoutRecord,
        force_refresh: bool,
        attempt: u32,
    ) -> Result<Vec<ChannelSample>, HealthSourceError> {
        self.calls.lock().unwrap().push(FetchCall {
            kind,
            force_refresh,
            attempt,
        });
        match self.next_step(kind) {
            Step::Samples(count) => Ok(samples_for(kind, workout, count)),
            Step::Fail => Err(HealthSourceError::QueryFailed {
                channel: kind.to_string(),
                message: "health store busy".to_owned(),
            }),
            Step::Panic => panic!("health store crashed while reading {kind}"),
        }
    }

    async fn fetch_laps(
        &self,
        _workout: &WorkoutRecord,
    ) -> Result<Option<Vec<LapSplit>>, HealthSourceError> {
        Ok(None)
    }
}

/// Clock that never blocks; sleeps advance virtual time and are recorded
pub struct InstantClock {
    now: Mutex<DateTime<Utc>>,
    sleeps: Mutex<Vec<Duration>>,
}

impl Default for InstantClock {
    fn default() -> Self {
        Self {
            now: Mutex::new(base_time() + ChronoDuration::days(1)),
            sleeps: Mutex::new(Vec::new()),
        }
    }
}

impl InstantClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }

    pub fn total_slept(&self) -> Duration {
        self.sleeps().into_iter().sum()
    }
}

#[async_trait]
impl Clock for InstantClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }

    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
        {
            let mut now = self.now.lock().unwrap();
            *now += ChronoDuration::from_std(duration).unwrap();
        }
        tokio::task::yield_now().await;
    }
}

/// Upload client that records payloads and fails chosen workouts
#[derive(Default)]
pub struct RecordingUploadClient {
    submissions: Mutex<Vec<WorkoutUploadPayload>>,
    failures: Mutex<HashMap<String, TransportFailure>>,
}

impl RecordingUploadClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every submission of `workout_id` fail with `failure`
    pub fn fail_workout(&self, workout_id: &str, failure: TransportFailure) {
        self.failures
            .lock()
            .unwrap()
            .insert(workout_id.to_owned(), failure);
    }

    /// Let `workout_id` succeed again
    pub fn recover_workout(&self, workout_id: &str) {
        self.failures.lock().unwrap().remove(workout_id);
    }

    pub fn submissions(&self) -> Vec<WorkoutUploadPayload> {
        self.submissions.lock().unwrap().clone()
    }

    pub fn submission_count(&self) -> usize {
        self.submissions.lock().unwrap().len()
    }

    pub fn submitted_ids(&self) -> Vec<String> {
        self.submissions()
            .into_iter()
            .map(|payload| payload.id)
            .collect()
    }
}

#[async_trait]
impl UploadClient for RecordingUploadClient {
    async fn submit(&self, payload: &WorkoutUploadPayload) -> Result<(), TransportFailure> {
        self.submissions.lock().unwrap().push(payload.clone());
        let failure = self.failures.lock().unwrap().get(&payload.id).cloned();
        failure.map_or(Ok(()), Err)
    }
}

/// Notification bus that records published events
#[derive(Default)]
pub struct RecordingNotificationBus {
    events: Mutex<Vec<WorkoutsUpdated>>,
    crash_on_publish: bool,
}

impl RecordingNotificationBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bus whose `publish` panics, taking the batch task down with it
    pub fn crashing() -> Self {
        Self {
            crash_on_publish: true,
            ..Self::default()
        }
    }

    pub fn events(&self) -> Vec<WorkoutsUpdated> {
        self.events.lock().unwrap().clone()
    }
}

impl NotificationBus for RecordingNotificationBus {
    fn publish(&self, event: WorkoutsUpdated) {
        assert!(!self.crash_on_publish, "notification bus crashed");
        self.events.lock().unwrap().push(event);
    }
}

/// Coordinator wired to fakes, with handles to every collaborator
pub struct Pipeline {
    pub coordinator: UploadCoordinator,
    pub source: Arc<ScriptedHealthSource>,
    pub client: Arc<RecordingUploadClient>,
    pub clock: Arc<InstantClock>,
    pub store: Arc<InMemoryStore>,
    pub tracker: UploadTracker,
    pub summaries: WorkoutSummaryCache,
}

impl Pipeline {
    /// Pipeline over `source` with the default retry policy and counts-only validation
    pub fn new(source: ScriptedHealthSource) -> Self {
        Self::with_options(source, RetryPolicy::default(), ValidationMode::CountsOnly)
    }

    pub fn with_options(
        source: ScriptedHealthSource,
        policy: RetryPolicy,
        mode: ValidationMode,
    ) -> Self {
        let source = Arc::new(source);
        let client = Arc::new(RecordingUploadClient::new());
        let clock = Arc::new(InstantClock::new());
        let store = Arc::new(InMemoryStore::new());

        let store_dyn: Arc<dyn KeyValueStore> = store.clone();
        let clock_dyn: Arc<dyn Clock> = clock.clone();
        let tracker = UploadTracker::new(Arc::clone(&store_dyn), Arc::clone(&clock_dyn));
        let summaries = WorkoutSummaryCache::new(store_dyn);

        let coordinator = UploadCoordinator::new(
            HealthDataCollector::new(source.clone(), Arc::clone(&clock_dyn), policy),
            DataQualityValidator::new(mode),
            tracker.clone(),
            Arc::new(TaskRegistry::new()),
            client.clone(),
            clock_dyn,
        )
        .with_summary_cache(summaries.clone());

        Self {
            coordinator,
            source,
            client,
            clock,
            store,
            tracker,
            summaries,
        }
    }
}
