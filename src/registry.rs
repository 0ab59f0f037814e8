// ABOUTME: Single-flight task registry deduplicating concurrent operations by key
// ABOUTME: One spawned execution per key; concurrent callers share its cloned result
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Single-Flight Task Registry
//!
//! `execute(key, op)` runs `op` at most once per key at a time. The first caller spawns
//! the operation on the tokio runtime and registers a shared handle; callers arriving
//! while it is in flight await that handle and receive a clone of the same result.
//!
//! The operation runs on its own task, so dropping a waiter (or every waiter) never
//! tears it down halfway. The key is released by the task itself when it finishes,
//! including when the operation panics, so a later call starts a fresh attempt.
//!
//! Panic recovery needs unwinding. Release builds use `panic = "abort"`, where a panicking
//! operation terminates the process instead of yielding `None`.

use futures_util::future::{BoxFuture, FutureExt, Shared};
use std::collections::HashMap;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, warn};

type SharedResult<T> = Shared<BoxFuture<'static, Option<T>>>;

struct InFlight<T: Clone> {
    generation: u64,
    result: SharedResult<T>,
}

type InFlightMap<T> = Arc<Mutex<HashMap<String, InFlight<T>>>>;

/// Deduplicates concurrent operations by key
///
/// The result type should encode failure itself (typically a `Result`); the registry
/// only reports `None` when the operation ended without producing a value.
pub struct TaskRegistry<T: Clone> {
    in_flight: InFlightMap<T>,
    generation: AtomicU64,
}

impl<T: Clone> Default for TaskRegistry<T> {
    fn default() -> Self {
        Self {
            in_flight: Arc::new(Mutex::new(HashMap::new())),
            generation: AtomicU64::new(0),
        }
    }
}

impl<T> TaskRegistry<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `operation` under `key`, or join the execution already in flight
    ///
    /// `operation` is only invoked by the caller that registers the key. Returns `None`
    /// if the operation panicked; the key is released either way.
    pub async fn execute<F, Fut>(&self, key: impl Into<String>, operation: F) -> Option<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T> + Send + 'static,
    {
        let key = key.into();
        let shared = {
            let mut in_flight = lock(&self.in_flight);
            if let Some(existing) = in_flight.get(&key) {
                debug!(key = %key, "Joining in-flight task");
                existing.result.clone()
            } else {
                let generation = self.generation.fetch_add(1, Ordering::Relaxed);
                let result = spawn_tracked(
                    Arc::clone(&self.in_flight),
                    key.clone(),
                    generation,
                    operation(),
                );
                in_flight.insert(
                    key.clone(),
                    InFlight {
                        generation,
                        result: result.clone(),
                    },
                );
                debug!(key = %key, "Registered new in-flight task");
                result
            }
        };
        shared.await
    }

    /// Whether an execution for `key` is currently running
    #[must_use]
    pub fn is_in_flight(&self, key: &str) -> bool {
        lock(&self.in_flight).contains_key(key)
    }

    /// Number of keys currently in flight
    #[must_use]
    pub fn in_flight_count(&self) -> usize {
        lock(&self.in_flight).len()
    }
}

fn lock<T: Clone>(map: &InFlightMap<T>) -> MutexGuard<'_, HashMap<String, InFlight<T>>> {
    map.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Spawn the operation and return a shared handle to its result
///
/// The spawned task removes its own registry entry on completion. The entry is matched
/// by generation so a task can never release a newer attempt under the same key.
fn spawn_tracked<T, Fut>(
    in_flight: InFlightMap<T>,
    key: String,
    generation: u64,
    operation: Fut,
) -> SharedResult<T>
where
    T: Clone + Send + Sync + 'static,
    Fut: Future<Output = T> + Send + 'static,
{
    let handle = tokio::spawn(async move {
        let outcome = AssertUnwindSafe(operation).catch_unwind().await;
        {
            let mut map = lock(&in_flight);
            if map
                .get(&key)
                .is_some_and(|entry| entry.generation == generation)
            {
                map.remove(&key);
            }
        }
        match outcome {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(key = %key, "In-flight task panicked; releasing key");
                None
            }
        }
    });

    async move { handle.await.ok().flatten() }.boxed().shared()
}
