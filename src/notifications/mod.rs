// ABOUTME: Notification bus for aggregate workout update events
// ABOUTME: Broadcast-channel implementation fanning events out to in-process subscribers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use tokio::sync::broadcast;
use tracing::debug;

use crate::models::WorkoutsUpdated;

/// Capacity of the broadcast channel; slow subscribers lag rather than block publishers
pub const NOTIFICATION_CHANNEL_SIZE: usize = 64;

/// Publishes workout update events to interested listeners
pub trait NotificationBus: Send + Sync {
    /// Publish one event
    fn publish(&self, event: WorkoutsUpdated);
}

/// In-process notification bus backed by `tokio::sync::broadcast`
#[derive(Debug, Clone)]
pub struct BroadcastNotificationBus {
    sender: broadcast::Sender<WorkoutsUpdated>,
}

impl Default for BroadcastNotificationBus {
    fn default() -> Self {
        let (sender, _) = broadcast::channel(NOTIFICATION_CHANNEL_SIZE);
        Self { sender }
    }
}

impl BroadcastNotificationBus {
    /// Create a bus with no subscribers
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to future events
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<WorkoutsUpdated> {
        self.sender.subscribe()
    }
}

impl NotificationBus for BroadcastNotificationBus {
    fn publish(&self, event: WorkoutsUpdated) {
        // Publishing with no subscribers is not an error
        let receivers = self.sender.send(event).unwrap_or(0);
        debug!(
            batch_upload = event.batch_upload,
            count = event.count,
            receivers,
            "Published workouts updated event"
        );
    }
}
