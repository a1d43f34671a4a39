//! Run events
//!
//! Fan-out of store and engine notifications to subscribers.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::trace;

use crate::models::{TestCase, TestCaseId};

/// Completion of a batch after some number of records
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
}

impl Progress {
    pub fn new(completed: usize, total: usize) -> Self {
        Self { completed, total }
    }

    /// Completion fraction in [0, 1]; an empty batch is complete
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.completed as f64 / self.total as f64
        }
    }

    pub fn percent(&self) -> f64 {
        self.fraction() * 100.0
    }

    pub fn is_complete(&self) -> bool {
        self.completed >= self.total
    }
}

/// Notification emitted by the store or the engine
#[derive(Clone, Debug, PartialEq)]
pub enum RunEvent {
    /// The record list was replaced
    Seeded { total: usize },
    /// A record changed; carries the full merged record
    RecordUpdated(TestCase),
    BatchStarted { total: usize },
    Progress(Progress),
    BatchFinished { passed: usize, failed: usize },
    /// The executor errored or timed out for a record
    ExecutorFailed { id: TestCaseId, message: String },
}

/// Cloneable handle publishing events to every live subscriber
#[derive(Clone, Default)]
pub struct EventBus {
    subscribers: Arc<Mutex<Vec<UnboundedSender<RunEvent>>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new subscriber
    pub fn subscribe(&self) -> UnboundedReceiver<RunEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(tx);
        rx
    }

    /// Deliver `event` to all subscribers, dropping closed ones
    pub fn publish(&self, event: RunEvent) {
        let mut subscribers = self
            .subscribers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        trace!("Publishing {:?} to {} subscribers", event, subscribers.len());
        subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }
}
