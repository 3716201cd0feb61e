//! Bounded queue of index writes awaiting replay
//!
//! Filled by saves whose record landed but an index entry did not. Drained
//! only by an explicit replay; nothing here runs in the background.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use crate::observability::{log_event, Event};

use super::key::IndexKey;
use super::writer::{IndexWriteFailed, WriteMode};

/// Outcome of one replay pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RetryReport {
    /// Entries taken off the queue
    pub attempted: usize,
    /// Entries written this time
    pub succeeded: usize,
    /// Entries that failed again and went back on the queue
    pub requeued: usize,
}

/// FIFO of failed index writes with a fixed capacity.
///
/// When full, pushing evicts the oldest entry and logs it at ERROR; that
/// entry is lost for good.
#[derive(Debug)]
pub struct RetryQueue {
    entries: Mutex<VecDeque<IndexWriteFailed>>,
    capacity: usize,
}

impl RetryQueue {
    /// Queue holding at most `capacity` entries (at least one)
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: Mutex::new(VecDeque::with_capacity(capacity.min(1024))),
            capacity,
        }
    }

    /// Maximum number of entries
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Enqueues a failure. Returns the evicted entry, if any.
    pub fn push(&self, failed: IndexWriteFailed) -> Option<IndexWriteFailed> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let evicted = if entries.len() >= self.capacity {
            entries.pop_front()
        } else {
            None
        };
        entries.push_back(failed);
        drop(entries);

        if let Some(ref lost) = evicted {
            let key = lost.write.key.to_hex();
            let value = lost.write.value.to_hex();
            log_event(
                Event::IndexRetryDropped,
                &[
                    ("structure", lost.write.structure),
                    ("index", lost.write.index),
                    ("key", key.as_str()),
                    ("value", value.as_str()),
                    ("code", lost.error.code()),
                ],
            );
        }
        evicted
    }

    /// Takes every queued entry, oldest first.
    pub fn drain(&self) -> Vec<IndexWriteFailed> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain(..)
            .collect()
    }

    /// Drops queued overwrites of `key`.
    ///
    /// Called after a newer primary pointer landed under `key`, so a replay
    /// cannot move the chain back to an older version. Returns how many
    /// entries were dropped.
    pub fn supersede(&self, key: &IndexKey) -> usize {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let before = entries.len();
        entries.retain(|f| !(f.write.mode == WriteMode::Overwrite && f.write.key == *key));
        before - entries.len()
    }

    /// Copy of the queued entries, oldest first
    pub fn pending(&self) -> Vec<IndexWriteFailed> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect()
    }

    /// Number of queued entries
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// True when nothing is queued
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
