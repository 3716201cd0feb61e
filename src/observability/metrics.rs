//! Operational counters
//!
//! - Counters only
//! - Monotonic increase
//! - Reset only when the registry is created
//! - Relaxed atomics; values are exact once writers quiesce

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Registry of operational counters, shared by one `Datastore`
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    records_written: AtomicU64,
    record_bytes_written: AtomicU64,
    records_read: AtomicU64,
    index_writes: AtomicU64,
    index_write_failures: AtomicU64,
    index_retries: AtomicU64,
    index_retries_dropped: AtomicU64,
    lookups: AtomicU64,
    lookups_not_found: AtomicU64,
    structure_mismatches: AtomicU64,
    lookback_steps: AtomicU64,
}

impl MetricsRegistry {
    /// Create a new registry with all counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Record stored, with its encoded size
    pub fn record_written(&self, bytes: u64) {
        self.records_written.fetch_add(1, Ordering::Relaxed);
        self.record_bytes_written.fetch_add(bytes, Ordering::Relaxed);
    }

    /// Record fetched and decoded
    pub fn increment_records_read(&self) {
        self.records_read.fetch_add(1, Ordering::Relaxed);
    }

    /// Index entry written
    pub fn increment_index_writes(&self) {
        self.index_writes.fetch_add(1, Ordering::Relaxed);
    }

    /// Index entry failed
    pub fn increment_index_write_failures(&self) {
        self.index_write_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Queued failure replayed successfully
    pub fn increment_index_retries(&self) {
        self.index_retries.fetch_add(1, Ordering::Relaxed);
    }

    /// Queued failure evicted by overflow
    pub fn increment_index_retries_dropped(&self) {
        self.index_retries_dropped.fetch_add(1, Ordering::Relaxed);
    }

    /// Lookup started
    pub fn increment_lookups(&self) {
        self.lookups.fetch_add(1, Ordering::Relaxed);
    }

    /// Lookup ended in not-found
    pub fn increment_not_found(&self) {
        self.lookups_not_found.fetch_add(1, Ordering::Relaxed);
    }

    /// Lookup hit a record of another structure
    pub fn increment_structure_mismatches(&self) {
        self.structure_mismatches.fetch_add(1, Ordering::Relaxed);
    }

    /// One extra day bucket inspected
    pub fn increment_lookback_steps(&self) {
        self.lookback_steps.fetch_add(1, Ordering::Relaxed);
    }

    /// Point-in-time copy of every counter
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            records_written: self.records_written.load(Ordering::Relaxed),
            record_bytes_written: self.record_bytes_written.load(Ordering::Relaxed),
            records_read: self.records_read.load(Ordering::Relaxed),
            index_writes: self.index_writes.load(Ordering::Relaxed),
            index_write_failures: self.index_write_failures.load(Ordering::Relaxed),
            index_retries: self.index_retries.load(Ordering::Relaxed),
            index_retries_dropped: self.index_retries_dropped.load(Ordering::Relaxed),
            lookups: self.lookups.load(Ordering::Relaxed),
            lookups_not_found: self.lookups_not_found.load(Ordering::Relaxed),
            structure_mismatches: self.structure_mismatches.load(Ordering::Relaxed),
            lookback_steps: self.lookback_steps.load(Ordering::Relaxed),
        }
    }

    /// Snapshot rendered as one JSON object
    pub fn to_json(&self) -> String {
        serde_json::to_string(&self.snapshot()).unwrap_or_default()
    }
}

/// A point-in-time snapshot of all counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub records_written: u64,
    pub record_bytes_written: u64,
    pub records_read: u64,
    pub index_writes: u64,
    pub index_write_failures: u64,
    pub index_retries: u64,
    pub index_retries_dropped: u64,
    pub lookups: u64,
    pub lookups_not_found: u64,
    pub structure_mismatches: u64,
    pub lookback_steps: u64,
}
