//! Observable events
//!
//! Every log line the crate emits names one of these events.

use std::fmt;

use super::logger::Severity;

/// Observable events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Lifecycle
    /// Configuration loaded and validated
    ConfigLoaded,
    /// Structure catalog built and frozen
    CatalogSealed,

    // Writes
    /// Record payload stored
    RecordWritten,
    /// Record payload could not be stored
    RecordWriteFailed,
    /// One index entry written
    IndexWritten,
    /// Index entry failed after its record was stored
    IndexWriteFailed,
    /// Retry queue full, oldest failure discarded
    IndexRetryDropped,
    /// Queued index failure replayed
    IndexRetried,

    // Reads
    /// Index pointed at a record of another structure
    StructureMismatch,
    /// Daily lookback walked every bucket without a hit
    LookbackExhausted,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::CatalogSealed => "CATALOG_SEALED",
            Event::RecordWritten => "RECORD_WRITTEN",
            Event::RecordWriteFailed => "RECORD_WRITE_FAILED",
            Event::IndexWritten => "INDEX_WRITTEN",
            Event::IndexWriteFailed => "INDEX_WRITE_FAILED",
            Event::IndexRetryDropped => "INDEX_RETRY_DROPPED",
            Event::IndexRetried => "INDEX_RETRIED",
            Event::StructureMismatch => "STRUCTURE_MISMATCH",
            Event::LookbackExhausted => "LOOKBACK_EXHAUSTED",
        }
    }

    /// Severity the event is logged at
    pub fn severity(&self) -> Severity {
        match self {
            Event::IndexWritten | Event::LookbackExhausted => Severity::Trace,
            Event::ConfigLoaded
            | Event::CatalogSealed
            | Event::RecordWritten
            | Event::IndexRetried => Severity::Info,
            Event::StructureMismatch | Event::IndexWriteFailed => Severity::Warn,
            Event::RecordWriteFailed | Event::IndexRetryDropped => Severity::Error,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
