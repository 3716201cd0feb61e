//! Observability: structured logging, typed events, counters
//!
//! # Principles
//!
//! 1. Observability is read-only
//! 2. No async or background threads
//! 3. Deterministic output
//!
//! # Usage
//!
//! ```ignore
//! use hashindex::observability::{log_event, Event, MetricsRegistry};
//!
//! log_event(Event::RecordWritten, &[("structure", "PersonNumber")]);
//!
//! let metrics = MetricsRegistry::new();
//! metrics.increment_lookups();
//! ```

mod events;
mod logger;
mod metrics;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use metrics::{MetricsRegistry, MetricsSnapshot};

#[cfg(test)]
pub(crate) use logger::capture_log;

/// Log an event at its own severity.
pub fn log_event(event: Event, fields: &[(&str, &str)]) {
    Logger::log(event.severity(), event.as_str(), fields);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_event_does_not_panic() {
        log_event(Event::CatalogSealed, &[("structures", "4")]);
        log_event(Event::IndexRetryDropped, &[]);
    }

    #[test]
    fn test_event_line_carries_event_severity() {
        let event = Event::StructureMismatch;
        let line = capture_log(event.severity(), event.as_str(), &[("index", "Number")]);
        let parsed: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(parsed["event"], "STRUCTURE_MISMATCH");
        assert_eq!(parsed["severity"], "WARN");
        assert_eq!(parsed["index"], "Number");
    }
}
