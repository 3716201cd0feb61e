//! Partial Write Tests
//!
//! A record that landed stays saved when one of its index entries fails.
//! The failure is reported on the receipt, queued, and replayed on demand.

use std::sync::Arc;

use hashindex::index::WriteMode;
use hashindex::structures::{register_all, PersonNumber, PersonNumberStatus};
use hashindex::{
    AppIdentity, CatalogBuilder, Datastore, DatastoreConfig, FieldValue, FixedClock, MemoryStore,
    RetryReport,
};

// =============================================================================
// Helper Functions
// =============================================================================

const PERSON: [u8; 32] = [0x50; 32];

fn datastore_with_capacity(capacity: usize) -> (Datastore<MemoryStore>, Arc<FixedClock>) {
    let clock = Arc::new(FixedClock::new(1_600_000_000));
    let catalog = register_all(CatalogBuilder::new()).unwrap().build();
    let mut config = DatastoreConfig::for_identity(&AppIdentity::new([1; 32], [2; 32]));
    config.retry_queue_capacity = capacity;
    let ds = Datastore::new(Arc::new(MemoryStore::new()), Arc::new(catalog), config)
        .unwrap()
        .with_clock(clock.clone());
    (ds, clock)
}

fn datastore() -> (Datastore<MemoryStore>, Arc<FixedClock>) {
    datastore_with_capacity(16)
}

fn number(n: u64) -> PersonNumber {
    PersonNumber {
        person_id: PERSON,
        number: n,
        status: PersonNumberStatus::Registered,
        ..PersonNumber::default()
    }
}

fn latest(ds: &Datastore<MemoryStore>) -> hashindex::DatastoreResult<PersonNumber> {
    ds.get_last(PersonNumber::BY_PERSON_ID, &[FieldValue::Bytes(&PERSON)])
}

// =============================================================================
// Receipts
// =============================================================================

/// The save succeeds and the receipt names the entry that did not land.
#[test]
fn test_receipt_lists_failed_entry() {
    let (ds, _) = datastore();
    ds.store().fail_next_index_writes(1);

    let receipt = ds.save_new(&mut number(1)).unwrap();
    assert!(!receipt.is_complete());
    assert_eq!(receipt.indexes_written, 1);
    assert_eq!(receipt.failed.len(), 1);

    let failed = &receipt.failed[0];
    assert_eq!(failed.write.index, PersonNumber::BY_PERSON_ID);
    assert_eq!(failed.write.mode, WriteMode::Overwrite);
    assert_eq!(failed.error.code(), "HX_STORE_UNAVAILABLE");

    // The record itself is stored and readable by id
    let stored: PersonNumber = ds.get_by_record_id(&receipt.record_id).unwrap();
    assert_eq!(stored.number, 1);
    assert!(latest(&ds).unwrap_err().is_not_found());

    assert_eq!(ds.pending_index_failures(), receipt.failed);
    let metrics = ds.metrics().snapshot();
    assert_eq!(metrics.index_write_failures, 1);
    assert_eq!(metrics.index_writes, 1);
}

// =============================================================================
// Replay
// =============================================================================

/// Replaying a queued primary makes the record reachable.
#[test]
fn test_replay_repairs_index() {
    let (ds, _) = datastore();
    ds.store().fail_next_index_writes(1);
    let receipt = ds.save_new(&mut number(1)).unwrap();

    let report = ds.retry_failed_indexes();
    assert_eq!(
        report,
        RetryReport {
            attempted: 1,
            succeeded: 1,
            requeued: 0,
        }
    );
    assert!(ds.pending_index_failures().is_empty());
    assert_eq!(latest(&ds).unwrap().header.record_id, receipt.record_id);
    assert_eq!(ds.metrics().snapshot().index_retries, 1);
}

/// Entries that fail again go back on the queue in order.
#[test]
fn test_replay_requeues_while_offline() {
    let (ds, _) = datastore();
    ds.store().fail_next_index_writes(2);
    ds.save_new(&mut number(1)).unwrap();
    assert_eq!(ds.pending_index_failures().len(), 2);

    ds.store().set_offline(true);
    let report = ds.retry_failed_indexes();
    assert_eq!(report.attempted, 2);
    assert_eq!(report.requeued, 2);
    let pending: Vec<_> = ds
        .pending_index_failures()
        .into_iter()
        .map(|f| f.write.index)
        .collect();
    assert_eq!(pending, vec![PersonNumber::BY_PERSON_ID, PersonNumber::BY_NUMBER]);

    ds.store().set_offline(false);
    let report = ds.retry_failed_indexes();
    assert_eq!(report.succeeded, 2);

    let found: PersonNumber = ds
        .get_last(PersonNumber::BY_NUMBER, &[FieldValue::U64(1)])
        .unwrap();
    assert_eq!(found.person_id, PERSON);
}

/// An empty queue replays nothing.
#[test]
fn test_replay_of_empty_queue() {
    let (ds, _) = datastore();
    assert_eq!(ds.retry_failed_indexes(), RetryReport::default());
    assert_eq!(ds.metrics().snapshot().index_retries, 0);
}

/// A newer primary pointer cancels the queued older one.
#[test]
fn test_newer_primary_supersedes_queued() {
    let (ds, clock) = datastore();
    ds.store().fail_next_index_writes(1);
    ds.save_new(&mut number(1)).unwrap();

    clock.advance(1);
    let newer = ds.save_update(&mut number(2)).unwrap();
    assert!(newer.is_complete());
    assert!(ds.pending_index_failures().is_empty());

    assert_eq!(ds.retry_failed_indexes().attempted, 0);
    assert_eq!(latest(&ds).unwrap().header.record_id, newer.record_id);
}

// =============================================================================
// Capacity
// =============================================================================

/// A full queue evicts the oldest entry and counts it.
#[test]
fn test_full_queue_drops_oldest() {
    let (ds, _) = datastore_with_capacity(1);
    ds.store().fail_next_index_writes(2);
    let receipt = ds.save_new(&mut number(1)).unwrap();
    assert_eq!(receipt.failed.len(), 2);

    let pending = ds.pending_index_failures();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].write.index, PersonNumber::BY_NUMBER);
    assert_eq!(ds.metrics().snapshot().index_retries_dropped, 1);
}
