//! Daily Bucket Tests
//!
//! - Keys change exactly at UTC midnight
//! - The newest transaction is found by walking back one day at a time
//! - The walk stops after the configured number of buckets

use std::sync::Arc;

use hashindex::index::{day_bucket, derive_key};
use hashindex::structures::{register_all, FinancialTransaction, TransactionType};
use hashindex::{
    AppIdentity, CatalogBuilder, Datastore, DatastoreConfig, FieldValue, FixedClock, MemoryStore,
    Record,
};

// =============================================================================
// Helper Functions
// =============================================================================

const USER: [u8; 32] = [0x44; 32];
const DAY: i64 = 86_400;
/// 2020-09-13T00:00:00Z
const MIDNIGHT: i64 = 1_599_955_200;

fn datastore(clock: Arc<FixedClock>, lookback_days: u32) -> Datastore<MemoryStore> {
    let catalog = register_all(CatalogBuilder::new()).unwrap().build();
    let mut config = DatastoreConfig::for_identity(&AppIdentity::new([1; 32], [2; 32]));
    config.lookback_days = lookback_days;
    Datastore::new(Arc::new(MemoryStore::new()), Arc::new(catalog), config)
        .unwrap()
        .with_clock(clock)
}

fn transaction(amount: i64, balance: i64) -> FinancialTransaction {
    FinancialTransaction {
        user_id: USER,
        reference_type: TransactionType::BankTransfer,
        amount,
        balance,
        ..FinancialTransaction::default()
    }
}

fn latest(
    ds: &Datastore<MemoryStore>,
    at: i64,
) -> hashindex::DatastoreResult<FinancialTransaction> {
    ds.get_last_daily(
        FinancialTransaction::BY_USER_DAILY,
        &[FieldValue::Bytes(&USER), FieldValue::I64(at)],
    )
}

// =============================================================================
// Bucket Boundaries
// =============================================================================

/// One second before midnight and midnight are different buckets.
#[test]
fn test_midnight_boundary() {
    assert_eq!(day_bucket(MIDNIGHT - 1), Some(MIDNIGHT - DAY));
    assert_eq!(day_bucket(MIDNIGHT), Some(MIDNIGHT));
    assert_eq!(day_bucket(MIDNIGHT + DAY - 1), Some(MIDNIGHT));
    assert_eq!(day_bucket(-1), Some(-DAY));

    let descriptor = FinancialTransaction::descriptor();
    let spec = descriptor.index(FinancialTransaction::BY_USER_DAILY).unwrap();
    let key = |ts: i64| {
        derive_key(descriptor.id, spec, &[FieldValue::Bytes(&USER), FieldValue::I64(ts)]).unwrap()
    };
    assert_eq!(key(MIDNIGHT), key(MIDNIGHT + DAY - 1));
    assert_ne!(key(MIDNIGHT - 1), key(MIDNIGHT));
}

/// Within a day the primary bucket holds the newest transaction.
#[test]
fn test_same_day_overwrites() {
    let clock = Arc::new(FixedClock::new(MIDNIGHT + 100));
    let ds = datastore(clock.clone(), 91);

    ds.save_new(&mut transaction(500, 500)).unwrap();
    clock.advance(3_600);
    let second = ds.save_new(&mut transaction(-200, 300)).unwrap();

    let found = latest(&ds, MIDNIGHT + DAY - 1).unwrap();
    assert_eq!(found.header.record_id, second.record_id);
    assert_eq!(found.balance, 300);
    assert_eq!(ds.metrics().snapshot().lookback_steps, 0);
}

// =============================================================================
// Lookback
// =============================================================================

/// A transaction from days ago is found by walking back.
#[test]
fn test_walks_back_to_last_active_day() {
    let clock = Arc::new(FixedClock::new(MIDNIGHT + 10));
    let ds = datastore(clock.clone(), 91);
    let saved = ds.save_new(&mut transaction(1_000, 1_000)).unwrap();

    clock.advance(5 * DAY);
    let found = latest(&ds, ds.now()).unwrap();
    assert_eq!(found.header.record_id, saved.record_id);
    assert_eq!(ds.metrics().snapshot().lookback_steps, 5);
}

/// The newest day wins over older days.
#[test]
fn test_newest_day_wins() {
    let clock = Arc::new(FixedClock::new(MIDNIGHT));
    let ds = datastore(clock.clone(), 91);
    ds.save_new(&mut transaction(1_000, 1_000)).unwrap();
    clock.advance(2 * DAY);
    let newer = ds.save_new(&mut transaction(-1, 999)).unwrap();
    clock.advance(2 * DAY);

    let found = latest(&ds, ds.now()).unwrap();
    assert_eq!(found.header.record_id, newer.record_id);
}

/// Nothing within the window is not found, after exactly the window.
#[test]
fn test_lookback_window_bounded() {
    let clock = Arc::new(FixedClock::new(MIDNIGHT));
    let ds = datastore(clock.clone(), 3);
    ds.save_new(&mut transaction(1, 1)).unwrap();

    // Day 0, 1, 2 inspected: found on day 2
    clock.advance(2 * DAY);
    assert!(latest(&ds, ds.now()).is_ok());

    // Day 0, 1, 2 inspected: the transaction is on day 3
    clock.advance(DAY);
    let err = latest(&ds, ds.now()).unwrap_err();
    assert!(err.is_not_found());
}

/// Daily lookups need a daily index and a timestamp.
#[test]
fn test_daily_lookup_validation() {
    let ds = datastore(Arc::new(FixedClock::new(MIDNIGHT)), 91);

    let err = ds
        .get_last_daily::<FinancialTransaction>(
            FinancialTransaction::BY_USER_DAILY,
            &[FieldValue::Bytes(&USER), FieldValue::U64(MIDNIGHT as u64)],
        )
        .unwrap_err();
    assert_eq!(err.code(), "HX_INDEX_SELECTOR_KIND");

    let err = ds
        .get_last_daily::<FinancialTransaction>(
            FinancialTransaction::BY_USER_DAILY,
            &[FieldValue::Bytes(&USER)],
        )
        .unwrap_err();
    assert_eq!(err.code(), "HX_INDEX_SELECTOR_ARITY");
}

/// A store outage ends the walk instead of being read as an empty day.
#[test]
fn test_store_error_stops_walk() {
    let ds = datastore(Arc::new(FixedClock::new(MIDNIGHT)), 91);
    ds.store().set_offline(true);
    let err = latest(&ds, MIDNIGHT).unwrap_err();
    assert_eq!(err.code(), "HX_STORE_UNAVAILABLE");
    assert_eq!(ds.metrics().snapshot().lookback_steps, 0);
}

// =============================================================================
// Range Edges
// =============================================================================

/// A timestamp whose day start is below i64::MIN is rejected, not wrapped.
#[test]
fn test_unrepresentable_day_rejected() {
    let ds = datastore(Arc::new(FixedClock::new(MIDNIGHT)), 91);
    let lookup = [FieldValue::Bytes(&USER), FieldValue::I64(i64::MIN + 5)];

    let err = latest(&ds, i64::MIN + 5).unwrap_err();
    assert_eq!(err.code(), "HX_INDEX_TIMESTAMP_RANGE");

    let err = ds
        .get_last::<FinancialTransaction>(FinancialTransaction::BY_USER_DAILY, &lookup)
        .unwrap_err();
    assert_eq!(err.code(), "HX_INDEX_TIMESTAMP_RANGE");

    let err = ds
        .find::<FinancialTransaction>(FinancialTransaction::BY_USER_DAILY, &lookup, 0, 10)
        .unwrap_err();
    assert_eq!(err.code(), "HX_INDEX_TIMESTAMP_RANGE");
}

/// Walking back off the start of the i64 range ends the walk.
#[test]
fn test_walk_stops_at_range_start() {
    let ds = datastore(Arc::new(FixedClock::new(MIDNIGHT)), 91);
    let first_day = (i64::MIN / DAY) * DAY;

    let err = latest(&ds, first_day + 10).unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(ds.metrics().snapshot().lookback_steps, 0);
}
