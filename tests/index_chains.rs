//! Index Chain Tests
//!
//! - Append-only chains keep insertion order
//! - Tail reads return the newest entries
//! - Conditional indexes are absent when their condition fails
//! - Paired and list indexes resolve through the primary chain

use std::sync::Arc;

use hashindex::index::{derive_key, IndexValue};
use hashindex::store::TAIL_OFFSET;
use hashindex::structures::{
    register_all, ConnectionStatus, UserAppConnection, Wiki, WikiStatus,
};
use hashindex::{
    AppIdentity, CatalogBuilder, Datastore, DatastoreConfig, FieldValue, FixedClock, MemoryStore,
    Record,
};

// =============================================================================
// Helper Functions
// =============================================================================

const USER: [u8; 32] = [0x11; 32];
const THING: [u8; 32] = [0x22; 32];
const DELEGATE: [u8; 32] = [0x33; 32];

fn datastore() -> Datastore<MemoryStore> {
    let catalog = register_all(CatalogBuilder::new()).unwrap().build();
    let config = DatastoreConfig::for_identity(&AppIdentity::new([1; 32], [2; 32]));
    Datastore::new(Arc::new(MemoryStore::new()), Arc::new(catalog), config)
        .unwrap()
        .with_clock(Arc::new(FixedClock::new(1_600_000_000)))
}

fn connection(id: u8) -> UserAppConnection {
    UserAppConnection {
        status: ConnectionStatus::Issued,
        description: format!("device {id}"),
        id: [id; 32],
        thing_id: THING,
        user_id: USER,
        ..UserAppConnection::default()
    }
}

fn delegated(id: u8) -> UserAppConnection {
    UserAppConnection {
        thing_id: [0; 32],
        delegate_user_id: DELEGATE,
        ..connection(id)
    }
}

fn key_of<R: Record>(index: &str, lookup: &[FieldValue<'_>]) -> hashindex::IndexKey {
    let descriptor = R::descriptor();
    derive_key(descriptor.id, descriptor.index(index).unwrap(), lookup).unwrap()
}

// =============================================================================
// Ordering
// =============================================================================

/// Appended values come back in insertion order; the tail is the newest.
#[test]
fn test_append_order_and_tail() {
    let ds = datastore();
    for id in 1..=3 {
        ds.save_new(&mut connection(id)).unwrap();
    }

    let lookup = [FieldValue::Bytes(&THING)];
    let all = ds
        .find::<UserAppConnection>(UserAppConnection::BY_THING_ID, &lookup, 0, 3)
        .unwrap();
    assert_eq!(
        all,
        vec![
            IndexValue::from_bytes([1; 32]),
            IndexValue::from_bytes([2; 32]),
            IndexValue::from_bytes([3; 32]),
        ]
    );

    let tail = ds
        .find::<UserAppConnection>(UserAppConnection::BY_THING_ID, &lookup, TAIL_OFFSET, 1)
        .unwrap();
    assert_eq!(tail, vec![IndexValue::from_bytes([3; 32])]);

    let none = ds
        .find::<UserAppConnection>(UserAppConnection::BY_THING_ID, &lookup, 0, 0)
        .unwrap();
    assert!(none.is_empty());
}

/// Secondary lookups resolve to the newest connection on the chain.
#[test]
fn test_secondary_resolves_newest() {
    let ds = datastore();
    ds.save_new(&mut connection(1)).unwrap();
    ds.save_new(&mut connection(2)).unwrap();

    let latest: UserAppConnection = ds
        .get_last(UserAppConnection::BY_THING_ID, &[FieldValue::Bytes(&THING)])
        .unwrap();
    assert_eq!(latest.id, [2; 32]);
    assert_eq!(latest.description, "device 2");
}

// =============================================================================
// Conditional Indexes
// =============================================================================

/// A direct connection is indexed by user, not by delegate.
#[test]
fn test_direct_connection_has_no_delegate_entries() {
    let ds = datastore();
    let receipt = ds.save_new(&mut connection(1)).unwrap();
    assert_eq!(receipt.indexes_written, 7);

    let store = ds.store();
    let by_delegate = key_of::<UserAppConnection>(
        UserAppConnection::BY_DELEGATE_USER_ID,
        &[FieldValue::Bytes(&[0; 32])],
    );
    assert!(store.chain(&by_delegate).is_empty());

    let by_user =
        key_of::<UserAppConnection>(UserAppConnection::BY_USER_ID, &[FieldValue::Bytes(&USER)]);
    assert_eq!(store.chain(&by_user), vec![IndexValue::from_bytes([1; 32])]);
}

/// A delegated connection is hidden from the plain user index.
#[test]
fn test_delegated_connection_skips_user_index() {
    let ds = datastore();
    ds.save_new(&mut delegated(4)).unwrap();

    let err = ds
        .get_last::<UserAppConnection>(UserAppConnection::BY_USER_ID, &[FieldValue::Bytes(&USER)])
        .unwrap_err();
    assert!(err.is_not_found());

    let via_delegate: UserAppConnection = ds
        .get_last(
            UserAppConnection::BY_DELEGATE_USER_ID,
            &[FieldValue::Bytes(&DELEGATE)],
        )
        .unwrap();
    assert_eq!(via_delegate.id, [4; 32]);

    let via_owner: UserAppConnection = ds
        .get_last(
            UserAppConnection::BY_USER_ID_IF_DELEGATED,
            &[FieldValue::Bytes(&USER)],
        )
        .unwrap();
    assert_eq!(via_owner.id, [4; 32]);
}

// =============================================================================
// Paired And List Indexes
// =============================================================================

/// Paired keys depend on both values and their order.
#[test]
fn test_paired_lookup() {
    let ds = datastore();
    ds.save_new(&mut connection(1)).unwrap();

    let found: UserAppConnection = ds
        .get_last(
            UserAppConnection::BY_USER_ID_THING_ID,
            &[FieldValue::Bytes(&USER), FieldValue::Bytes(&THING)],
        )
        .unwrap();
    assert_eq!(found.id, [1; 32]);

    let swapped = ds.get_last::<UserAppConnection>(
        UserAppConnection::BY_USER_ID_THING_ID,
        &[FieldValue::Bytes(&THING), FieldValue::Bytes(&USER)],
    );
    assert!(swapped.unwrap_err().is_not_found());
}

/// Same selector bytes under different literals are different chains.
#[test]
fn test_literal_separates_lists() {
    let ds = datastore();
    ds.save_new(&mut connection(1)).unwrap();
    ds.save_new(&mut delegated(2)).unwrap();

    let things = ds
        .find::<UserAppConnection>(
            UserAppConnection::LIST_THING_ID,
            &[FieldValue::Bytes(&USER)],
            0,
            10,
        )
        .unwrap();
    let delegates = ds
        .find::<UserAppConnection>(
            UserAppConnection::LIST_DELEGATE_USER_ID,
            &[FieldValue::Bytes(&USER)],
            0,
            10,
        )
        .unwrap();
    assert_eq!(things, vec![IndexValue::from_bytes(THING)]);
    assert_eq!(delegates, vec![IndexValue::from_bytes(DELEGATE)]);
}

/// Wiki languages list holds u32 values, padded.
#[test]
fn test_wiki_languages_list() {
    let ds = datastore();
    for language in [1u32, 7] {
        let mut wiki = Wiki {
            id: [9; 32],
            owner_id: USER,
            language,
            title: "Hash map".into(),
            status: WikiStatus::Active,
            ..Wiki::default()
        };
        ds.save_new(&mut wiki).unwrap();
    }

    let languages: Vec<u32> = ds
        .find::<Wiki>(Wiki::LIST_LANGUAGES, &[FieldValue::Bytes(&[9; 32])], 0, 10)
        .unwrap()
        .iter()
        .map(|v| u32::from_le_bytes(v.leading()))
        .collect();
    assert_eq!(languages, vec![1, 7]);

    let farsi: Wiki = ds
        .get_last(
            Wiki::BY_ID_LANGUAGE,
            &[FieldValue::Bytes(&[9; 32]), FieldValue::U32(7)],
        )
        .unwrap();
    assert_eq!(farsi.language, 7);

    let titled = ds
        .find::<Wiki>(Wiki::LIST_BY_TITLE, &[FieldValue::Str("Hash map")], 0, 10)
        .unwrap();
    assert_eq!(titled.len(), 2);
}

/// Lookup values must match the selected field kinds.
#[test]
fn test_lookup_kind_checked() {
    let ds = datastore();
    let err = ds
        .get_last::<Wiki>(
            Wiki::BY_ID_LANGUAGE,
            &[FieldValue::Bytes(&[9; 32]), FieldValue::U64(7)],
        )
        .unwrap_err();
    assert_eq!(err.code(), "HX_INDEX_SELECTOR_KIND");
}
