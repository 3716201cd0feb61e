//! Broadcast hash-map store boundary
//!
//! The store keeps opaque record payloads by record id and ordered value
//! chains by index key. It knows nothing about schemas, indexes or versions.
//!
//! # Chain reads
//!
//! `get_index_values(key, offset, limit)` returns values in insertion order:
//!
//! - `offset < len`: entries `[offset, offset + limit)`, clipped to the end
//! - `offset >= len` (conventionally [`TAIL_OFFSET`]): the last `limit` entries
//! - `limit == 0`: nothing
//!
//! Use [`select_page`] to get these semantics right in an implementation.

mod context;
mod errors;
mod memory;

pub use context::{CallContext, CancelFlag};
pub use errors::{StoreError, StoreResult};
pub use memory::MemoryStore;

use crate::address::RecordId;
use crate::index::{IndexKey, IndexValue};

/// Offset that selects the tail of a chain
pub const TAIL_OFFSET: u64 = u64::MAX;

/// Key/value store the datastore is built on.
///
/// Implementations must honour the `CallContext` of every call.
pub trait HashStore: Send + Sync {
    /// Stores a record payload under its id.
    fn set_record(
        &self,
        ctx: &CallContext,
        record_id: &RecordId,
        structure_id: u64,
        payload: &[u8],
    ) -> StoreResult<()>;

    /// Fetches a record payload. Absence is `Ok(None)`.
    ///
    /// `expected_structure_id` is a routing hint only; the payload is returned
    /// whatever structure it belongs to.
    fn get_record(
        &self,
        ctx: &CallContext,
        record_id: &RecordId,
        expected_structure_id: Option<u64>,
    ) -> StoreResult<Option<Vec<u8>>>;

    /// Replaces the whole chain under `key` with `[value]`.
    fn set_index_value(&self, ctx: &CallContext, key: &IndexKey, value: &IndexValue)
        -> StoreResult<()>;

    /// Appends `value` to the chain under `key`.
    fn append_index_value(
        &self,
        ctx: &CallContext,
        key: &IndexKey,
        value: &IndexValue,
    ) -> StoreResult<()>;

    /// Reads a page of the chain under `key`. A missing key is an empty chain.
    fn get_index_values(
        &self,
        ctx: &CallContext,
        key: &IndexKey,
        offset: u64,
        limit: u64,
    ) -> StoreResult<Vec<IndexValue>>;
}

/// Applies chain-read paging semantics to an in-order slice.
pub fn select_page<T>(entries: &[T], offset: u64, limit: u64) -> &[T] {
    let len = entries.len();
    let limit = usize::try_from(limit).unwrap_or(usize::MAX);
    if limit == 0 {
        return &[];
    }
    match usize::try_from(offset) {
        Ok(start) if start < len => {
            let end = start.saturating_add(limit).min(len);
            &entries[start..end]
        }
        _ => &entries[len.saturating_sub(limit)..],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_from_start() {
        assert_eq!(select_page(&[1, 2, 3], 0, 3), &[1, 2, 3]);
        assert_eq!(select_page(&[1, 2, 3], 1, 1), &[2]);
    }

    #[test]
    fn test_page_clipped_at_end() {
        assert_eq!(select_page(&[1, 2, 3], 2, 10), &[3]);
    }

    #[test]
    fn test_tail_offset_selects_last_entries() {
        assert_eq!(select_page(&[1, 2, 3], TAIL_OFFSET, 1), &[3]);
        assert_eq!(select_page(&[1, 2, 3], TAIL_OFFSET, 2), &[2, 3]);
        assert_eq!(select_page(&[1, 2, 3], 3, 5), &[1, 2, 3]);
    }

    #[test]
    fn test_zero_limit_is_empty() {
        assert!(select_page(&[1, 2, 3], 0, 0).is_empty());
        assert!(select_page(&[1, 2, 3], TAIL_OFFSET, 0).is_empty());
    }

    #[test]
    fn test_empty_chain() {
        let empty: [u8; 0] = [];
        assert!(select_page(&empty, TAIL_OFFSET, 1).is_empty());
        assert!(select_page(&empty, 0, 1).is_empty());
    }
}
