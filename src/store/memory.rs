//! In-process `HashStore`
//!
//! Thread-safe maps behind `RwLock`s, plus fault injection so callers can
//! exercise outage and partial-write paths without a cluster.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{PoisonError, RwLock};

use crate::address::RecordId;
use crate::index::{IndexKey, IndexValue};

use super::{select_page, CallContext, HashStore, StoreError, StoreResult};

#[derive(Debug, Clone)]
struct StoredRecord {
    structure_id: u64,
    payload: Vec<u8>,
}

/// In-memory store
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<RecordId, StoredRecord>>,
    chains: RwLock<HashMap<IndexKey, Vec<IndexValue>>>,
    offline: AtomicBool,
    failing_index_writes: AtomicUsize,
}

impl MemoryStore {
    /// Empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// While offline every call fails with `Unavailable`.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// The next `n` index writes fail with `Unavailable`; record writes are
    /// unaffected.
    pub fn fail_next_index_writes(&self, n: usize) {
        self.failing_index_writes.store(n, Ordering::SeqCst);
    }

    /// Number of stored records
    pub fn record_count(&self) -> usize {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Structure id a record was stored under
    pub fn stored_structure_id(&self, record_id: &RecordId) -> Option<u64> {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(record_id)
            .map(|r| r.structure_id)
    }

    /// Full chain under `key`, in insertion order
    pub fn chain(&self, key: &IndexKey) -> Vec<IndexValue> {
        self.chains
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
            .unwrap_or_default()
    }

    /// Overwrites a stored payload in place, bypassing addressing.
    pub fn corrupt_record(&self, record_id: &RecordId, payload: Vec<u8>) {
        let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(record) = records.get_mut(record_id) {
            record.payload = payload;
        }
    }

    fn admit(&self, ctx: &CallContext) -> StoreResult<()> {
        ctx.check()?;
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store offline".into()));
        }
        Ok(())
    }

    fn admit_index_write(&self, ctx: &CallContext) -> StoreResult<()> {
        self.admit(ctx)?;
        let injected = self
            .failing_index_writes
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if injected {
            return Err(StoreError::Unavailable("injected index write failure".into()));
        }
        Ok(())
    }
}

impl HashStore for MemoryStore {
    fn set_record(
        &self,
        ctx: &CallContext,
        record_id: &RecordId,
        structure_id: u64,
        payload: &[u8],
    ) -> StoreResult<()> {
        self.admit(ctx)?;
        self.records
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(
                *record_id,
                StoredRecord {
                    structure_id,
                    payload: payload.to_vec(),
                },
            );
        Ok(())
    }

    fn get_record(
        &self,
        ctx: &CallContext,
        record_id: &RecordId,
        _expected_structure_id: Option<u64>,
    ) -> StoreResult<Option<Vec<u8>>> {
        self.admit(ctx)?;
        Ok(self
            .records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(record_id)
            .map(|r| r.payload.clone()))
    }

    fn set_index_value(
        &self,
        ctx: &CallContext,
        key: &IndexKey,
        value: &IndexValue,
    ) -> StoreResult<()> {
        self.admit_index_write(ctx)?;
        self.chains
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(*key, vec![*value]);
        Ok(())
    }

    fn append_index_value(
        &self,
        ctx: &CallContext,
        key: &IndexKey,
        value: &IndexValue,
    ) -> StoreResult<()> {
        self.admit_index_write(ctx)?;
        self.chains
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(*key)
            .or_default()
            .push(*value);
        Ok(())
    }

    fn get_index_values(
        &self,
        ctx: &CallContext,
        key: &IndexKey,
        offset: u64,
        limit: u64,
    ) -> StoreResult<Vec<IndexValue>> {
        self.admit(ctx)?;
        let chains = self.chains.read().unwrap_or_else(PoisonError::into_inner);
        Ok(chains
            .get(key)
            .map(|chain| select_page(chain, offset, limit).to_vec())
            .unwrap_or_default())
    }
}
