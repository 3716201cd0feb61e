//! Index writes and chain reads against a `HashStore`
//!
//! Primary indexes are overwritten on every save so the chain always holds
//! exactly the newest record id. Secondary and list indexes are appended
//! once, when the logical entity is created.

use thiserror::Error;

use crate::address::RecordId;
use crate::codec::Record;
use crate::store::{CallContext, HashStore, StoreError, StoreResult, TAIL_OFFSET};

use super::descriptor::{IndexKind, ValueSource};
use super::errors::{IndexError, IndexResult};
use super::key::{derive_for_record, IndexKey};
use super::value::IndexValue;

/// Which indexes a save touches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveMode {
    /// First version: every index whose condition holds
    New,
    /// Later version: primary indexes only
    Update,
    /// Record payload only
    RecordOnly,
}

/// How a planned entry is written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Replace the chain with the value
    Overwrite,
    /// Append the value to the chain
    Append,
}

/// One planned index entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexWrite {
    /// Owning structure
    pub structure_id: u64,
    /// Owning structure name
    pub structure: &'static str,
    /// Index name
    pub index: &'static str,
    /// Chain key
    pub key: IndexKey,
    /// Entry
    pub value: IndexValue,
    /// Overwrite or append
    pub mode: WriteMode,
}

/// An index entry that failed after its record was stored.
///
/// The record is durable; the entry is missing until replayed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}.{} write of {} failed: {error}", .write.structure, .write.index, .write.key)]
pub struct IndexWriteFailed {
    /// The entry that was not written
    pub write: IndexWrite,
    /// Store failure
    pub error: StoreError,
}

impl IndexWriteFailed {
    /// Chain key of the missing entry
    pub fn key(&self) -> &IndexKey {
        &self.write.key
    }

    /// Value of the missing entry
    pub fn value(&self) -> &IndexValue {
        &self.write.value
    }
}

/// Plans the index entries a save of `record` produces.
///
/// Entries follow declaration order. Conditional indexes whose condition does
/// not hold are skipped.
pub fn plan_writes<R: Record>(
    record: &R,
    record_id: &RecordId,
    mode: SaveMode,
) -> IndexResult<Vec<IndexWrite>> {
    let descriptor = R::descriptor();
    let mut writes = Vec::new();
    for spec in descriptor.indexes {
        let wanted = match mode {
            SaveMode::New => true,
            SaveMode::Update => spec.kind == IndexKind::Primary,
            SaveMode::RecordOnly => false,
        };
        if !wanted || !spec.applies_to(record) {
            continue;
        }

        let value = match spec.value {
            ValueSource::RecordId => IndexValue::from_record_id(record_id),
            ValueSource::Field(field) => {
                let raw = record.field(field);
                IndexValue::from_field(&raw).ok_or(IndexError::ValueTooWide {
                    index: spec.name,
                    width: raw.canonical_bytes().len(),
                })?
            }
        };
        writes.push(IndexWrite {
            structure_id: descriptor.id,
            structure: descriptor.name,
            index: spec.name,
            key: derive_for_record(record, spec)?,
            value,
            mode: if spec.is_overwrite() {
                WriteMode::Overwrite
            } else {
                WriteMode::Append
            },
        });
    }
    Ok(writes)
}

/// Thin typed layer over the store's chain operations
pub struct IndexWriter<'a, S: ?Sized> {
    store: &'a S,
}

impl<'a, S: HashStore + ?Sized> IndexWriter<'a, S> {
    /// Wraps a store handle.
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Points `key` at `record_id`, replacing whatever was there.
    pub fn set_primary(
        &self,
        ctx: &CallContext,
        key: &IndexKey,
        record_id: &RecordId,
    ) -> StoreResult<()> {
        self.store
            .set_index_value(ctx, key, &IndexValue::from_record_id(record_id))
    }

    /// Appends one entry to the chain under `key`.
    pub fn append(&self, ctx: &CallContext, key: &IndexKey, value: &IndexValue) -> StoreResult<()> {
        self.store.append_index_value(ctx, key, value)
    }

    /// Executes one planned entry.
    pub fn apply(&self, ctx: &CallContext, write: &IndexWrite) -> StoreResult<()> {
        match write.mode {
            WriteMode::Overwrite => self.store.set_index_value(ctx, &write.key, &write.value),
            WriteMode::Append => self.store.append_index_value(ctx, &write.key, &write.value),
        }
    }

    /// Page of the chain under `key`, in insertion order.
    pub fn read(
        &self,
        ctx: &CallContext,
        key: &IndexKey,
        offset: u64,
        limit: u64,
    ) -> StoreResult<Vec<IndexValue>> {
        self.store.get_index_values(ctx, key, offset, limit)
    }

    /// Newest entry under `key`, if the chain is non-empty.
    pub fn read_latest(
        &self,
        ctx: &CallContext,
        key: &IndexKey,
    ) -> StoreResult<Option<IndexValue>> {
        Ok(self.read(ctx, key, TAIL_OFFSET, 1)?.pop())
    }
}
