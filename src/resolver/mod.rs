//! Version resolution: from lookup values to the newest record
//!
//! A lookup walks a small state machine:
//!
//! ```text
//! LookupIndex -> ResolveRecordId -> FetchRecord -> ValidateStructure -> Done
//!      |               |                 |                |
//!      v               v                 v                v
//!   NotFound    LookupIndex (next)    NotFound     StructureMismatch
//! ```
//!
//! - `LookupIndex` reads the tail of the chain; an empty chain is not found.
//! - `ResolveRecordId` proceeds with a record id, or follows the index's
//!   `next` declaration with a field value as the selector.
//! - `FetchRecord` reads the payload; an absent record is not found.
//! - `ValidateStructure` compares the payload's structure id against the
//!   expected one before decoding anything else. A mismatch is logged at
//!   WARN and returned; it is never retried or repaired.
//!
//! Store errors end the walk and are returned as they are.

use crate::address::RecordId;
use crate::codec::{decode, peek_structure_id, FieldId, FieldValue, Record};
use crate::datastore::{DatastoreError, DatastoreResult};
use crate::index::{
    day_bucket, derive_key, IndexError, IndexKey, IndexSpec, IndexValue, IndexWriter, ValueSource,
    SECONDS_PER_DAY,
};
use crate::observability::{log_event, Event, MetricsRegistry};
use crate::store::{CallContext, HashStore};

/// Bounds on how far a lookup may walk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolveLimits {
    /// Day buckets a daily lookup inspects, the starting day included
    pub lookback_days: u32,
    /// Index hops a lookup may follow
    pub max_chain_depth: usize,
    /// Largest page `find` returns
    pub max_page_limit: u64,
}

impl Default for ResolveLimits {
    fn default() -> Self {
        Self {
            lookback_days: 91,
            max_chain_depth: 4,
            max_page_limit: 1000,
        }
    }
}

/// Position in a lookup walk
#[derive(Debug)]
enum ResolveState<F: 'static> {
    LookupIndex {
        spec: &'static IndexSpec<F>,
        key: IndexKey,
        depth: usize,
    },
    ResolveRecordId {
        spec: &'static IndexSpec<F>,
        key: IndexKey,
        value: IndexValue,
        depth: usize,
    },
    FetchRecord {
        record_id: RecordId,
        via: Option<(&'static str, IndexKey)>,
    },
    ValidateStructure {
        record_id: RecordId,
        via: Option<(&'static str, IndexKey)>,
        payload: Vec<u8>,
    },
}

/// Read side of the datastore over one store handle
pub struct Resolver<'a, S: ?Sized> {
    store: &'a S,
    metrics: &'a MetricsRegistry,
    limits: ResolveLimits,
}

impl<'a, S: HashStore + ?Sized> Resolver<'a, S> {
    pub fn new(store: &'a S, metrics: &'a MetricsRegistry, limits: ResolveLimits) -> Self {
        Self {
            store,
            metrics,
            limits,
        }
    }

    /// Fetches one exact version.
    pub fn get_by_record_id<R: Record>(
        &self,
        ctx: &CallContext,
        record_id: &RecordId,
    ) -> DatastoreResult<R> {
        self.metrics.increment_lookups();
        let state = ResolveState::FetchRecord {
            record_id: *record_id,
            via: None,
        };
        self.counted(self.run(ctx, state))
    }

    /// Newest version reachable through `index` for `lookup`, given in
    /// selector order.
    pub fn get_last<R: Record>(
        &self,
        ctx: &CallContext,
        index: &str,
        lookup: &[FieldValue<'_>],
    ) -> DatastoreResult<R> {
        self.metrics.increment_lookups();
        let spec = index_spec::<R>(index)?;
        let key = derive_key(R::descriptor().id, spec, lookup)?;
        let state = ResolveState::LookupIndex {
            spec,
            key,
            depth: 0,
        };
        self.counted(self.run(ctx, state))
    }

    /// Newest version through a daily index, walking back from the day of
    /// the lookup's timestamp.
    ///
    /// Only an empty bucket moves the walk to the previous day. A bucket that
    /// points at a missing or foreign record ends the walk with that outcome.
    pub fn get_last_daily<R: Record>(
        &self,
        ctx: &CallContext,
        index: &str,
        lookup: &[FieldValue<'_>],
    ) -> DatastoreResult<R> {
        self.metrics.increment_lookups();
        let descriptor = R::descriptor();
        let spec = index_spec::<R>(index)?;
        let pos = spec.daily_position().ok_or(IndexError::NotDaily(spec.name))?;
        let start = match lookup.get(pos) {
            Some(FieldValue::I64(ts)) => *ts,
            Some(_) => {
                return Err(IndexError::SelectorKind {
                    index: spec.name,
                    field: spec.selectors[pos].field().name(),
                }
                .into())
            }
            None => {
                return Err(IndexError::SelectorArity {
                    index: spec.name,
                    expected: spec.selectors.len(),
                    actual: lookup.len(),
                }
                .into())
            }
        };

        let writer = IndexWriter::new(self.store);
        let mut values = lookup.to_vec();
        for day in 0..i64::from(self.limits.lookback_days) {
            // An unrepresentable starting day is the caller's error, raised by
            // derive_key; running off the i64 range while walking back ends
            // the walk.
            let ts = match start.checked_sub(day * SECONDS_PER_DAY) {
                Some(ts) if day == 0 || day_bucket(ts).is_some() => ts,
                _ => break,
            };
            if day > 0 {
                self.metrics.increment_lookback_steps();
            }
            values[pos] = FieldValue::I64(ts);
            let key = derive_key(descriptor.id, spec, &values)?;
            if let Some(value) = writer.read_latest(ctx, &key)? {
                let state = ResolveState::ResolveRecordId {
                    spec,
                    key,
                    value,
                    depth: 0,
                };
                return self.counted(self.run(ctx, state));
            }
        }

        let days = self.limits.lookback_days.to_string();
        log_event(
            Event::LookbackExhausted,
            &[
                ("structure", descriptor.name),
                ("index", spec.name),
                ("days", days.as_str()),
            ],
        );
        self.counted(Err(DatastoreError::NotFound {
            structure: descriptor.name,
            index: Some(spec.name),
        }))
    }

    /// Raw page of the chain under `index` for `lookup`.
    ///
    /// `limit` is capped at the configured page limit; `offset = u64::MAX`
    /// selects the newest entries.
    pub fn find<R: Record>(
        &self,
        ctx: &CallContext,
        index: &str,
        lookup: &[FieldValue<'_>],
        offset: u64,
        limit: u64,
    ) -> DatastoreResult<Vec<IndexValue>> {
        self.metrics.increment_lookups();
        let spec = index_spec::<R>(index)?;
        let key = derive_key(R::descriptor().id, spec, lookup)?;
        let limit = limit.min(self.limits.max_page_limit);
        Ok(IndexWriter::new(self.store).read(ctx, &key, offset, limit)?)
    }

    fn run<R: Record>(
        &self,
        ctx: &CallContext,
        mut state: ResolveState<R::Field>,
    ) -> DatastoreResult<R> {
        let descriptor = R::descriptor();
        loop {
            state = match state {
                ResolveState::LookupIndex { spec, key, depth } => {
                    match IndexWriter::new(self.store).read_latest(ctx, &key)? {
                        Some(value) => ResolveState::ResolveRecordId {
                            spec,
                            key,
                            value,
                            depth,
                        },
                        None => {
                            return Err(DatastoreError::NotFound {
                                structure: descriptor.name,
                                index: Some(spec.name),
                            })
                        }
                    }
                }

                ResolveState::ResolveRecordId {
                    spec,
                    key,
                    value,
                    depth,
                } => match (spec.value, spec.next) {
                    (ValueSource::RecordId, _) => ResolveState::FetchRecord {
                        record_id: value.to_record_id(),
                        via: Some((spec.name, key)),
                    },
                    (ValueSource::Field(_), Some(next)) => {
                        if depth + 1 > self.limits.max_chain_depth {
                            return Err(DatastoreError::ChainTooDeep {
                                structure: descriptor.name,
                                index: spec.name,
                                depth: self.limits.max_chain_depth,
                            });
                        }
                        let next = index_spec::<R>(next)?;
                        let key = derive_key(
                            descriptor.id,
                            next,
                            &[FieldValue::Bytes(value.as_bytes())],
                        )?;
                        ResolveState::LookupIndex {
                            spec: next,
                            key,
                            depth: depth + 1,
                        }
                    }
                    (ValueSource::Field(_), None) => {
                        return Err(IndexError::Unresolvable(spec.name).into())
                    }
                },

                ResolveState::FetchRecord { record_id, via } => {
                    match self.store.get_record(ctx, &record_id, Some(descriptor.id))? {
                        Some(payload) => ResolveState::ValidateStructure {
                            record_id,
                            via,
                            payload,
                        },
                        None => {
                            return Err(DatastoreError::NotFound {
                                structure: descriptor.name,
                                index: via.map(|(name, _)| name),
                            })
                        }
                    }
                }

                ResolveState::ValidateStructure {
                    record_id,
                    via,
                    payload,
                } => {
                    let found = peek_structure_id(&payload)?;
                    if found != descriptor.id {
                        return Err(self.mismatch(
                            descriptor.name,
                            descriptor.id,
                            found,
                            record_id,
                            via,
                        ));
                    }
                    let record = decode::<R>(&payload)?;
                    self.metrics.increment_records_read();
                    return Ok(record);
                }
            };
        }
    }

    fn mismatch(
        &self,
        structure: &'static str,
        expected: u64,
        found: u64,
        record_id: RecordId,
        via: Option<(&'static str, IndexKey)>,
    ) -> DatastoreError {
        self.metrics.increment_structure_mismatches();

        let expected_s = expected.to_string();
        let found_s = found.to_string();
        let record_s = record_id.to_hex();
        let key_s = via.map(|(_, key)| key.to_hex()).unwrap_or_default();
        log_event(
            Event::StructureMismatch,
            &[
                ("structure", structure),
                ("expected", expected_s.as_str()),
                ("found", found_s.as_str()),
                ("record_id", record_s.as_str()),
                ("index", via.map(|(name, _)| name).unwrap_or("")),
                ("key", key_s.as_str()),
            ],
        );

        DatastoreError::StructureMismatch {
            structure,
            expected,
            found,
            record_id,
            index_key: via.map(|(_, key)| key),
        }
    }

    fn counted<T>(&self, result: DatastoreResult<T>) -> DatastoreResult<T> {
        if matches!(result, Err(DatastoreError::NotFound { .. })) {
            self.metrics.increment_not_found();
        }
        result
    }
}

/// Declared index of `R` by name
pub(crate) fn index_spec<R: Record>(name: &str) -> DatastoreResult<&'static IndexSpec<R::Field>> {
    let descriptor = R::descriptor();
    descriptor.index(name).ok_or_else(|| {
        IndexError::UnknownIndex {
            structure: descriptor.name,
            index: name.to_string(),
        }
        .into()
    })
}
