//! Datastore façade
//!
//! Ties the pieces together for callers: a save encodes, addresses and
//! stores a record, then writes its index entries; a read resolves lookup
//! values to the newest record through the index chains.
//!
//! Everything the façade needs is handed to it at construction: the store
//! handle, the structure catalog, the writer identity, the clock and the
//! configuration.
//!
//! # Save modes
//!
//! | call          | record | primary indexes | other indexes |
//! |---------------|--------|-----------------|---------------|
//! | `set`         | yes    | no              | no            |
//! | `save_update` | yes    | yes             | no            |
//! | `save_new`    | yes    | yes             | yes           |
//!
//! # Call contexts
//!
//! Every operation has a `*_with_ctx` form taking the caller's
//! [`CallContext`], whose deadline and cancellation flag reach every store
//! call the operation makes. The plain forms use [`Datastore::call_context`],
//! which carries the configured `request_timeout_ms`.
//!
//! A record write and its index writes are not atomic. When an index write
//! fails after the record landed, the save still succeeds: the failure is
//! listed in the [`WriteReceipt`] and queued for
//! [`Datastore::retry_failed_indexes`].

mod errors;

pub use errors::{DatastoreError, DatastoreResult};

use std::sync::Arc;

use crate::address::{stamp, RecordId};
use crate::catalog::StructureCatalog;
use crate::clock::{Clock, SystemClock};
use crate::codec::{encode, FieldValue, Record};
use crate::config::DatastoreConfig;
use crate::identity::AppIdentity;
use crate::index::{
    plan_writes, IndexValue, IndexWrite, IndexWriteFailed, IndexWriter, RetryQueue, RetryReport,
    SaveMode, WriteMode,
};
use crate::observability::{log_event, Event, MetricsRegistry};
use crate::resolver::{ResolveLimits, Resolver};
use crate::store::{CallContext, HashStore, StoreError};

/// Outcome of a save
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteReceipt {
    /// Id of the stored version
    pub record_id: RecordId,
    /// Index entries written
    pub indexes_written: usize,
    /// Index entries that failed and were queued for replay
    pub failed: Vec<IndexWriteFailed>,
}

impl WriteReceipt {
    /// True when every planned index entry was written
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Typed record storage over a `HashStore`
pub struct Datastore<S: HashStore> {
    store: Arc<S>,
    catalog: Arc<StructureCatalog>,
    identity: AppIdentity,
    clock: Arc<dyn Clock>,
    config: DatastoreConfig,
    retry_queue: RetryQueue,
    metrics: Arc<MetricsRegistry>,
}

impl<S: HashStore> Datastore<S> {
    /// Builds a datastore on the system clock.
    ///
    /// Validates `config`, decodes the writer identity from it and sets the
    /// process log threshold to its `log_level`.
    pub fn new(
        store: Arc<S>,
        catalog: Arc<StructureCatalog>,
        config: DatastoreConfig,
    ) -> DatastoreResult<Self> {
        config.validate()?;
        let identity = config.identity()?;
        config.apply_logging()?;
        Ok(Self {
            store,
            catalog,
            identity,
            clock: Arc::new(SystemClock),
            retry_queue: RetryQueue::new(config.retry_queue_capacity),
            config,
            metrics: Arc::new(MetricsRegistry::new()),
        })
    }

    /// Replaces the clock.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Shares a metrics registry with other components.
    pub fn with_metrics(mut self, metrics: Arc<MetricsRegistry>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn catalog(&self) -> &StructureCatalog {
        &self.catalog
    }

    pub fn identity(&self) -> &AppIdentity {
        &self.identity
    }

    pub fn config(&self) -> &DatastoreConfig {
        &self.config
    }

    pub fn metrics(&self) -> &MetricsRegistry {
        &self.metrics
    }

    /// Current time of the injected clock, unix seconds
    pub fn now(&self) -> i64 {
        self.clock.now_unix()
    }

    /// Context for one operation, carrying the configured deadline. Used by
    /// every operation not given a context of its own.
    pub fn call_context(&self) -> CallContext {
        match self.config.request_timeout() {
            Some(timeout) => CallContext::with_timeout(timeout),
            None => CallContext::background(),
        }
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Writes the record only.
    pub fn set<R: Record>(&self, record: &mut R) -> DatastoreResult<WriteReceipt> {
        self.set_with_ctx(&self.call_context(), record)
    }

    pub fn set_with_ctx<R: Record>(
        &self,
        ctx: &CallContext,
        record: &mut R,
    ) -> DatastoreResult<WriteReceipt> {
        self.save(ctx, record, SaveMode::RecordOnly)
    }

    /// Writes the first version of a logical entity and all of its indexes.
    pub fn save_new<R: Record>(&self, record: &mut R) -> DatastoreResult<WriteReceipt> {
        self.save_new_with_ctx(&self.call_context(), record)
    }

    pub fn save_new_with_ctx<R: Record>(
        &self,
        ctx: &CallContext,
        record: &mut R,
    ) -> DatastoreResult<WriteReceipt> {
        self.save(ctx, record, SaveMode::New)
    }

    /// Writes a later version and moves the primary indexes to it.
    pub fn save_update<R: Record>(&self, record: &mut R) -> DatastoreResult<WriteReceipt> {
        self.save_update_with_ctx(&self.call_context(), record)
    }

    pub fn save_update_with_ctx<R: Record>(
        &self,
        ctx: &CallContext,
        record: &mut R,
    ) -> DatastoreResult<WriteReceipt> {
        self.save(ctx, record, SaveMode::Update)
    }

    /// Stamps the header, stores the record, then writes planned indexes.
    ///
    /// On return `record.header()` holds the id, size, write time and
    /// identity of the stored version.
    fn save<R: Record>(
        &self,
        ctx: &CallContext,
        record: &mut R,
        mode: SaveMode,
    ) -> DatastoreResult<WriteReceipt> {
        self.catalog.ensure_registered::<R>()?;
        let descriptor = R::descriptor();

        let header = record.header_mut();
        header.structure_id = descriptor.id;
        header.write_time = self.clock.now_unix();
        self.identity.stamp(header);

        let mut buf = encode(record)?;
        let record_id = stamp(&mut buf)?;
        let header = record.header_mut();
        header.record_id = record_id;
        header.size = buf.len() as u64;

        // Planned before anything is stored, so a bad declaration fails the
        // save without leaving a record behind.
        let writes = plan_writes(record, &record_id, mode)?;

        let id_hex = record_id.to_hex();
        if let Err(err) = self.store.set_record(ctx, &record_id, descriptor.id, &buf) {
            log_event(
                Event::RecordWriteFailed,
                &[
                    ("structure", descriptor.name),
                    ("record_id", id_hex.as_str()),
                    ("code", err.code()),
                    ("error", err.to_string().as_str()),
                ],
            );
            return Err(err.into());
        }
        self.metrics.record_written(buf.len() as u64);
        let size = buf.len().to_string();
        log_event(
            Event::RecordWritten,
            &[
                ("structure", descriptor.name),
                ("record_id", id_hex.as_str()),
                ("size", size.as_str()),
            ],
        );

        let writer = IndexWriter::new(&*self.store);
        let mut receipt = WriteReceipt {
            record_id,
            indexes_written: 0,
            failed: Vec::new(),
        };
        for write in writes {
            match writer.apply(ctx, &write) {
                Ok(()) => {
                    self.index_written(&write);
                    receipt.indexes_written += 1;
                }
                Err(error) => receipt.failed.push(self.index_failed(write, error)),
            }
        }
        Ok(receipt)
    }

    fn index_written(&self, write: &IndexWrite) {
        self.metrics.increment_index_writes();
        if write.mode == WriteMode::Overwrite {
            self.retry_queue.supersede(&write.key);
        }
        let key = write.key.to_hex();
        log_event(
            Event::IndexWritten,
            &[
                ("structure", write.structure),
                ("index", write.index),
                ("key", key.as_str()),
            ],
        );
    }

    fn index_failed(&self, write: IndexWrite, error: StoreError) -> IndexWriteFailed {
        self.metrics.increment_index_write_failures();
        let key = write.key.to_hex();
        let value = write.value.to_hex();
        log_event(
            Event::IndexWriteFailed,
            &[
                ("structure", write.structure),
                ("index", write.index),
                ("key", key.as_str()),
                ("value", value.as_str()),
                ("code", error.code()),
            ],
        );

        let failed = IndexWriteFailed { write, error };
        if self.retry_queue.push(failed.clone()).is_some() {
            self.metrics.increment_index_retries_dropped();
        }
        failed
    }

    /// Replays queued index writes once, oldest first.
    ///
    /// Entries that fail again go back on the queue.
    pub fn retry_failed_indexes(&self) -> RetryReport {
        self.retry_failed_indexes_with_ctx(&self.call_context())
    }

    pub fn retry_failed_indexes_with_ctx(&self, ctx: &CallContext) -> RetryReport {
        let pending = self.retry_queue.drain();
        let mut report = RetryReport::default();
        if pending.is_empty() {
            return report;
        }

        let writer = IndexWriter::new(&*self.store);
        for failed in pending {
            report.attempted += 1;
            self.metrics.increment_index_retries();
            match writer.apply(ctx, &failed.write) {
                Ok(()) => {
                    self.index_written(&failed.write);
                    report.succeeded += 1;
                }
                Err(error) => {
                    self.index_failed(failed.write, error);
                    report.requeued += 1;
                }
            }
        }

        let attempted = report.attempted.to_string();
        let succeeded = report.succeeded.to_string();
        let requeued = report.requeued.to_string();
        log_event(
            Event::IndexRetried,
            &[
                ("attempted", attempted.as_str()),
                ("succeeded", succeeded.as_str()),
                ("requeued", requeued.as_str()),
            ],
        );
        report
    }

    /// Index writes waiting for replay, oldest first
    pub fn pending_index_failures(&self) -> Vec<IndexWriteFailed> {
        self.retry_queue.pending()
    }

    // =========================================================================
    // Reads
    // =========================================================================

    fn resolver(&self) -> Resolver<'_, S> {
        Resolver::new(
            &*self.store,
            &self.metrics,
            ResolveLimits {
                lookback_days: self.config.lookback_days,
                max_chain_depth: self.config.max_chain_depth,
                max_page_limit: self.config.max_page_limit,
            },
        )
    }

    /// Reads one exact version.
    pub fn get_by_record_id<R: Record>(&self, record_id: &RecordId) -> DatastoreResult<R> {
        self.get_by_record_id_with_ctx(&self.call_context(), record_id)
    }

    pub fn get_by_record_id_with_ctx<R: Record>(
        &self,
        ctx: &CallContext,
        record_id: &RecordId,
    ) -> DatastoreResult<R> {
        self.catalog.ensure_registered::<R>()?;
        self.resolver().get_by_record_id(ctx, record_id)
    }

    /// Newest version through `index`; `lookup` holds one value per selector.
    pub fn get_last<R: Record>(
        &self,
        index: &str,
        lookup: &[FieldValue<'_>],
    ) -> DatastoreResult<R> {
        self.get_last_with_ctx(&self.call_context(), index, lookup)
    }

    pub fn get_last_with_ctx<R: Record>(
        &self,
        ctx: &CallContext,
        index: &str,
        lookup: &[FieldValue<'_>],
    ) -> DatastoreResult<R> {
        self.catalog.ensure_registered::<R>()?;
        self.resolver().get_last(ctx, index, lookup)
    }

    /// Newest version through a daily index, starting at the day of the
    /// lookup's timestamp and walking back at most `lookback_days` buckets.
    pub fn get_last_daily<R: Record>(
        &self,
        index: &str,
        lookup: &[FieldValue<'_>],
    ) -> DatastoreResult<R> {
        self.get_last_daily_with_ctx(&self.call_context(), index, lookup)
    }

    pub fn get_last_daily_with_ctx<R: Record>(
        &self,
        ctx: &CallContext,
        index: &str,
        lookup: &[FieldValue<'_>],
    ) -> DatastoreResult<R> {
        self.catalog.ensure_registered::<R>()?;
        self.resolver().get_last_daily(ctx, index, lookup)
    }

    /// Page of raw values under `index`, in insertion order.
    pub fn find<R: Record>(
        &self,
        index: &str,
        lookup: &[FieldValue<'_>],
        offset: u64,
        limit: u64,
    ) -> DatastoreResult<Vec<IndexValue>> {
        self.find_with_ctx::<R>(&self.call_context(), index, lookup, offset, limit)
    }

    pub fn find_with_ctx<R: Record>(
        &self,
        ctx: &CallContext,
        index: &str,
        lookup: &[FieldValue<'_>],
        offset: u64,
        limit: u64,
    ) -> DatastoreResult<Vec<IndexValue>> {
        self.catalog.ensure_registered::<R>()?;
        self.resolver().find::<R>(ctx, index, lookup, offset, limit)
    }
}
