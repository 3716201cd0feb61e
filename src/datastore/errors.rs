//! Datastore façade errors

use thiserror::Error;

use crate::address::RecordId;
use crate::catalog::CatalogError;
use crate::codec::CodecError;
use crate::config::ConfigError;
use crate::index::{IndexError, IndexKey};
use crate::observability::Severity;
use crate::store::StoreError;

/// Result type for datastore operations
pub type DatastoreResult<T> = Result<T, DatastoreError>;

/// Everything a datastore call can return instead of a value
#[derive(Debug, Error)]
pub enum DatastoreError {
    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Index(#[from] IndexError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Nothing stored under the lookup. A normal outcome.
    #[error("{structure} not found{}", .index.map(|i| format!(" through index {i}")).unwrap_or_default())]
    NotFound {
        /// Structure looked for
        structure: &'static str,
        /// Index the lookup started from; `None` for a direct record id fetch
        index: Option<&'static str>,
    },

    /// Record reached through a lookup belongs to another structure.
    ///
    /// Either a hash collision or a corrupted chain. Never repaired
    /// automatically.
    #[error("record {record_id} has structure id {found}, expected {structure} ({expected})")]
    StructureMismatch {
        /// Structure looked for
        structure: &'static str,
        /// Its id
        expected: u64,
        /// Id found in the record
        found: u64,
        /// Record fetched
        record_id: RecordId,
        /// Chain that pointed at it, if any
        index_key: Option<IndexKey>,
    },

    /// Following `next` indexes went past the configured depth
    #[error("{structure}: chain from index {index} exceeds depth {depth}")]
    ChainTooDeep {
        /// Structure looked for
        structure: &'static str,
        /// Index the lookup started from
        index: &'static str,
        /// Configured limit
        depth: usize,
    },
}

impl DatastoreError {
    /// Stable error code
    pub fn code(&self) -> &'static str {
        match self {
            DatastoreError::Codec(e) => e.code(),
            DatastoreError::Store(e) => e.code(),
            DatastoreError::Index(e) => e.code(),
            DatastoreError::Catalog(e) => e.code(),
            DatastoreError::Config(e) => e.code(),
            DatastoreError::NotFound { .. } => "HX_NOT_FOUND",
            DatastoreError::StructureMismatch { .. } => "HX_STRUCTURE_MISMATCH",
            DatastoreError::ChainTooDeep { .. } => "HX_CHAIN_TOO_DEEP",
        }
    }

    /// Severity of this failure
    pub fn severity(&self) -> Severity {
        match self {
            DatastoreError::Codec(e) => e.severity(),
            DatastoreError::Store(e) => e.severity(),
            DatastoreError::Index(e) => e.severity(),
            DatastoreError::Catalog(e) => e.severity(),
            DatastoreError::Config(e) => e.severity(),
            DatastoreError::NotFound { .. } => Severity::Info,
            DatastoreError::StructureMismatch { .. } => Severity::Warn,
            DatastoreError::ChainTooDeep { .. } => Severity::Error,
        }
    }

    /// True for `NotFound`
    pub fn is_not_found(&self) -> bool {
        matches!(self, DatastoreError::NotFound { .. })
    }
}
