//! Index declaration and derivation errors

use thiserror::Error;

use crate::observability::Severity;

/// Result type for index key derivation
pub type IndexResult<T> = Result<T, IndexError>;

/// Failures deriving or looking up index keys
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IndexError {
    /// No index with this name is declared for the structure
    #[error("{structure} declares no index named {index:?}")]
    UnknownIndex {
        /// Structure name
        structure: &'static str,
        /// Requested index
        index: String,
    },

    /// Lookup supplied the wrong number of selector values
    #[error("index {index} takes {expected} selector values, got {actual}")]
    SelectorArity {
        /// Index name
        index: &'static str,
        /// Declared selector count
        expected: usize,
        /// Supplied value count
        actual: usize,
    },

    /// Lookup value does not have the shape of the selected field
    #[error("index {index}: value for {field} does not match the field kind")]
    SelectorKind {
        /// Index name
        index: &'static str,
        /// Field name
        field: &'static str,
    },

    /// Timestamp whose UTC day start does not fit in an i64
    #[error("index {index}: timestamp {ts} for {field} has no representable day bucket")]
    TimestampOutOfRange {
        /// Index name
        index: &'static str,
        /// Field name
        field: &'static str,
        /// Supplied timestamp
        ts: i64,
    },

    /// A daily operation was requested on an index without a daily selector
    #[error("index {0} has no daily selector")]
    NotDaily(&'static str),

    /// Stored field value does not fit in a 32-byte chain entry
    #[error("index {index}: value of {width} bytes exceeds 32")]
    ValueTooWide {
        /// Index name
        index: &'static str,
        /// Canonical width of the value
        width: usize,
    },

    /// A field-valued index was followed but declares no next index
    #[error("index {0} stores a field value but declares no index to resolve it")]
    Unresolvable(&'static str),
}

impl IndexError {
    /// Stable error code
    pub fn code(&self) -> &'static str {
        match self {
            IndexError::UnknownIndex { .. } => "HX_INDEX_UNKNOWN",
            IndexError::SelectorArity { .. } => "HX_INDEX_SELECTOR_ARITY",
            IndexError::SelectorKind { .. } => "HX_INDEX_SELECTOR_KIND",
            IndexError::TimestampOutOfRange { .. } => "HX_INDEX_TIMESTAMP_RANGE",
            IndexError::NotDaily(_) => "HX_INDEX_NOT_DAILY",
            IndexError::ValueTooWide { .. } => "HX_INDEX_VALUE_TOO_WIDE",
            IndexError::Unresolvable(_) => "HX_INDEX_UNRESOLVABLE",
        }
    }

    /// All index errors are caller mistakes
    pub fn severity(&self) -> Severity {
        Severity::Error
    }
}
