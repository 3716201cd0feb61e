//! Structure catalog errors
//!
//! Error codes:
//! - HX_CATALOG_DUPLICATE_STRUCTURE
//! - HX_CATALOG_INVALID_DESCRIPTOR
//! - HX_CATALOG_UNREGISTERED

use thiserror::Error;

use crate::observability::Severity;

/// Result type for catalog operations
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Catalog registration and lookup failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// Two structures claim the same id
    #[error("structure id {id} registered by both {existing} and {name}")]
    DuplicateStructure {
        /// Contested id
        id: u64,
        /// Structure already holding the id
        existing: &'static str,
        /// Structure that tried to register
        name: &'static str,
    },

    /// Descriptor breaks a layout or index rule
    #[error("structure {structure} is invalid: {reason}")]
    InvalidDescriptor {
        /// Structure name
        structure: &'static str,
        /// What is wrong
        reason: String,
    },

    /// Record type used without being registered
    #[error("structure {name} (id {id}) is not registered")]
    Unregistered {
        /// Structure id
        id: u64,
        /// Structure name
        name: &'static str,
    },
}

impl CatalogError {
    /// Stable error code
    pub fn code(&self) -> &'static str {
        match self {
            CatalogError::DuplicateStructure { .. } => "HX_CATALOG_DUPLICATE_STRUCTURE",
            CatalogError::InvalidDescriptor { .. } => "HX_CATALOG_INVALID_DESCRIPTOR",
            CatalogError::Unregistered { .. } => "HX_CATALOG_UNREGISTERED",
        }
    }

    /// Registration failures happen at startup and stop it
    pub fn severity(&self) -> Severity {
        match self {
            CatalogError::DuplicateStructure { .. } | CatalogError::InvalidDescriptor { .. } => {
                Severity::Fatal
            }
            CatalogError::Unregistered { .. } => Severity::Error,
        }
    }
}
