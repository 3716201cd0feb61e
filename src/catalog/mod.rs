//! Process-wide structure catalog
//!
//! Maps `structure_id` to the structure's descriptor summary. Built once at
//! startup with [`CatalogBuilder`], validated as it is built, and read-only
//! afterwards. A `Datastore` refuses to save or read record types the
//! catalog does not know.

mod descriptor;
mod errors;

pub use descriptor::{StructureDescriptor, StructureStatus, MAX_SELECTORS};
pub use errors::{CatalogError, CatalogResult};

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::codec::Record;
use crate::observability::{log_event, Event};

/// Type-erased summary of one registered structure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructureInfo {
    /// Schema tag
    pub id: u64,
    /// Structure name
    pub name: &'static str,
    /// Lifecycle status
    pub status: StructureStatus,
    /// Issue date
    pub issued: NaiveDate,
    /// Encoded stack length
    pub stack_len: usize,
    /// Declared index names, in write order
    pub indexes: Vec<&'static str>,
}

/// Collects and validates structures before the catalog is frozen
#[derive(Debug, Default)]
pub struct CatalogBuilder {
    entries: BTreeMap<u64, StructureInfo>,
}

impl CatalogBuilder {
    /// Empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates `R`'s descriptor and adds it.
    pub fn register<R: Record>(mut self) -> CatalogResult<Self> {
        let d = R::descriptor();
        d.validate().map_err(|reason| CatalogError::InvalidDescriptor {
            structure: d.name,
            reason,
        })?;
        if let Some(existing) = self.entries.get(&d.id) {
            return Err(CatalogError::DuplicateStructure {
                id: d.id,
                existing: existing.name,
                name: d.name,
            });
        }
        let issued = d.issued().ok_or_else(|| CatalogError::InvalidDescriptor {
            structure: d.name,
            reason: "issue date unreadable".into(),
        })?;

        self.entries.insert(
            d.id,
            StructureInfo {
                id: d.id,
                name: d.name,
                status: d.status,
                issued,
                stack_len: d.stack_len(),
                indexes: d.indexes.iter().map(|spec| spec.name).collect(),
            },
        );
        Ok(self)
    }

    /// Freezes the catalog.
    pub fn build(self) -> StructureCatalog {
        let count = self.entries.len().to_string();
        log_event(Event::CatalogSealed, &[("structures", count.as_str())]);
        StructureCatalog {
            entries: self.entries,
        }
    }
}

/// Frozen registry of structures
#[derive(Debug, Clone, Default)]
pub struct StructureCatalog {
    entries: BTreeMap<u64, StructureInfo>,
}

impl StructureCatalog {
    /// Looks up a structure by id.
    pub fn get(&self, structure_id: u64) -> Option<&StructureInfo> {
        self.entries.get(&structure_id)
    }

    /// Name of a structure id, for messages about foreign records
    pub fn name_of(&self, structure_id: u64) -> Option<&'static str> {
        self.get(structure_id).map(|info| info.name)
    }

    /// Confirms `R` is the type registered under its id.
    pub fn ensure_registered<R: Record>(&self) -> CatalogResult<&StructureInfo> {
        let d = R::descriptor();
        match self.entries.get(&d.id) {
            Some(info) if info.name == d.name => Ok(info),
            _ => Err(CatalogError::Unregistered {
                id: d.id,
                name: d.name,
            }),
        }
    }

    /// Registered structures in id order
    pub fn iter(&self) -> impl Iterator<Item = &StructureInfo> {
        self.entries.values()
    }

    /// Number of registered structures
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing is registered
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
