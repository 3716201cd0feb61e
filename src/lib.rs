//! hashindex - content-addressed records and hash-derived indexes
//!
//! A record layer over a minimal key/value store that only knows how to set
//! a payload under an id and keep ordered value chains under a key.
//!
//! - `codec`: stack/heap binary record format
//! - `address`: SHA-512/256 record ids
//! - `index`: index declarations, key derivation, chain writes, retry queue
//! - `resolver`: newest-version lookups through index chains
//! - `datastore`: the façade callers use
//!
//! ```ignore
//! use std::sync::Arc;
//! use hashindex::{CatalogBuilder, Datastore, DatastoreConfig, FieldValue, MemoryStore};
//! use hashindex::structures::{register_all, PersonNumber};
//!
//! let catalog = register_all(CatalogBuilder::new())?.build();
//! let config = DatastoreConfig::load("hashindex.json".as_ref())?;
//! let ds = Datastore::new(Arc::new(MemoryStore::new()), Arc::new(catalog), config)?;
//!
//! let mut pn = PersonNumber { person_id: [1; 32], number: 989_123_456_789, ..Default::default() };
//! ds.save_new(&mut pn)?;
//! let latest: PersonNumber =
//!     ds.get_last(PersonNumber::BY_NUMBER, &[FieldValue::U64(989_123_456_789)])?;
//! ```

pub mod address;
pub mod catalog;
pub mod clock;
pub mod codec;
pub mod config;
pub mod datastore;
mod hash;
pub mod identity;
pub mod index;
pub mod observability;
pub mod resolver;
pub mod store;
pub mod structures;

pub use address::RecordId;
pub use catalog::{CatalogBuilder, StructureCatalog};
pub use clock::{Clock, FixedClock, SystemClock};
pub use codec::{FieldValue, Record, RecordHeader};
pub use config::DatastoreConfig;
pub use datastore::{Datastore, DatastoreError, DatastoreResult, WriteReceipt};
pub use identity::AppIdentity;
pub use index::{IndexKey, IndexValue, RetryReport, SaveMode};
pub use store::{CallContext, HashStore, MemoryStore, StoreError};
