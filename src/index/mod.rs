//! Hash indexes over record fields
//!
//! An index is a deterministic hash derivation, not a data structure: the
//! key of a chain is computed from the structure id, the selected field
//! values and an optional literal, and the chain lives in the store.
//!
//! # Kinds
//!
//! - Primary: overwritten with the newest record id on every save
//! - Secondary: field value appended once at creation, resolved through
//!   another index
//! - List: field values appended once at creation, read a page at a time
//!
//! # Modifiers
//!
//! - Paired: several selectors hashed in declaration order
//! - Conditional: written only if a field is present (or absent)
//! - Daily: a timestamp selector truncated to the UTC day
//! - Literal: constant suffix separating otherwise identical key shapes

mod descriptor;
mod errors;
mod key;
mod retry;
mod value;
mod writer;

pub use descriptor::{Condition, IndexKind, IndexSpec, Selector, ValueSource};
pub use errors::{IndexError, IndexResult};
pub use key::{day_bucket, derive_for_record, derive_key, IndexKey, SECONDS_PER_DAY};
pub use retry::{RetryQueue, RetryReport};
pub use value::IndexValue;
pub use writer::{plan_writes, IndexWrite, IndexWriteFailed, IndexWriter, SaveMode, WriteMode};
