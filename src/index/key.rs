//! Index key derivation
//!
//! ```text
//! key = SHA-512/256( structure_id (u64 LE)
//!                  ‖ canonical bytes of selector 1
//!                  ‖ …
//!                  ‖ canonical bytes of selector n
//!                  ‖ literal bytes, if declared )
//! ```
//!
//! Selector bytes are concatenated without separators or length prefixes, so
//! two string selectors `("ab", "c")` and `("a", "bc")` hash alike. Index
//! declarations avoid this by pairing at most one variable-width selector
//! with fixed-width ones; the ambiguity is kept for key compatibility.

use sha2::{Digest, Sha512_256};

use crate::codec::{FieldId, FieldKind, FieldValue, Record};
use crate::hash::hash_newtype;

use super::descriptor::IndexSpec;
use super::errors::{IndexError, IndexResult};

hash_newtype!(
    /// Key of one index chain in the store
    IndexKey
);

/// Length of a daily bucket
pub const SECONDS_PER_DAY: i64 = 86_400;

/// Start of the UTC day containing `ts` (unix seconds).
///
/// Floors towards negative infinity, so pre-1970 timestamps land in the day
/// that contains them. `None` for timestamps in the first partial day of the
/// i64 range, whose day start is below `i64::MIN`.
pub fn day_bucket(ts: i64) -> Option<i64> {
    ts.div_euclid(SECONDS_PER_DAY).checked_mul(SECONDS_PER_DAY)
}

/// Incremental key hasher
struct KeyBuilder {
    hasher: Sha512_256,
    scratch: Vec<u8>,
}

impl KeyBuilder {
    fn new(structure_id: u64) -> Self {
        let mut hasher = Sha512_256::new();
        hasher.update(structure_id.to_le_bytes());
        Self {
            hasher,
            scratch: Vec::with_capacity(64),
        }
    }

    fn selector(&mut self, value: &FieldValue<'_>) {
        self.scratch.clear();
        value.write_canonical(&mut self.scratch);
        self.hasher.update(&self.scratch);
    }

    fn literal(&mut self, literal: &str) {
        self.hasher.update(literal.as_bytes());
    }

    fn finish(self) -> IndexKey {
        let mut out = [0u8; 32];
        out.copy_from_slice(&self.hasher.finalize());
        IndexKey(out)
    }
}

/// Derives the key of `spec` from lookup values given in selector order.
///
/// Daily selectors take an `I64` timestamp anywhere in the day; it is
/// truncated before hashing.
pub fn derive_key<F: FieldId>(
    structure_id: u64,
    spec: &IndexSpec<F>,
    lookup: &[FieldValue<'_>],
) -> IndexResult<IndexKey> {
    if lookup.len() != spec.selectors.len() {
        return Err(IndexError::SelectorArity {
            index: spec.name,
            expected: spec.selectors.len(),
            actual: lookup.len(),
        });
    }

    let mut builder = KeyBuilder::new(structure_id);
    for (selector, value) in spec.selectors.iter().zip(lookup) {
        let field = selector.field();
        let kind_error = || IndexError::SelectorKind {
            index: spec.name,
            field: field.name(),
        };
        if !value.matches_kind(field.kind()) {
            return Err(kind_error());
        }
        if selector.is_daily() {
            match *value {
                FieldValue::I64(ts) if field.kind() == FieldKind::I64 => {
                    let day = day_bucket(ts).ok_or(IndexError::TimestampOutOfRange {
                        index: spec.name,
                        field: field.name(),
                        ts,
                    })?;
                    builder.selector(&FieldValue::I64(day));
                }
                _ => return Err(kind_error()),
            }
        } else {
            builder.selector(value);
        }
    }
    if let Some(literal) = spec.literal {
        builder.literal(literal);
    }
    Ok(builder.finish())
}

/// Derives the key `spec` produces for `record`.
pub fn derive_for_record<R: Record>(
    record: &R,
    spec: &IndexSpec<R::Field>,
) -> IndexResult<IndexKey> {
    let lookup: Vec<FieldValue<'_>> = spec
        .selectors
        .iter()
        .map(|s| record.field(s.field()))
        .collect();
    derive_key(record.header().structure_id, spec, &lookup)
}
