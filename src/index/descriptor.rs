//! Static index declarations
//!
//! Each record type declares its indexes as a slice of [`IndexSpec`] over its
//! own field enum. A spec names which fields feed the key, how they are
//! modified, when the entry is written, and what value is stored.

use crate::codec::{FieldId, Record};

/// How an index is written and read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexKind {
    /// Latest-version pointer to a record id. Overwritten on every save.
    Primary,
    /// Secondary lookup to a logical id. Appended once, at creation.
    Secondary,
    /// One-to-many listing of a field value. Appended once, at creation.
    List,
}

/// One input to the key hash
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selector<F> {
    /// Field bytes as-is
    Field(F),
    /// Timestamp field truncated to the UTC day
    Daily(F),
}

impl<F: Copy> Selector<F> {
    /// The selected field
    pub fn field(&self) -> F {
        match *self {
            Selector::Field(f) | Selector::Daily(f) => f,
        }
    }

    /// True for day-bucketed selectors
    pub fn is_daily(&self) -> bool {
        matches!(self, Selector::Daily(_))
    }
}

/// When an index entry is written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition<F> {
    /// Always
    Always,
    /// Only when the field is non-zero / non-empty
    IfPresent(F),
    /// Only when the field is zero / empty
    IfAbsent(F),
}

/// What an index entry stores
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueSource<F> {
    /// The record id of the version being saved
    RecordId,
    /// A fixed-width field of the record (at most 32 bytes)
    Field(F),
}

/// Declaration of one index over a record type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexSpec<F: 'static> {
    /// Unique name within the structure
    pub name: &'static str,
    /// Write/read discipline
    pub kind: IndexKind,
    /// Key inputs in hashing order; one for plain, two or more for paired
    pub selectors: &'static [Selector<F>],
    /// Write condition
    pub condition: Condition<F>,
    /// Disambiguating literal appended before hashing
    pub literal: Option<&'static str>,
    /// Stored value
    pub value: ValueSource<F>,
    /// Index that resolves a stored field value to a record, for chained lookups
    pub next: Option<&'static str>,
}

impl<F: FieldId> IndexSpec<F> {
    /// Record-id valued, overwritten on every save
    pub const fn primary(name: &'static str, selectors: &'static [Selector<F>]) -> Self {
        Self {
            name,
            kind: IndexKind::Primary,
            selectors,
            condition: Condition::Always,
            literal: None,
            value: ValueSource::RecordId,
            next: None,
        }
    }

    /// Field valued, appended at creation, resolved through `next`
    pub const fn secondary(
        name: &'static str,
        selectors: &'static [Selector<F>],
        value: F,
        next: &'static str,
    ) -> Self {
        Self {
            name,
            kind: IndexKind::Secondary,
            selectors,
            condition: Condition::Always,
            literal: None,
            value: ValueSource::Field(value),
            next: Some(next),
        }
    }

    /// Field valued listing, appended at creation, read with pagination
    pub const fn list(name: &'static str, selectors: &'static [Selector<F>], value: F) -> Self {
        Self {
            name,
            kind: IndexKind::List,
            selectors,
            condition: Condition::Always,
            literal: None,
            value: ValueSource::Field(value),
            next: None,
        }
    }

    /// Overwrite (primary) instead of append
    pub fn is_overwrite(&self) -> bool {
        self.kind == IndexKind::Primary
    }

    /// Position of the daily selector, if any
    pub fn daily_position(&self) -> Option<usize> {
        self.selectors.iter().position(Selector::is_daily)
    }

    /// Evaluates the write condition against a record.
    pub fn applies_to<R: Record<Field = F>>(&self, record: &R) -> bool {
        match self.condition {
            Condition::Always => true,
            Condition::IfPresent(f) => !record.field(f).is_empty(),
            Condition::IfAbsent(f) => record.field(f).is_empty(),
        }
    }
}
