//! Static structure descriptors

use std::collections::HashSet;
use std::fmt;

use chrono::NaiveDate;

use crate::codec::{FieldId, FieldKind, HEADER_LEN};
use crate::index::{Condition, IndexKind, IndexSpec, Selector, ValueSource};

/// Most selectors one index may hash
pub const MAX_SELECTORS: usize = 4;

/// Lifecycle of a structure definition
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum StructureStatus {
    /// Layout may still change
    PreAlpha,
    /// Layout settling
    Alpha,
    /// Layout frozen, indexes may grow
    Beta,
    /// Frozen
    Stable,
    /// Still readable, should not be written by new code
    Deprecated,
}

impl StructureStatus {
    /// Returns the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            StructureStatus::PreAlpha => "pre-alpha",
            StructureStatus::Alpha => "alpha",
            StructureStatus::Beta => "beta",
            StructureStatus::Stable => "stable",
            StructureStatus::Deprecated => "deprecated",
        }
    }
}

impl fmt::Display for StructureStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Layout and index declarations of one record type
#[derive(Debug)]
pub struct StructureDescriptor<F: 'static> {
    /// Schema tag written into every record
    pub id: u64,
    /// Human-readable name
    pub name: &'static str,
    /// Date the layout was issued, `YYYY-MM-DD`
    pub issue_date: &'static str,
    /// Lifecycle status
    pub status: StructureStatus,
    /// Body fields in encoding order
    pub fields: &'static [F],
    /// Index declarations in write order
    pub indexes: &'static [IndexSpec<F>],
}

impl<F: FieldId> StructureDescriptor<F> {
    /// Header plus every body field's stack width
    pub fn stack_len(&self) -> usize {
        HEADER_LEN
            + self
                .fields
                .iter()
                .map(|f| f.kind().stack_width())
                .sum::<usize>()
    }

    /// Index declaration by name
    pub fn index(&self, name: &str) -> Option<&'static IndexSpec<F>> {
        self.indexes.iter().find(|spec| spec.name == name)
    }

    /// Parsed issue date
    pub fn issued(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.issue_date, "%Y-%m-%d").ok()
    }

    /// Checks layout and index rules. Returns the first violation found.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.is_empty() {
            return Err("name is empty".into());
        }
        if self.issued().is_none() {
            return Err(format!("issue date {:?} is not YYYY-MM-DD", self.issue_date));
        }

        let mut field_names = HashSet::new();
        for field in self.fields {
            if field.is_header() {
                return Err(format!("header field {} listed as a body field", field.name()));
            }
            if !field_names.insert(field.name()) {
                return Err(format!("field {} declared twice", field.name()));
            }
        }

        let mut index_names = HashSet::new();
        for (i, spec) in self.indexes.iter().enumerate() {
            if !index_names.insert(spec.name) {
                return Err(format!("index {} declared twice", spec.name));
            }
            let same_shape = self.indexes[..i]
                .iter()
                .find(|other| other.selectors == spec.selectors && other.literal == spec.literal);
            if let Some(other) = same_shape {
                return Err(format!(
                    "indexes {} and {} derive identical keys; add a literal",
                    other.name, spec.name
                ));
            }
            self.validate_index(spec)?;
        }

        for spec in self.indexes {
            self.validate_chain(spec)?;
        }
        Ok(())
    }

    fn declared(&self, field: F) -> bool {
        field.is_header() || self.fields.contains(&field)
    }

    fn validate_index(&self, spec: &IndexSpec<F>) -> Result<(), String> {
        let name = spec.name;
        if spec.selectors.is_empty() || spec.selectors.len() > MAX_SELECTORS {
            return Err(format!(
                "index {name} has {} selectors, expected 1 to {MAX_SELECTORS}",
                spec.selectors.len()
            ));
        }
        if spec.literal == Some("") {
            return Err(format!("index {name} has an empty literal"));
        }

        let mut daily = 0;
        for selector in spec.selectors {
            let field = selector.field();
            if !self.declared(field) {
                return Err(format!("index {name} selects undeclared field {}", field.name()));
            }
            if let Selector::Daily(f) = selector {
                daily += 1;
                if f.kind() != FieldKind::I64 {
                    return Err(format!("index {name}: daily field {} is not i64", f.name()));
                }
            }
        }
        if daily > 1 {
            return Err(format!("index {name} has more than one daily selector"));
        }

        match spec.condition {
            Condition::Always => {}
            Condition::IfPresent(f) | Condition::IfAbsent(f) => {
                if !self.declared(f) {
                    return Err(format!("index {name} conditions on undeclared field {}", f.name()));
                }
            }
        }

        match (spec.kind, spec.value) {
            (IndexKind::Primary, ValueSource::RecordId) => {}
            (IndexKind::Primary, ValueSource::Field(_)) => {
                return Err(format!("primary index {name} must store the record id"));
            }
            (_, ValueSource::RecordId) => {
                return Err(format!("index {name} appends record ids; only primary indexes may"));
            }
            (_, ValueSource::Field(f)) => {
                if !self.declared(f) {
                    return Err(format!("index {name} stores undeclared field {}", f.name()));
                }
                match f.kind().fixed_width() {
                    Some(w) if w <= 32 => {}
                    _ => {
                        return Err(format!(
                            "index {name} stores {}, which is not fixed width of at most 32 bytes",
                            f.name()
                        ))
                    }
                }
            }
        }

        if spec.kind == IndexKind::Secondary && spec.next.is_none() {
            return Err(format!("secondary index {name} declares no next index"));
        }
        if spec.kind == IndexKind::Primary && spec.next.is_some() {
            return Err(format!("primary index {name} cannot chain"));
        }
        Ok(())
    }

    fn validate_chain(&self, spec: &IndexSpec<F>) -> Result<(), String> {
        let Some(next_name) = spec.next else {
            return Ok(());
        };
        let Some(next) = self.index(next_name) else {
            return Err(format!("index {} chains to unknown index {next_name}", spec.name));
        };
        let target_ok = matches!(
            next.selectors,
            [Selector::Field(f)] if f.kind() == FieldKind::Array(32)
        );
        let value_ok =
            matches!(spec.value, ValueSource::Field(f) if f.kind() == FieldKind::Array(32));
        if !target_ok || !value_ok {
            return Err(format!(
                "index {} chains to {next_name}, which must take one 32-byte selector matching the stored value",
                spec.name
            ));
        }

        let mut seen = vec![spec.name];
        let mut current = next;
        while let Some(n) = current.next {
            if seen.contains(&current.name) {
                return Err(format!("index chain starting at {} is cyclic", spec.name));
            }
            seen.push(current.name);
            current = self
                .index(n)
                .ok_or_else(|| format!("index {} chains to unknown index {n}", current.name))?;
        }
        Ok(())
    }
}
