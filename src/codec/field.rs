//! Field kinds and borrowed field values
//!
//! `FieldKind` drives the stack layout; `FieldValue` is the canonical view of
//! a field used for index key derivation and index conditions.

use std::fmt;

/// Bytes occupied on the stack by a heap field's `(offset: u32, length: u32)` descriptor
pub const HEAP_DESCRIPTOR_LEN: usize = 8;

/// Storage class of a schema field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// 1-byte unsigned integer (also enums)
    U8,
    /// 2-byte unsigned integer
    U16,
    /// 4-byte unsigned integer
    U32,
    /// 8-byte unsigned integer
    U64,
    /// 8-byte signed integer (timestamps, amounts)
    I64,
    /// Fixed-width byte array stored inline on the stack
    Array(usize),
    /// UTF-8 string stored in the heap
    Str,
    /// Byte string stored in the heap
    Bytes,
    /// Heap array of fixed-width elements of the given width
    List(usize),
}

impl FieldKind {
    /// Bytes the field occupies in the stack region
    pub const fn stack_width(self) -> usize {
        match self {
            FieldKind::U8 => 1,
            FieldKind::U16 => 2,
            FieldKind::U32 => 4,
            FieldKind::U64 | FieldKind::I64 => 8,
            FieldKind::Array(n) => n,
            FieldKind::Str | FieldKind::Bytes | FieldKind::List(_) => HEAP_DESCRIPTOR_LEN,
        }
    }

    /// Returns true for fields whose bytes live in the heap
    pub const fn is_heap(self) -> bool {
        matches!(self, FieldKind::Str | FieldKind::Bytes | FieldKind::List(_))
    }

    /// Width of the value itself for fixed-width kinds
    pub const fn fixed_width(self) -> Option<usize> {
        if self.is_heap() {
            None
        } else {
            Some(self.stack_width())
        }
    }
}

/// Identifies one field of a record type.
///
/// Implemented by a per-structure field enum so index declarations are
/// checked by the compiler rather than looked up by name at runtime.
pub trait FieldId: Copy + Eq + fmt::Debug + Send + Sync + 'static {
    /// Field name as it appears in logs and errors
    fn name(self) -> &'static str;

    /// Storage class of the field
    fn kind(self) -> FieldKind;

    /// True for header fields (e.g. the write time) exposed for indexing.
    /// Header fields are never listed among a structure's body fields.
    fn is_header(self) -> bool {
        false
    }
}

/// Borrowed, canonical view of a single field value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldValue<'a> {
    /// 1-byte unsigned
    U8(u8),
    /// 2-byte unsigned
    U16(u16),
    /// 4-byte unsigned
    U32(u32),
    /// 8-byte unsigned
    U64(u64),
    /// 8-byte signed
    I64(i64),
    /// Raw bytes (fixed arrays, byte strings, flattened lists)
    Bytes(&'a [u8]),
    /// UTF-8 text
    Str(&'a str),
}

impl<'a> FieldValue<'a> {
    /// Appends the canonical byte form: little-endian integers, raw bytes,
    /// raw UTF-8.
    pub fn write_canonical(&self, out: &mut Vec<u8>) {
        match *self {
            FieldValue::U8(v) => out.push(v),
            FieldValue::U16(v) => out.extend_from_slice(&v.to_le_bytes()),
            FieldValue::U32(v) => out.extend_from_slice(&v.to_le_bytes()),
            FieldValue::U64(v) => out.extend_from_slice(&v.to_le_bytes()),
            FieldValue::I64(v) => out.extend_from_slice(&v.to_le_bytes()),
            FieldValue::Bytes(v) => out.extend_from_slice(v),
            FieldValue::Str(v) => out.extend_from_slice(v.as_bytes()),
        }
    }

    /// Canonical bytes as an owned buffer
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.write_canonical(&mut out);
        out
    }

    /// Zero integers, all-zero or empty byte arrays and empty strings are
    /// "absent" for conditional indexes.
    pub fn is_empty(&self) -> bool {
        match *self {
            FieldValue::U8(v) => v == 0,
            FieldValue::U16(v) => v == 0,
            FieldValue::U32(v) => v == 0,
            FieldValue::U64(v) => v == 0,
            FieldValue::I64(v) => v == 0,
            FieldValue::Bytes(v) => v.iter().all(|b| *b == 0),
            FieldValue::Str(v) => v.is_empty(),
        }
    }

    /// Whether this value has the shape a field of `kind` produces
    pub fn matches_kind(&self, kind: FieldKind) -> bool {
        match (*self, kind) {
            (FieldValue::U8(_), FieldKind::U8)
            | (FieldValue::U16(_), FieldKind::U16)
            | (FieldValue::U32(_), FieldKind::U32)
            | (FieldValue::U64(_), FieldKind::U64)
            | (FieldValue::I64(_), FieldKind::I64)
            | (FieldValue::Str(_), FieldKind::Str)
            | (FieldValue::Bytes(_), FieldKind::Bytes) => true,
            (FieldValue::Bytes(v), FieldKind::Array(n)) => v.len() == n,
            (FieldValue::Bytes(v), FieldKind::List(n)) => n > 0 && v.len() % n == 0,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stack_widths() {
        assert_eq!(FieldKind::U8.stack_width(), 1);
        assert_eq!(FieldKind::U16.stack_width(), 2);
        assert_eq!(FieldKind::U32.stack_width(), 4);
        assert_eq!(FieldKind::U64.stack_width(), 8);
        assert_eq!(FieldKind::I64.stack_width(), 8);
        assert_eq!(FieldKind::Array(32).stack_width(), 32);
        assert_eq!(FieldKind::Str.stack_width(), HEAP_DESCRIPTOR_LEN);
        assert_eq!(FieldKind::List(16).stack_width(), HEAP_DESCRIPTOR_LEN);
    }

    #[test]
    fn test_fixed_width_excludes_heap_kinds() {
        assert_eq!(FieldKind::Array(32).fixed_width(), Some(32));
        assert_eq!(FieldKind::Bytes.fixed_width(), None);
        assert!(FieldKind::Str.is_heap());
        assert!(!FieldKind::U64.is_heap());
    }

    #[test]
    fn test_canonical_bytes_are_little_endian() {
        assert_eq!(FieldValue::U32(1).canonical_bytes(), vec![1, 0, 0, 0]);
        assert_eq!(FieldValue::I64(-1).canonical_bytes(), vec![0xFF; 8]);
        assert_eq!(FieldValue::Str("fa").canonical_bytes(), b"fa".to_vec());
    }

    #[test]
    fn test_emptiness() {
        assert!(FieldValue::Bytes(&[0u8; 32]).is_empty());
        assert!(!FieldValue::Bytes(&[0, 0, 1]).is_empty());
        assert!(FieldValue::Str("").is_empty());
        assert!(FieldValue::U64(0).is_empty());
        assert!(!FieldValue::I64(-5).is_empty());
    }

    #[test]
    fn test_kind_matching() {
        assert!(FieldValue::Bytes(&[1u8; 32]).matches_kind(FieldKind::Array(32)));
        assert!(!FieldValue::Bytes(&[1u8; 16]).matches_kind(FieldKind::Array(32)));
        assert!(FieldValue::Bytes(&[1u8; 48]).matches_kind(FieldKind::List(16)));
        assert!(!FieldValue::U32(1).matches_kind(FieldKind::U64));
        assert!(FieldValue::Str("x").matches_kind(FieldKind::Str));
    }
}
