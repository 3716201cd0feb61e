//! Values stored in index chains

use crate::address::RecordId;
use crate::codec::FieldValue;
use crate::hash::{hash_newtype, HASH_LEN};

hash_newtype!(
    /// One 32-byte chain entry: a record id or a fixed-width field value,
    /// little-endian and zero-padded on the right
    IndexValue
);

impl IndexValue {
    /// Value pointing at a record version
    pub fn from_record_id(id: &RecordId) -> Self {
        Self(id.0)
    }

    /// Canonical bytes of a fixed-width field, padded to 32 bytes.
    ///
    /// Returns `None` for values wider than 32 bytes.
    pub fn from_field(value: &FieldValue<'_>) -> Option<Self> {
        let bytes = value.canonical_bytes();
        if bytes.len() > HASH_LEN {
            return None;
        }
        let mut out = [0u8; HASH_LEN];
        out[..bytes.len()].copy_from_slice(&bytes);
        Some(Self(out))
    }

    /// Reinterprets the value as a record id.
    pub fn to_record_id(&self) -> RecordId {
        RecordId(self.0)
    }

    /// First `N` bytes, for values narrower than 32 bytes.
    pub fn leading<const N: usize>(&self) -> [u8; N] {
        let mut out = [0u8; N];
        let n = N.min(HASH_LEN);
        out[..n].copy_from_slice(&self.0[..n]);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_narrow_values_padded_right() {
        let v = IndexValue::from_field(&FieldValue::U16(0x0102)).unwrap();
        assert_eq!(&v.as_bytes()[..2], &[0x02, 0x01]);
        assert!(v.as_bytes()[2..].iter().all(|b| *b == 0));
        assert_eq!(u16::from_le_bytes(v.leading()), 0x0102);
    }

    #[test]
    fn test_full_width_value_kept() {
        let v = IndexValue::from_field(&FieldValue::Bytes(&[9u8; 32])).unwrap();
        assert_eq!(v.as_bytes(), &[9u8; 32]);
    }

    #[test]
    fn test_wide_value_rejected() {
        assert!(IndexValue::from_field(&FieldValue::Bytes(&[1u8; 33])).is_none());
    }

    #[test]
    fn test_record_id_round_trip() {
        let id = RecordId::from_bytes([4u8; 32]);
        assert_eq!(IndexValue::from_record_id(&id).to_record_id(), id);
    }
}
