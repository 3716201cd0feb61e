//! Content addressing for encoded records
//!
//! A record id is SHA-512/256 over every byte of the encoded record except
//! the leading 32-byte id slot:
//!
//! - Deterministic: same bytes, same id
//! - Any change outside the id slot changes the id
//! - No I/O
//!
//! Collisions between records of different structures are not detected
//! here; they surface on read as a structure mismatch.

use crate::codec::{CodecError, CodecResult, RECORD_ID_OFFSET};
use crate::hash::{hash_newtype, sha512_256, HASH_LEN};

hash_newtype!(
    /// Immutable identity of one record version
    RecordId
);

/// Computes the record id of an encoded record.
pub fn address(encoded: &[u8]) -> CodecResult<RecordId> {
    if encoded.len() < HASH_LEN {
        return Err(CodecError::BufferTooSmall {
            needed: HASH_LEN,
            actual: encoded.len(),
        });
    }
    Ok(RecordId(sha512_256(&[&encoded[RECORD_ID_OFFSET + HASH_LEN..]])))
}

/// Computes the record id and writes it into the id slot.
pub fn stamp(encoded: &mut [u8]) -> CodecResult<RecordId> {
    let id = address(encoded)?;
    encoded[RECORD_ID_OFFSET..RECORD_ID_OFFSET + HASH_LEN].copy_from_slice(id.as_bytes());
    Ok(id)
}

/// Returns true when the id slot holds the id of the rest of the buffer.
pub fn verify(encoded: &[u8]) -> bool {
    match address(encoded) {
        Ok(id) => encoded[RECORD_ID_OFFSET..RECORD_ID_OFFSET + HASH_LEN] == id.0,
        Err(_) => false,
    }
}
