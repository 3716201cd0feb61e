//! Common record header
//!
//! Every record starts with the same 152-byte header:
//!
//! ```text
//! offset  width  field
//!      0     32  record_id              (zeroed by the encoder, stamped by the addressor)
//!     32      8  structure_id           (u64 LE)
//!     40      8  size                   (u64 LE, total encoded length)
//!     48      8  write_time             (i64 LE, unix seconds)
//!     56     32  owner_app_id
//!     88     32  app_instance_id
//!    120     32  writer_connection_id
//! ```

use crate::address::RecordId;

use super::errors::{CodecError, CodecResult};

/// Offset of the 32-byte record id slot
pub const RECORD_ID_OFFSET: usize = 0;
/// Offset of the structure id
pub const STRUCTURE_ID_OFFSET: usize = 32;
/// Offset of the encoded size
pub const SIZE_OFFSET: usize = 40;
/// Offset of the write time
pub const WRITE_TIME_OFFSET: usize = 48;
/// Offset of the owning application id
pub const OWNER_APP_ID_OFFSET: usize = 56;
/// Offset of the writing application instance id
pub const APP_INSTANCE_ID_OFFSET: usize = 88;
/// Offset of the writer's connection id
pub const WRITER_CONNECTION_ID_OFFSET: usize = 120;
/// Total header length
pub const HEADER_LEN: usize = 152;

/// Provenance and bookkeeping fields present on every record.
///
/// The core never interprets these beyond `structure_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RecordHeader {
    /// Content hash of the encoded record
    pub record_id: RecordId,
    /// Schema tag
    pub structure_id: u64,
    /// Total encoded length in bytes
    pub size: u64,
    /// Unix seconds at write
    pub write_time: i64,
    /// Application that owns the record
    pub owner_app_id: [u8; 32],
    /// Application instance that wrote this version
    pub app_instance_id: [u8; 32],
    /// Connection on whose behalf this version was written
    pub writer_connection_id: [u8; 32],
}

impl RecordHeader {
    /// Header for a record that will be written on behalf of `writer_connection_id`.
    pub fn for_connection(writer_connection_id: [u8; 32]) -> Self {
        Self {
            writer_connection_id,
            ..Self::default()
        }
    }
}

/// Reads the structure id without decoding the rest of the record.
pub fn peek_structure_id(buf: &[u8]) -> CodecResult<u64> {
    if buf.len() < HEADER_LEN {
        return Err(CodecError::BufferTooSmall {
            needed: HEADER_LEN,
            actual: buf.len(),
        });
    }
    let mut raw = [0u8; 8];
    raw.copy_from_slice(&buf[STRUCTURE_ID_OFFSET..STRUCTURE_ID_OFFSET + 8]);
    Ok(u64::from_le_bytes(raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offsets_are_contiguous() {
        assert_eq!(RECORD_ID_OFFSET + 32, STRUCTURE_ID_OFFSET);
        assert_eq!(STRUCTURE_ID_OFFSET + 8, SIZE_OFFSET);
        assert_eq!(SIZE_OFFSET + 8, WRITE_TIME_OFFSET);
        assert_eq!(WRITE_TIME_OFFSET + 8, OWNER_APP_ID_OFFSET);
        assert_eq!(OWNER_APP_ID_OFFSET + 32, APP_INSTANCE_ID_OFFSET);
        assert_eq!(APP_INSTANCE_ID_OFFSET + 32, WRITER_CONNECTION_ID_OFFSET);
        assert_eq!(WRITER_CONNECTION_ID_OFFSET + 32, HEADER_LEN);
    }

    #[test]
    fn test_peek_structure_id() {
        let mut buf = vec![0u8; HEADER_LEN];
        buf[STRUCTURE_ID_OFFSET..STRUCTURE_ID_OFFSET + 8].copy_from_slice(&42u64.to_le_bytes());
        assert_eq!(peek_structure_id(&buf).unwrap(), 42);
    }

    #[test]
    fn test_peek_rejects_short_buffer() {
        let err = peek_structure_id(&[0u8; 40]).unwrap_err();
        assert_eq!(
            err,
            CodecError::BufferTooSmall {
                needed: HEADER_LEN,
                actual: 40
            }
        );
    }
}
