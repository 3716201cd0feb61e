//! Binary record codec
//!
//! A record is one contiguous buffer: a fixed-length stack region followed
//! by a heap region.
//!
//! ```text
//! +---------------------------+
//! | header (152 bytes)        |
//! +---------------------------+
//! | fixed-width fields        |  integers LE, enums as u8, byte arrays raw
//! | heap descriptors          |  (offset: u32 LE, length: u32 LE) per variable field
//! +---------------------------+  <- stack_len
//! | heap                      |  variable-width field bytes, declaration order
//! +---------------------------+
//! ```
//!
//! # Ownership
//!
//! Decoding copies variable-width fields. A decoded record owns all of its
//! data and may outlive the buffer it came from.

mod decoder;
mod encoder;
mod errors;
mod field;
mod header;
mod record;

pub use decoder::RecordDecoder;
pub use encoder::RecordEncoder;
pub use errors::{CodecError, CodecResult};
pub use field::{FieldId, FieldKind, FieldValue, HEAP_DESCRIPTOR_LEN};
pub use header::{
    peek_structure_id, RecordHeader, APP_INSTANCE_ID_OFFSET, HEADER_LEN, OWNER_APP_ID_OFFSET,
    RECORD_ID_OFFSET, SIZE_OFFSET, STRUCTURE_ID_OFFSET, WRITER_CONNECTION_ID_OFFSET,
    WRITE_TIME_OFFSET,
};
pub use record::{decode, encode, Record};
