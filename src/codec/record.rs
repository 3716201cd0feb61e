//! The `Record` trait and the generic encode/decode entry points

use crate::catalog::StructureDescriptor;

use super::decoder::RecordDecoder;
use super::encoder::RecordEncoder;
use super::errors::CodecResult;
use super::field::{FieldId, FieldValue};
use super::header::RecordHeader;

/// A storable record type.
///
/// Implementors describe their layout and indexes once, in a static
/// [`StructureDescriptor`], and write/read their schema-specific fields in
/// the same order as `descriptor().fields`.
pub trait Record: Sized {
    /// Field enum naming every field usable in index declarations
    type Field: FieldId;

    /// Static layout and index declarations
    fn descriptor() -> &'static StructureDescriptor<Self::Field>;

    /// Common header
    fn header(&self) -> &RecordHeader;

    /// Mutable common header
    fn header_mut(&mut self) -> &mut RecordHeader;

    /// Writes the schema-specific fields in declaration order.
    fn encode_body(&self, enc: &mut RecordEncoder) -> CodecResult<()>;

    /// Reads the schema-specific fields in declaration order.
    fn decode_body(header: RecordHeader, dec: &mut RecordDecoder<'_>) -> CodecResult<Self>;

    /// Canonical view of one field
    fn field(&self, field: Self::Field) -> FieldValue<'_>;
}

/// Encodes `record` into a single contiguous buffer.
///
/// The record id slot is left zeroed and the size slot holds the encoded
/// length; every other header field is copied from the record.
pub fn encode<R: Record>(record: &R) -> CodecResult<Vec<u8>> {
    let mut enc = RecordEncoder::new(R::descriptor().stack_len(), record.header())?;
    record.encode_body(&mut enc)?;
    enc.finish()
}

/// Decodes a buffer produced by [`encode`].
///
/// Does not check the structure id; callers resolving records through an
/// index must do that before trusting the result.
pub fn decode<R: Record>(buf: &[u8]) -> CodecResult<R> {
    let mut dec = RecordDecoder::new(buf, R::descriptor().stack_len())?;
    let header = dec.read_header()?;
    let record = R::decode_body(header, &mut dec)?;
    dec.finish()?;
    Ok(record)
}
