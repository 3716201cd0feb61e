//! Stack/heap record decoder
//!
//! Decoding copies every variable-width field into owned memory, so decoded
//! records never borrow the input buffer. Heap descriptors are bounds-checked
//! against the buffer before any byte is read.

use crate::address::RecordId;

use super::errors::{CodecError, CodecResult};
use super::header::{RecordHeader, HEADER_LEN};

/// Sequential reader over an encoded record
#[derive(Debug)]
pub struct RecordDecoder<'a> {
    buf: &'a [u8],
    cursor: usize,
    stack_len: usize,
}

impl<'a> RecordDecoder<'a> {
    /// Rejects buffers shorter than `stack_len` with `BufferTooSmall`.
    pub fn new(buf: &'a [u8], stack_len: usize) -> CodecResult<Self> {
        if buf.len() < stack_len || stack_len < HEADER_LEN {
            return Err(CodecError::BufferTooSmall {
                needed: stack_len.max(HEADER_LEN),
                actual: buf.len(),
            });
        }
        Ok(Self {
            buf,
            cursor: 0,
            stack_len,
        })
    }

    fn take(&mut self, width: usize) -> CodecResult<&'a [u8]> {
        let at = self.cursor;
        let end = at + width;
        if end > self.stack_len {
            return Err(CodecError::LayoutMismatch {
                expected: self.stack_len,
                actual: end,
            });
        }
        self.cursor = end;
        Ok(&self.buf[at..end])
    }

    fn take_array<const N: usize>(&mut self) -> CodecResult<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    /// Resolves a heap descriptor whose length counts `elem_width`-byte units.
    fn heap_slice(&mut self, elem_width: usize) -> CodecResult<(&'a [u8], usize)> {
        let descriptor_at = self.cursor;
        let raw: [u8; 8] = self.take_array()?;
        let offset = u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]) as usize;
        let count = u32::from_le_bytes([raw[4], raw[5], raw[6], raw[7]]) as usize;
        let length = count.checked_mul(elem_width).ok_or(CodecError::HeapOutOfBounds {
            offset,
            length: usize::MAX,
            buffer_len: self.buf.len(),
        })?;
        match offset.checked_add(length) {
            Some(end) if end <= self.buf.len() => Ok((&self.buf[offset..end], descriptor_at)),
            _ => Err(CodecError::HeapOutOfBounds {
                offset,
                length,
                buffer_len: self.buf.len(),
            }),
        }
    }

    /// Reads the common header. Must be called first.
    pub fn read_header(&mut self) -> CodecResult<RecordHeader> {
        Ok(RecordHeader {
            record_id: RecordId::from_bytes(self.take_array()?),
            structure_id: self.get_u64()?,
            size: self.get_u64()?,
            write_time: self.get_i64()?,
            owner_app_id: self.take_array()?,
            app_instance_id: self.take_array()?,
            writer_connection_id: self.take_array()?,
        })
    }

    /// 1-byte unsigned
    pub fn get_u8(&mut self) -> CodecResult<u8> {
        Ok(self.take(1)?[0])
    }

    /// 2-byte unsigned, little-endian
    pub fn get_u16(&mut self) -> CodecResult<u16> {
        Ok(u16::from_le_bytes(self.take_array()?))
    }

    /// 4-byte unsigned, little-endian
    pub fn get_u32(&mut self) -> CodecResult<u32> {
        Ok(u32::from_le_bytes(self.take_array()?))
    }

    /// 8-byte unsigned, little-endian
    pub fn get_u64(&mut self) -> CodecResult<u64> {
        Ok(u64::from_le_bytes(self.take_array()?))
    }

    /// 8-byte signed, little-endian
    pub fn get_i64(&mut self) -> CodecResult<i64> {
        Ok(i64::from_le_bytes(self.take_array()?))
    }

    /// Fixed-width byte array from the stack
    pub fn get_array<const N: usize>(&mut self) -> CodecResult<[u8; N]> {
        self.take_array()
    }

    /// 1-byte enum discriminant mapped through `TryFrom<u8>`
    pub fn get_enum<T: TryFrom<u8>>(&mut self, field: &'static str) -> CodecResult<T> {
        let raw = self.get_u8()?;
        T::try_from(raw).map_err(|_| CodecError::InvalidEnum {
            field,
            value: u64::from(raw),
        })
    }

    /// Owned copy of a heap string
    pub fn get_str(&mut self) -> CodecResult<String> {
        let (bytes, at) = self.heap_slice(1)?;
        std::str::from_utf8(bytes)
            .map(str::to_owned)
            .map_err(|_| CodecError::InvalidUtf8(at))
    }

    /// Owned copy of a heap byte string
    pub fn get_bytes(&mut self) -> CodecResult<Vec<u8>> {
        Ok(self.heap_slice(1)?.0.to_vec())
    }

    /// Owned copy of a heap array of `N`-byte elements
    pub fn get_list<const N: usize>(&mut self) -> CodecResult<Vec<[u8; N]>> {
        let (bytes, _) = self.heap_slice(N)?;
        Ok(bytes
            .chunks_exact(N)
            .map(|chunk| {
                let mut item = [0u8; N];
                item.copy_from_slice(chunk);
                item
            })
            .collect())
    }

    /// Confirms the body consumed exactly the declared stack.
    pub fn finish(self) -> CodecResult<()> {
        if self.cursor != self.stack_len {
            return Err(CodecError::LayoutMismatch {
                expected: self.stack_len,
                actual: self.cursor,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::encoder::RecordEncoder;

    fn encode_with_string(s: &str) -> (Vec<u8>, usize) {
        let stack_len = HEADER_LEN + 8;
        let mut enc = RecordEncoder::new(stack_len, &RecordHeader::default()).unwrap();
        enc.put_str(s).unwrap();
        (enc.finish().unwrap(), stack_len)
    }

    #[test]
    fn test_rejects_buffer_shorter_than_stack() {
        let err = RecordDecoder::new(&[0u8; 100], HEADER_LEN + 41).unwrap_err();
        assert_eq!(
            err,
            CodecError::BufferTooSmall {
                needed: HEADER_LEN + 41,
                actual: 100
            }
        );
    }

    #[test]
    fn test_reads_heap_string() {
        let (buf, stack_len) = encode_with_string("سلام");
        let mut dec = RecordDecoder::new(&buf, stack_len).unwrap();
        dec.read_header().unwrap();
        assert_eq!(dec.get_str().unwrap(), "سلام");
        dec.finish().unwrap();
    }

    #[test]
    fn test_lying_descriptor_does_not_read_past_buffer() {
        let (mut buf, stack_len) = encode_with_string("abc");
        // claim 4096 bytes of heap
        buf[HEADER_LEN + 4..HEADER_LEN + 8].copy_from_slice(&4096u32.to_le_bytes());
        let mut dec = RecordDecoder::new(&buf, stack_len).unwrap();
        dec.read_header().unwrap();
        let err = dec.get_str().unwrap_err();
        assert!(matches!(err, CodecError::HeapOutOfBounds { length: 4096, .. }));
    }

    #[test]
    fn test_truncated_heap_is_out_of_bounds() {
        let (buf, stack_len) = encode_with_string("abcdef");
        let truncated = &buf[..buf.len() - 2];
        let mut dec = RecordDecoder::new(truncated, stack_len).unwrap();
        dec.read_header().unwrap();
        assert!(matches!(
            dec.get_str(),
            Err(CodecError::HeapOutOfBounds { .. })
        ));
    }

    #[test]
    fn test_invalid_utf8_reported() {
        let stack_len = HEADER_LEN + 8;
        let mut enc = RecordEncoder::new(stack_len, &RecordHeader::default()).unwrap();
        enc.put_bytes(&[0xFF, 0xFE]).unwrap();
        let buf = enc.finish().unwrap();

        let mut dec = RecordDecoder::new(&buf, stack_len).unwrap();
        dec.read_header().unwrap();
        assert_eq!(dec.get_str().unwrap_err(), CodecError::InvalidUtf8(HEADER_LEN));
    }

    #[test]
    fn test_list_elements_copied() {
        let stack_len = HEADER_LEN + 8;
        let mut enc = RecordEncoder::new(stack_len, &RecordHeader::default()).unwrap();
        enc.put_list(&[[1u8; 16], [2u8; 16], [3u8; 16]]).unwrap();
        let buf = enc.finish().unwrap();

        let mut dec = RecordDecoder::new(&buf, stack_len).unwrap();
        dec.read_header().unwrap();
        let items: Vec<[u8; 16]> = dec.get_list().unwrap();
        assert_eq!(items, vec![[1u8; 16], [2u8; 16], [3u8; 16]]);
    }

    #[test]
    fn test_unknown_enum_discriminant() {
        #[derive(Debug)]
        struct OnlyZero;
        impl TryFrom<u8> for OnlyZero {
            type Error = ();
            fn try_from(v: u8) -> Result<Self, ()> {
                if v == 0 {
                    Ok(OnlyZero)
                } else {
                    Err(())
                }
            }
        }

        let stack_len = HEADER_LEN + 1;
        let mut enc = RecordEncoder::new(stack_len, &RecordHeader::default()).unwrap();
        enc.put_u8(3).unwrap();
        let buf = enc.finish().unwrap();

        let mut dec = RecordDecoder::new(&buf, stack_len).unwrap();
        dec.read_header().unwrap();
        let err = dec.get_enum::<OnlyZero>("Status").unwrap_err();
        assert_eq!(err, CodecError::InvalidEnum { field: "Status", value: 3 });
    }
}
