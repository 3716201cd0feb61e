//! Stack/heap record encoder
//!
//! Fields are written in declaration order. Fixed-width fields land at the
//! next stack position; variable-width fields append their bytes to the heap
//! and leave an `(offset: u32, length: u32)` descriptor on the stack. Offsets
//! are absolute positions in the finished buffer.

use super::errors::{CodecError, CodecResult};
use super::header::{
    RecordHeader, APP_INSTANCE_ID_OFFSET, HEADER_LEN, OWNER_APP_ID_OFFSET, SIZE_OFFSET,
    STRUCTURE_ID_OFFSET, WRITER_CONNECTION_ID_OFFSET, WRITE_TIME_OFFSET,
};

/// Sequential writer over a record buffer
#[derive(Debug)]
pub struct RecordEncoder {
    buf: Vec<u8>,
    cursor: usize,
    stack_len: usize,
}

impl RecordEncoder {
    /// Starts a record whose stack region is `stack_len` bytes.
    ///
    /// The header is written immediately; the record id slot stays zeroed.
    pub fn new(stack_len: usize, header: &RecordHeader) -> CodecResult<Self> {
        if stack_len < HEADER_LEN {
            return Err(CodecError::LayoutMismatch {
                expected: HEADER_LEN,
                actual: stack_len,
            });
        }
        let mut buf = vec![0u8; stack_len];
        buf[STRUCTURE_ID_OFFSET..SIZE_OFFSET].copy_from_slice(&header.structure_id.to_le_bytes());
        buf[WRITE_TIME_OFFSET..OWNER_APP_ID_OFFSET]
            .copy_from_slice(&header.write_time.to_le_bytes());
        buf[OWNER_APP_ID_OFFSET..APP_INSTANCE_ID_OFFSET].copy_from_slice(&header.owner_app_id);
        buf[APP_INSTANCE_ID_OFFSET..WRITER_CONNECTION_ID_OFFSET]
            .copy_from_slice(&header.app_instance_id);
        buf[WRITER_CONNECTION_ID_OFFSET..HEADER_LEN].copy_from_slice(&header.writer_connection_id);

        Ok(Self {
            buf,
            cursor: HEADER_LEN,
            stack_len,
        })
    }

    fn reserve(&mut self, width: usize) -> CodecResult<usize> {
        let at = self.cursor;
        let end = at + width;
        if end > self.stack_len {
            return Err(CodecError::LayoutMismatch {
                expected: self.stack_len,
                actual: end,
            });
        }
        self.cursor = end;
        Ok(at)
    }

    fn put_fixed(&mut self, bytes: &[u8]) -> CodecResult<()> {
        let at = self.reserve(bytes.len())?;
        self.buf[at..at + bytes.len()].copy_from_slice(bytes);
        Ok(())
    }

    /// Writes the heap bytes and a descriptor whose length field is `count`.
    fn put_heap(&mut self, bytes: &[u8], count: usize) -> CodecResult<()> {
        let at = self.reserve(8)?;
        let offset = self.buf.len();
        let offset32 = u32::try_from(offset).map_err(|_| CodecError::HeapOverflow(offset))?;
        let count32 = u32::try_from(count).map_err(|_| CodecError::HeapOverflow(count))?;
        if u32::try_from(offset + bytes.len()).is_err() {
            return Err(CodecError::HeapOverflow(offset + bytes.len()));
        }
        self.buf[at..at + 4].copy_from_slice(&offset32.to_le_bytes());
        self.buf[at + 4..at + 8].copy_from_slice(&count32.to_le_bytes());
        self.buf.extend_from_slice(bytes);
        Ok(())
    }

    /// 1-byte unsigned
    pub fn put_u8(&mut self, v: u8) -> CodecResult<()> {
        self.put_fixed(&[v])
    }

    /// 2-byte unsigned, little-endian
    pub fn put_u16(&mut self, v: u16) -> CodecResult<()> {
        self.put_fixed(&v.to_le_bytes())
    }

    /// 4-byte unsigned, little-endian
    pub fn put_u32(&mut self, v: u32) -> CodecResult<()> {
        self.put_fixed(&v.to_le_bytes())
    }

    /// 8-byte unsigned, little-endian
    pub fn put_u64(&mut self, v: u64) -> CodecResult<()> {
        self.put_fixed(&v.to_le_bytes())
    }

    /// 8-byte signed, little-endian
    pub fn put_i64(&mut self, v: i64) -> CodecResult<()> {
        self.put_fixed(&v.to_le_bytes())
    }

    /// Fixed-width byte array copied onto the stack
    pub fn put_array<const N: usize>(&mut self, v: &[u8; N]) -> CodecResult<()> {
        self.put_fixed(v)
    }

    /// UTF-8 string in the heap; descriptor length is the byte length
    pub fn put_str(&mut self, v: &str) -> CodecResult<()> {
        self.put_heap(v.as_bytes(), v.len())
    }

    /// Byte string in the heap; descriptor length is the byte length
    pub fn put_bytes(&mut self, v: &[u8]) -> CodecResult<()> {
        self.put_heap(v, v.len())
    }

    /// Array of fixed-width elements in the heap; descriptor length is the
    /// element count
    pub fn put_list<const N: usize>(&mut self, items: &[[u8; N]]) -> CodecResult<()> {
        self.put_heap(items.as_flattened(), items.len())
    }

    /// Finishes the buffer and writes the total length into the size slot.
    pub fn finish(mut self) -> CodecResult<Vec<u8>> {
        if self.cursor != self.stack_len {
            return Err(CodecError::LayoutMismatch {
                expected: self.stack_len,
                actual: self.cursor,
            });
        }
        let size = self.buf.len() as u64;
        self.buf[SIZE_OFFSET..WRITE_TIME_OFFSET].copy_from_slice(&size.to_le_bytes());
        Ok(self.buf)
    }
}
