//! Codec error types
//!
//! Every codec failure is fatal to the encode/decode attempt that raised it.
//! Nothing here is retried.

use thiserror::Error;

use crate::observability::Severity;

/// Result type for codec operations
pub type CodecResult<T> = Result<T, CodecError>;

/// Record encode/decode failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// Input shorter than the schema's fixed stack region
    #[error("buffer too small: need {needed} bytes, got {actual}")]
    BufferTooSmall {
        /// Stack length required by the schema
        needed: usize,
        /// Length of the supplied buffer
        actual: usize,
    },

    /// A heap descriptor points past the end of the buffer
    #[error("heap field at offset {offset} spanning {length} bytes exceeds buffer of {buffer_len} bytes")]
    HeapOutOfBounds {
        /// Offset claimed by the descriptor
        offset: usize,
        /// Length in bytes claimed by the descriptor
        length: usize,
        /// Actual buffer length
        buffer_len: usize,
    },

    /// Heap grew beyond what a u32 descriptor can address
    #[error("heap overflow: {0} bytes cannot be addressed by a u32 descriptor")]
    HeapOverflow(usize),

    /// Stack writes or reads did not match the declared field layout
    #[error("layout mismatch: stack is {expected} bytes, body touched {actual}")]
    LayoutMismatch {
        /// Declared stack length
        expected: usize,
        /// Bytes consumed by the body encoder/decoder
        actual: usize,
    },

    /// String field is not valid UTF-8
    #[error("field at stack offset {0} is not valid UTF-8")]
    InvalidUtf8(usize),

    /// Enum discriminant has no matching variant
    #[error("invalid discriminant {value} for {field}")]
    InvalidEnum {
        /// Field name
        field: &'static str,
        /// Raw discriminant
        value: u64,
    },
}

impl CodecError {
    /// Stable error code
    pub fn code(&self) -> &'static str {
        match self {
            CodecError::BufferTooSmall { .. } => "HX_CODEC_BUFFER_TOO_SMALL",
            CodecError::HeapOutOfBounds { .. } => "HX_CODEC_HEAP_OUT_OF_BOUNDS",
            CodecError::HeapOverflow(_) => "HX_CODEC_HEAP_OVERFLOW",
            CodecError::LayoutMismatch { .. } => "HX_CODEC_LAYOUT_MISMATCH",
            CodecError::InvalidUtf8(_) => "HX_CODEC_INVALID_UTF8",
            CodecError::InvalidEnum { .. } => "HX_CODEC_INVALID_ENUM",
        }
    }

    /// Severity of this failure.
    ///
    /// A layout mismatch is a programming error in a record definition; the
    /// rest describe bad input.
    pub fn severity(&self) -> Severity {
        match self {
            CodecError::LayoutMismatch { .. } => Severity::Fatal,
            _ => Severity::Error,
        }
    }
}
