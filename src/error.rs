//! Error types for QPACK operations.
//!
//! Every decoder-side failure maps to the HTTP/3 error code
//! `QPACK_DECOMPRESSION_FAILED` (0x0200, RFC 9204 Section 6): a header block
//! that fails to decode compromises the whole connection, so callers are
//! expected to tear the connection down rather than retry. The single
//! exception is `BufferTooSmall`, an encoder-side "try again with more
//! space" signal.

use thiserror::Error;

/// Result type for QPACK operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during QPACK encoding and decoding.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The header block references the dynamic table.
    ///
    /// This codec operates in static-only mode: a non-zero Required Insert
    /// Count, a non-zero Delta Base, or any dynamic-table field line
    /// representation is rejected.
    #[error("dynamic table is not supported: {0}")]
    DynamicTableUnsupported(&'static str),

    /// A prefix integer's continuation bytes overflowed the 32-bit range.
    #[error("malformed prefix integer: value overflows 32 bits")]
    IntegerOverflow,

    /// A field line referenced a static table index outside 0..99.
    #[error("static table index {0} out of range")]
    InvalidStaticTableIndex(usize),

    /// A literal field line declared a zero-length header name.
    #[error("invalid header name: name length is zero")]
    InvalidHeaderName,

    /// A declared string length exceeds the configured maximum.
    #[error("header string of {length} bytes exceeds limit of {limit} bytes")]
    HeadersExceedMaxLength { length: usize, limit: usize },

    /// Huffman decoding of a string literal failed.
    #[error("huffman decoding error: {0}")]
    Huffman(&'static str),

    /// A header name or value byte was outside the ASCII range during
    /// literal encoding (this codec never Huffman-encodes output, so such
    /// a byte has no representation).
    #[error("header contains byte 0x{0:02x} outside the ASCII range")]
    InvalidEncodingCharacter(u8),

    /// Destination buffer too small for the encoded output.
    ///
    /// Not a protocol error: re-invoke with a buffer of at least the given
    /// size.
    #[error("buffer too small: need {0} bytes")]
    BufferTooSmall(usize),
}

impl Error {
    /// Returns the HTTP/3 error code for this error.
    pub fn error_code(&self) -> u64 {
        // Static-only mode never touches the encoder/decoder streams, so
        // everything fatal is a decompression failure (0x0200).
        0x0200
    }

    /// Returns true if the caller may retry the operation.
    ///
    /// Only encoder-side buffer exhaustion is retryable; every decode
    /// error is connection-fatal.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::BufferTooSmall(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            Error::DynamicTableUnsupported("indexed field line").error_code(),
            0x0200
        );
        assert_eq!(Error::IntegerOverflow.error_code(), 0x0200);
    }

    #[test]
    fn test_recoverable() {
        assert!(Error::BufferTooSmall(12).is_recoverable());
        assert!(!Error::InvalidHeaderName.is_recoverable());
        assert!(!Error::DynamicTableUnsupported("base").is_recoverable());
    }
}
