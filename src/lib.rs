//! QPACK: Header Compression for HTTP/3 (RFC 9204), static table only.
//!
//! This crate implements the subset of QPACK that never touches the
//! dynamic table: every header block it produces or accepts is
//! self-contained, so no encoder/decoder streams and no cross-stream
//! state are needed. Any encoded input that references or manipulates
//! the dynamic table is rejected as a connection-fatal decompression
//! failure.
//!
//! # Features
//!
//! - **Streaming decoder**: feed arbitrary byte chunks as they arrive;
//!   headers are delivered through a [`HeaderHandler`] callback as soon
//!   as each field line completes.
//! - **Static table**: the full 99-entry RFC 9204 Appendix A table with
//!   reverse lookups for status codes and request methods.
//! - **Huffman**: RFC 7541 Appendix B decoding for received string
//!   literals (encoding output is always raw ASCII).
//! - **Stateless encoder**: plain functions writing into a caller
//!   buffer, with a recoverable [`Error::BufferTooSmall`] for retry.
//!
//! # Example
//!
//! ```rust
//! use qpack_static::{encoder, static_table, Decoder, HeaderHandler};
//!
//! struct Printer;
//!
//! impl HeaderHandler for Printer {
//!     fn on_static_indexed(&mut self, index: usize) {
//!         let entry = static_table::get(index).unwrap();
//!         println!("{:?}", entry);
//!     }
//!     fn on_static_indexed_value(&mut self, index: usize, value: &[u8]) {
//!         let entry = static_table::get(index).unwrap();
//!         println!("{:?} = {:?}", entry, value);
//!     }
//!     fn on_header(&mut self, name: &[u8], value: &[u8]) {
//!         println!("{:?}: {:?}", name, value);
//!     }
//! }
//!
//! // Encode a response status line.
//! let mut buf = [0u8; 64];
//! let mut len = encoder::encode_header_block_prefix(&mut buf).unwrap();
//! let index = static_table::status_index(200).unwrap();
//! len += encoder::encode_static_indexed_field(index, &mut buf[len..]).unwrap();
//!
//! // Decode it back.
//! let mut decoder = Decoder::new(16 * 1024);
//! decoder.decode(&buf[..len], &mut Printer).unwrap();
//! ```

pub mod decoder;
pub mod encoder;
pub mod error;
pub mod field;
pub mod huffman;
pub mod integer;
pub mod static_table;

// Re-export main types
pub use decoder::Decoder;
pub use error::{Error, Result};
pub use field::{HeaderField, HeaderHandler};

// Re-export encoder entry points at the crate root
pub use encoder::{
    encode_header_block_prefix, encode_literal_with_static_name_reference,
    encode_literal_with_static_name_reference_parts, encode_literal_without_name_reference,
    encode_literal_without_name_reference_parts, encode_static_indexed_field,
};
