//! Streaming QPACK field-section decoder, static-table-only.
//!
//! The decoder is a byte-at-a-time state machine: callers feed it whatever
//! bytes have arrived (one slice, several slices, or a whole `bytes::Buf`
//! sequence) and it invokes a [`HeaderHandler`] once per completed field.
//! State survives across calls, so one logical header block may arrive in
//! arbitrarily many pieces; end-of-block detection is the caller's job.
//!
//! Any reference to the dynamic table — a non-zero Required Insert Count or
//! Delta Base in the section prefix, or a dynamic/post-base field line
//! representation — is a fatal decode error. QPACK errors are
//! connection-fatal in HTTP/3: the caller must tear the stream down rather
//! than resume.

use crate::error::{Error, Result};
use crate::field::HeaderHandler;
use crate::huffman;
use crate::integer::IntegerDecoder;
use crate::static_table;
use bytes::Buf;
use tracing::{debug, trace};

/// Indexed Field Line: `1T......`, T at bit 6.
const INDEXED_STATIC_BIT: u8 = 0x40;
/// Literal Field Line With Name Reference: `01NT....`, T at bit 4.
const LITERAL_NAME_REF_STATIC_BIT: u8 = 0x10;
/// Literal Field Line With Literal Name: `001NH...`, H at bit 3.
const LITERAL_NAME_HUFFMAN_BIT: u8 = 0x08;
/// String literal length byte: `H.......`, H at bit 7.
const STRING_HUFFMAN_BIT: u8 = 0x80;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    RequiredInsertCount,
    RequiredInsertCountContinue,
    Base,
    BaseContinue,
    CompressedHeaders,
    HeaderFieldIndex,
    HeaderNameIndex,
    HeaderNameLength,
    HeaderName,
    HeaderValueLength,
    HeaderValueLengthContinue,
    HeaderValue,
}

/// QPACK decoder for one header-block context (one request/response
/// stream). Not safe for concurrent use; create one per stream.
pub struct Decoder {
    max_headers_length: usize,
    state: State,
    integer: IntegerDecoder,

    // Per-field scratch. The handler borrows `name_buf`/`value_buf` for the
    // duration of each callback; the next field reuses the storage.
    huffman: bool,
    index: Option<usize>,
    string_len: usize,
    string_buf: Vec<u8>,
    name_buf: Vec<u8>,
    value_buf: Vec<u8>,
}

impl Decoder {
    /// Creates a decoder that rejects any single header string longer than
    /// `max_headers_length` bytes (declared, pre-decompression length).
    pub fn new(max_headers_length: usize) -> Self {
        Self {
            max_headers_length,
            state: State::RequiredInsertCount,
            integer: IntegerDecoder::new(),
            huffman: false,
            index: None,
            string_len: 0,
            string_buf: Vec::new(),
            name_buf: Vec::new(),
            value_buf: Vec::new(),
        }
    }

    /// Feeds a slice of header-block bytes through the state machine,
    /// invoking `handler` once per completed field.
    ///
    /// May be called any number of times for one logical block.
    pub fn decode<H: HeaderHandler>(&mut self, data: &[u8], handler: &mut H) -> Result<()> {
        for &byte in data {
            if let Err(err) = self.on_byte(byte, handler) {
                debug!(error = %err, "header block decoding failed");
                return Err(err);
            }
        }
        Ok(())
    }

    /// Feeds every chunk of a [`bytes::Buf`] sequence through the decoder.
    pub fn decode_buf<B: Buf, H: HeaderHandler>(
        &mut self,
        mut buf: B,
        handler: &mut H,
    ) -> Result<()> {
        while buf.has_remaining() {
            let chunk = buf.chunk();
            let len = chunk.len();
            self.decode(chunk, handler)?;
            buf.advance(len);
        }
        Ok(())
    }

    /// Rearms the decoder for a new header block (e.g. trailers after
    /// headers) without releasing buffer capacity.
    pub fn reset(&mut self) {
        trace!("decoder reset");
        self.state = State::RequiredInsertCount;
        self.huffman = false;
        self.index = None;
        self.string_len = 0;
        self.string_buf.clear();
        self.name_buf.clear();
        self.value_buf.clear();
    }

    fn on_byte<H: HeaderHandler>(&mut self, byte: u8, handler: &mut H) -> Result<()> {
        match self.state {
            State::RequiredInsertCount => match self.integer.begin(byte, 8) {
                Some(count) => self.on_required_insert_count(count),
                None => {
                    self.state = State::RequiredInsertCountContinue;
                    Ok(())
                }
            },
            State::RequiredInsertCountContinue => match self.integer.next(byte)? {
                Some(count) => self.on_required_insert_count(count),
                None => Ok(()),
            },
            State::Base => {
                // Bit 7 is the sign S. With a rejected non-zero magnitude
                // the sign never matters: S=1 with delta 0 and S=0 with
                // delta 0 both denote Base = Required Insert Count = 0.
                match self.integer.begin(byte, 7) {
                    Some(delta) => self.on_base(delta),
                    None => {
                        self.state = State::BaseContinue;
                        Ok(())
                    }
                }
            }
            State::BaseContinue => match self.integer.next(byte)? {
                Some(delta) => self.on_base(delta),
                None => Ok(()),
            },
            State::CompressedHeaders => self.on_field_start(byte, handler),
            State::HeaderFieldIndex => match self.integer.next(byte)? {
                Some(index) => self.on_indexed_field(index as usize, handler),
                None => Ok(()),
            },
            State::HeaderNameIndex => match self.integer.next(byte)? {
                Some(index) => self.on_name_index(index as usize),
                None => Ok(()),
            },
            State::HeaderNameLength => match self.integer.next(byte)? {
                Some(length) => self.on_name_length(length as usize),
                None => Ok(()),
            },
            State::HeaderName => {
                self.string_buf.push(byte);
                if self.string_buf.len() == self.string_len {
                    self.process_name()?;
                    self.state = State::HeaderValueLength;
                }
                Ok(())
            }
            State::HeaderValueLength => {
                self.huffman = byte & STRING_HUFFMAN_BIT != 0;
                match self.integer.begin(byte, 7) {
                    Some(length) => self.on_value_length(length as usize, handler),
                    None => {
                        self.state = State::HeaderValueLengthContinue;
                        Ok(())
                    }
                }
            }
            State::HeaderValueLengthContinue => match self.integer.next(byte)? {
                Some(length) => self.on_value_length(length as usize, handler),
                None => Ok(()),
            },
            State::HeaderValue => {
                self.string_buf.push(byte);
                if self.string_buf.len() == self.string_len {
                    self.process_value()?;
                    self.complete_field(handler)?;
                }
                Ok(())
            }
        }
    }

    /// Dispatches on the representation pattern of a field line's first
    /// byte (RFC 9204 Section 4.5).
    fn on_field_start<H: HeaderHandler>(&mut self, byte: u8, handler: &mut H) -> Result<()> {
        if byte & 0b1000_0000 != 0 {
            // Indexed Field Line: 1T......
            if byte & INDEXED_STATIC_BIT == 0 {
                return Err(Error::DynamicTableUnsupported("indexed field line"));
            }
            match self.integer.begin(byte, 6) {
                Some(index) => self.on_indexed_field(index as usize, handler),
                None => {
                    self.state = State::HeaderFieldIndex;
                    Ok(())
                }
            }
        } else if byte & 0b1100_0000 == 0b0100_0000 {
            // Literal Field Line With Name Reference: 01NT....
            if byte & LITERAL_NAME_REF_STATIC_BIT == 0 {
                return Err(Error::DynamicTableUnsupported(
                    "literal field line with dynamic name reference",
                ));
            }
            match self.integer.begin(byte, 4) {
                Some(index) => self.on_name_index(index as usize),
                None => {
                    self.state = State::HeaderNameIndex;
                    Ok(())
                }
            }
        } else if byte & 0b1110_0000 == 0b0010_0000 {
            // Literal Field Line With Literal Name: 001NH...
            self.huffman = byte & LITERAL_NAME_HUFFMAN_BIT != 0;
            match self.integer.begin(byte, 3) {
                Some(length) => self.on_name_length(length as usize),
                None => {
                    self.state = State::HeaderNameLength;
                    Ok(())
                }
            }
        } else if byte & 0b1111_0000 == 0b0001_0000 {
            // Indexed Field Line With Post-Base Index: 0001....
            Err(Error::DynamicTableUnsupported(
                "indexed field line with post-base index",
            ))
        } else {
            // Literal Field Line With Post-Base Name Reference: 0000....
            Err(Error::DynamicTableUnsupported(
                "literal field line with post-base name reference",
            ))
        }
    }

    fn on_required_insert_count(&mut self, count: u32) -> Result<()> {
        if count != 0 {
            return Err(Error::DynamicTableUnsupported("required insert count"));
        }
        self.state = State::Base;
        Ok(())
    }

    fn on_base(&mut self, delta: u32) -> Result<()> {
        if delta != 0 {
            return Err(Error::DynamicTableUnsupported("delta base"));
        }
        self.state = State::CompressedHeaders;
        Ok(())
    }

    fn on_indexed_field<H: HeaderHandler>(
        &mut self,
        index: usize,
        handler: &mut H,
    ) -> Result<()> {
        if index >= static_table::count() {
            return Err(Error::InvalidStaticTableIndex(index));
        }
        handler.on_static_indexed(index);
        self.state = State::CompressedHeaders;
        Ok(())
    }

    fn on_name_index(&mut self, index: usize) -> Result<()> {
        if index >= static_table::count() {
            return Err(Error::InvalidStaticTableIndex(index));
        }
        self.index = Some(index);
        self.state = State::HeaderValueLength;
        Ok(())
    }

    fn on_name_length(&mut self, length: usize) -> Result<()> {
        if length == 0 {
            return Err(Error::InvalidHeaderName);
        }
        self.begin_string(length)?;
        self.state = State::HeaderName;
        Ok(())
    }

    fn on_value_length<H: HeaderHandler>(
        &mut self,
        length: usize,
        handler: &mut H,
    ) -> Result<()> {
        if length == 0 {
            // Empty value: the field is already complete.
            self.value_buf.clear();
            return self.complete_field(handler);
        }
        self.begin_string(length)?;
        self.state = State::HeaderValue;
        Ok(())
    }

    /// Prepares the scratch buffer for a declared string length, enforcing
    /// the size ceiling before any allocation growth.
    fn begin_string(&mut self, length: usize) -> Result<()> {
        if length > self.max_headers_length {
            return Err(Error::HeadersExceedMaxLength {
                length,
                limit: self.max_headers_length,
            });
        }
        self.string_len = length;
        self.string_buf.clear();
        self.string_buf.reserve(length);
        Ok(())
    }

    fn process_name(&mut self) -> Result<()> {
        self.name_buf.clear();
        if self.huffman {
            huffman::decode(&self.string_buf, &mut self.name_buf)?;
        } else {
            self.name_buf.extend_from_slice(&self.string_buf);
        }
        Ok(())
    }

    fn process_value(&mut self) -> Result<()> {
        self.value_buf.clear();
        if self.huffman {
            huffman::decode(&self.string_buf, &mut self.value_buf)?;
        } else {
            self.value_buf.extend_from_slice(&self.string_buf);
        }
        Ok(())
    }

    /// Emits exactly one handler callback for the completed field, then
    /// returns to the compressed-headers state for the next one.
    fn complete_field<H: HeaderHandler>(&mut self, handler: &mut H) -> Result<()> {
        match self.index.take() {
            Some(index) => handler.on_static_indexed_value(index, &self.value_buf),
            None => handler.on_header(&self.name_buf, &self.value_buf),
        }
        self.huffman = false;
        self.string_len = 0;
        self.state = State::CompressedHeaders;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::HeaderHandler;

    #[derive(Debug, PartialEq, Eq)]
    enum Event {
        StaticIndexed(usize),
        StaticIndexedValue(usize, Vec<u8>),
        Header(Vec<u8>, Vec<u8>),
    }

    #[derive(Default)]
    struct Collector {
        events: Vec<Event>,
    }

    impl HeaderHandler for Collector {
        fn on_static_indexed(&mut self, index: usize) {
            self.events.push(Event::StaticIndexed(index));
        }

        fn on_static_indexed_value(&mut self, index: usize, value: &[u8]) {
            self.events
                .push(Event::StaticIndexedValue(index, value.to_vec()));
        }

        fn on_header(&mut self, name: &[u8], value: &[u8]) {
            self.events
                .push(Event::Header(name.to_vec(), value.to_vec()));
        }
    }

    #[test]
    fn test_decode_static_indexed() {
        let mut decoder = Decoder::new(4096);
        let mut collector = Collector::default();

        // Prefix (RIC=0, Base=0), then indexed static 17 (:method GET).
        let data = [0x00, 0x00, 0xC0 | 17];
        decoder.decode(&data, &mut collector).unwrap();

        assert_eq!(collector.events, vec![Event::StaticIndexed(17)]);
    }

    #[test]
    fn test_decode_literal_with_static_name_reference() {
        let mut decoder = Decoder::new(4096);
        let mut collector = Collector::default();

        // Name from static index 1 (:path), literal value "/foo".
        let data = [0x00, 0x00, 0x50 | 1, 0x04, b'/', b'f', b'o', b'o'];
        decoder.decode(&data, &mut collector).unwrap();

        assert_eq!(
            collector.events,
            vec![Event::StaticIndexedValue(1, b"/foo".to_vec())]
        );
    }

    #[test]
    fn test_decode_literal_without_name_reference() {
        let mut decoder = Decoder::new(4096);
        let mut collector = Collector::default();

        let data = [
            0x00, 0x00, // prefix
            0x24, // literal name, no Huffman, length 4
            b't', b'e', b's', b't',
            0x05, // value length 5
            b'v', b'a', b'l', b'u', b'e',
        ];
        decoder.decode(&data, &mut collector).unwrap();

        assert_eq!(
            collector.events,
            vec![Event::Header(b"test".to_vec(), b"value".to_vec())]
        );
    }

    #[test]
    fn test_decode_huffman_value() {
        let mut decoder = Decoder::new(4096);
        let mut collector = Collector::default();

        let mut coded = Vec::new();
        huffman::encode(b"/index.html", &mut coded);
        assert!(coded.len() < 127);

        let mut data = vec![0x00, 0x00, 0x50 | 1, 0x80 | coded.len() as u8];
        data.extend_from_slice(&coded);
        decoder.decode(&data, &mut collector).unwrap();

        assert_eq!(
            collector.events,
            vec![Event::StaticIndexedValue(1, b"/index.html".to_vec())]
        );
    }

    #[test]
    fn test_decode_huffman_name() {
        let mut decoder = Decoder::new(4096);
        let mut collector = Collector::default();

        let mut coded = Vec::new();
        huffman::encode(b"x-foo", &mut coded);
        assert!(coded.len() < 7, "name must fit the 3-bit prefix");

        let mut data = vec![0x00, 0x00, 0x20 | 0x08 | coded.len() as u8];
        data.extend_from_slice(&coded);
        data.extend_from_slice(&[0x03, b'b', b'a', b'r']);
        decoder.decode(&data, &mut collector).unwrap();

        assert_eq!(
            collector.events,
            vec![Event::Header(b"x-foo".to_vec(), b"bar".to_vec())]
        );
    }

    #[test]
    fn test_decode_empty_value() {
        let mut decoder = Decoder::new(4096);
        let mut collector = Collector::default();

        // :authority (index 0) with a zero-length literal value.
        let data = [0x00, 0x00, 0x50, 0x00];
        decoder.decode(&data, &mut collector).unwrap();

        assert_eq!(
            collector.events,
            vec![Event::StaticIndexedValue(0, Vec::new())]
        );
    }

    #[test]
    fn test_nonzero_required_insert_count_rejected() {
        let mut decoder = Decoder::new(4096);
        let mut collector = Collector::default();

        let err = decoder
            .decode(&[0x01, 0x00, 0xC0 | 17], &mut collector)
            .unwrap_err();
        assert_eq!(
            err,
            Error::DynamicTableUnsupported("required insert count")
        );
        assert!(collector.events.is_empty());
    }

    #[test]
    fn test_nonzero_delta_base_rejected() {
        let mut decoder = Decoder::new(4096);
        let mut collector = Collector::default();

        let err = decoder.decode(&[0x00, 0x02], &mut collector).unwrap_err();
        assert_eq!(err, Error::DynamicTableUnsupported("delta base"));
        assert!(collector.events.is_empty());
    }

    #[test]
    fn test_negative_zero_delta_base_accepted() {
        // S=1 with magnitude 0 decodes to integer 0, same as S=0.
        let mut decoder = Decoder::new(4096);
        let mut collector = Collector::default();

        decoder
            .decode(&[0x00, 0x80, 0xC0 | 17], &mut collector)
            .unwrap();
        assert_eq!(collector.events, vec![Event::StaticIndexed(17)]);
    }

    #[test]
    fn test_dynamic_table_representations_rejected() {
        for (first, what) in [
            (0x80u8, "indexed dynamic"),
            (0x40, "literal with dynamic name reference"),
            (0x10, "post-base indexed"),
            (0x00, "post-base name reference"),
        ] {
            let mut decoder = Decoder::new(4096);
            let mut collector = Collector::default();
            let err = decoder
                .decode(&[0x00, 0x00, first], &mut collector)
                .unwrap_err();
            assert!(
                matches!(err, Error::DynamicTableUnsupported(_)),
                "pattern 0x{:02x} ({}) must be rejected, got {:?}",
                first,
                what,
                err
            );
            assert!(collector.events.is_empty());
        }
    }

    #[test]
    fn test_zero_length_name_rejected() {
        let mut decoder = Decoder::new(4096);
        let mut collector = Collector::default();

        // Literal with literal name, declared name length 0.
        let err = decoder
            .decode(&[0x00, 0x00, 0x20], &mut collector)
            .unwrap_err();
        assert_eq!(err, Error::InvalidHeaderName);
        assert!(collector.events.is_empty());
    }

    #[test]
    fn test_oversized_string_rejected() {
        let mut decoder = Decoder::new(16);
        let mut collector = Collector::default();

        // Value length 17 against a 16-byte limit; fails before any value
        // byte is consumed.
        let err = decoder
            .decode(&[0x00, 0x00, 0x50 | 1, 17], &mut collector)
            .unwrap_err();
        assert_eq!(
            err,
            Error::HeadersExceedMaxLength {
                length: 17,
                limit: 16
            }
        );
        assert!(collector.events.is_empty());
    }

    #[test]
    fn test_static_index_out_of_range() {
        let mut decoder = Decoder::new(4096);
        let mut collector = Collector::default();

        // 6-bit prefix saturated (63) plus continuation 36 = index 99.
        let err = decoder
            .decode(&[0x00, 0x00, 0xFF, 36], &mut collector)
            .unwrap_err();
        assert_eq!(err, Error::InvalidStaticTableIndex(99));
    }

    #[test]
    fn test_state_survives_across_decode_calls() {
        let mut decoder = Decoder::new(4096);
        let mut collector = Collector::default();

        let data = [0x00u8, 0x00, 0x50 | 1, 0x04, b'/', b'f', b'o', b'o'];
        for chunk in data.chunks(3) {
            decoder.decode(chunk, &mut collector).unwrap();
        }

        assert_eq!(
            collector.events,
            vec![Event::StaticIndexedValue(1, b"/foo".to_vec())]
        );
    }

    #[test]
    fn test_reset_rearms_for_trailers() {
        let mut decoder = Decoder::new(4096);
        let mut collector = Collector::default();

        decoder
            .decode(&[0x00, 0x00, 0xC0 | 17], &mut collector)
            .unwrap();
        decoder.reset();
        decoder
            .decode(&[0x00, 0x00, 0xC0 | 25], &mut collector)
            .unwrap();

        assert_eq!(
            collector.events,
            vec![Event::StaticIndexed(17), Event::StaticIndexed(25)]
        );
    }

    #[test]
    fn test_decode_buf_chunked_sequence() {
        use bytes::Bytes;

        let mut decoder = Decoder::new(4096);
        let mut collector = Collector::default();

        let front = Bytes::from_static(&[0x00, 0x00, 0xC0 | 17]);
        let back = Bytes::from_static(&[0xC0 | 25]);
        decoder.decode_buf(front.chain(back), &mut collector).unwrap();

        assert_eq!(
            collector.events,
            vec![Event::StaticIndexed(17), Event::StaticIndexed(25)]
        );
    }
}
