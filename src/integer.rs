//! Prefix integer encoding and decoding per RFC 7541 Section 5.1.
//!
//! An integer is represented in two parts: an N-bit prefix (1 ≤ N ≤ 8)
//! filling the remainder of the first byte, and optional continuation
//! bytes when the value does not fit. A prefix of exactly `2^N - 1`
//! always signals continuation bytes, even when the final value equals
//! that boundary — this is the format's ambiguity-breaker.
//!
//! Decoding is streaming (one byte at a time) because the QPACK decoder
//! is fed bytes incrementally; values are bounded to `i32::MAX`.

use crate::error::{Error, Result};

/// Largest value the decoder accepts.
const MAX_VALUE: u64 = i32::MAX as u64;

fn prefix_mask(prefix_bits: u8) -> u8 {
    debug_assert!((1..=8).contains(&prefix_bits), "prefix_bits must be 1-8");
    if prefix_bits == 8 {
        0xFF
    } else {
        (1u8 << prefix_bits) - 1
    }
}

/// Streaming decoder for a single prefix integer.
///
/// State is valid between [`IntegerDecoder::begin`] returning `None` and a
/// subsequent [`IntegerDecoder::next`] returning `Some`.
#[derive(Debug, Default)]
pub struct IntegerDecoder {
    value: u64,
    multiplier: u64,
}

impl IntegerDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts decoding from the low `prefix_bits` bits of `byte`.
    ///
    /// Returns `Some(value)` if the integer fit in the prefix, `None` if
    /// continuation bytes follow (feed them through [`next`]).
    ///
    /// [`next`]: IntegerDecoder::next
    pub fn begin(&mut self, byte: u8, prefix_bits: u8) -> Option<u32> {
        let mask = prefix_mask(prefix_bits);
        let prefix = byte & mask;
        if prefix < mask {
            Some(u32::from(prefix))
        } else {
            self.value = u64::from(mask);
            self.multiplier = 1;
            None
        }
    }

    /// Consumes one continuation byte.
    ///
    /// Bit 7 is the continuation flag, the low 7 bits contribute to the
    /// value. Returns `Some(value)` once the final byte is consumed, or
    /// `Error::IntegerOverflow` if the running total leaves the 32-bit
    /// range.
    pub fn next(&mut self, byte: u8) -> Result<Option<u32>> {
        self.value = u64::from(byte & 0x7F)
            .checked_mul(self.multiplier)
            .and_then(|v| v.checked_add(self.value))
            .ok_or(Error::IntegerOverflow)?;
        if self.value > MAX_VALUE {
            return Err(Error::IntegerOverflow);
        }

        if byte & 0x80 == 0 {
            return Ok(Some(self.value as u32));
        }
        self.multiplier = self
            .multiplier
            .checked_mul(128)
            .ok_or(Error::IntegerOverflow)?;
        Ok(None)
    }
}

/// Encodes `value` with an N-bit prefix into `dst`.
///
/// `mask` is ORed into the high bits of the first byte (the field's
/// representation pattern). Returns the number of bytes written, or
/// `Error::BufferTooSmall` with the required size — in which case nothing
/// has been written.
pub fn encode(value: u32, prefix_bits: u8, mask: u8, dst: &mut [u8]) -> Result<usize> {
    let max_prefix = prefix_mask(prefix_bits);

    let needed = encoded_len(value, prefix_bits);
    if dst.len() < needed {
        return Err(Error::BufferTooSmall(needed));
    }

    if value < u32::from(max_prefix) {
        dst[0] = mask | value as u8;
        return Ok(1);
    }

    dst[0] = mask | max_prefix;
    let mut remaining = value - u32::from(max_prefix);
    let mut pos = 1;
    while remaining >= 128 {
        dst[pos] = (remaining & 0x7F) as u8 | 0x80;
        remaining >>= 7;
        pos += 1;
    }
    dst[pos] = remaining as u8;
    Ok(pos + 1)
}

/// Number of bytes `encode` will write for `value` under an N-bit prefix.
pub fn encoded_len(value: u32, prefix_bits: u8) -> usize {
    let max_prefix = u32::from(prefix_mask(prefix_bits));
    if value < max_prefix {
        return 1;
    }
    let mut len = 2;
    let mut remaining = value - max_prefix;
    while remaining >= 128 {
        remaining >>= 7;
        len += 1;
    }
    len
}
