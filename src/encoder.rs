//! Stateless QPACK field-section encoding helpers.
//!
//! Each function serializes one piece of a header block into a
//! caller-supplied buffer and returns the number of bytes written.
//! `Error::BufferTooSmall` means "retry with a larger buffer"; the
//! destination contents are unspecified after a failure but no partial
//! field is ever reported as written.
//!
//! Output never sets the Huffman bit: string literals go on the wire raw,
//! so every name/value byte must be ASCII. Header names are forced to
//! lowercase as QPACK requires.

use crate::error::{Error, Result};
use crate::integer;

/// `1T......` with T=1: indexed field line, static table.
const INDEXED_STATIC_PATTERN: u8 = 0b1100_0000;
/// `01NT....` with N=0, T=1: literal field line, static name reference.
const LITERAL_NAME_REF_PATTERN: u8 = 0b0101_0000;
/// `001NH...` with N=0, H=0: literal field line, literal name.
const LITERAL_PATTERN: u8 = 0b0010_0000;

/// Encodes the header block prefix: Required Insert Count = 0 and
/// Delta Base = 0 (sign bit 0), declaring that no dynamic table is in
/// use. Must precede any encoded field lines.
pub fn encode_header_block_prefix(dst: &mut [u8]) -> Result<usize> {
    if dst.len() < 2 {
        return Err(Error::BufferTooSmall(2));
    }
    dst[0] = 0x00;
    dst[1] = 0x00;
    Ok(2)
}

/// Encodes an indexed field line referencing static table entry `index`
/// (both name and value come from the table).
pub fn encode_static_indexed_field(index: usize, dst: &mut [u8]) -> Result<usize> {
    integer::encode(index as u32, 6, INDEXED_STATIC_PATTERN, dst)
}

/// Encodes a literal field line whose name references static table entry
/// `index` and whose value is a literal string.
pub fn encode_literal_with_static_name_reference(
    index: usize,
    value: &[u8],
    dst: &mut [u8],
) -> Result<usize> {
    let mut offset = integer::encode(index as u32, 4, LITERAL_NAME_REF_PATTERN, dst)?;
    offset += encode_value_string(&[value], b"", &mut dst[offset..])?;
    Ok(offset)
}

/// Like [`encode_literal_with_static_name_reference`], but folds several
/// value parts into a single value, joined by `separator` (Cookie-style
/// multi-valued headers).
pub fn encode_literal_with_static_name_reference_parts(
    index: usize,
    values: &[&[u8]],
    separator: &[u8],
    dst: &mut [u8],
) -> Result<usize> {
    let mut offset = integer::encode(index as u32, 4, LITERAL_NAME_REF_PATTERN, dst)?;
    offset += encode_value_string(values, separator, &mut dst[offset..])?;
    Ok(offset)
}

/// Encodes a literal field line carrying both name and value as literal
/// strings. The name is lowercased on the way out.
pub fn encode_literal_without_name_reference(
    name: &[u8],
    value: &[u8],
    dst: &mut [u8],
) -> Result<usize> {
    let mut offset = encode_name_string(name, dst)?;
    offset += encode_value_string(&[value], b"", &mut dst[offset..])?;
    Ok(offset)
}

/// Like [`encode_literal_without_name_reference`], with multi-part value
/// folding.
pub fn encode_literal_without_name_reference_parts(
    name: &[u8],
    values: &[&[u8]],
    separator: &[u8],
    dst: &mut [u8],
) -> Result<usize> {
    let mut offset = encode_name_string(name, dst)?;
    offset += encode_value_string(values, separator, &mut dst[offset..])?;
    Ok(offset)
}

/// Writes a literal name: 3-bit-prefix length, then lowercased ASCII
/// bytes.
fn encode_name_string(name: &[u8], dst: &mut [u8]) -> Result<usize> {
    let offset = integer::encode(string_len(name.len())?, 3, LITERAL_PATTERN, dst)?;
    if dst.len() - offset < name.len() {
        return Err(Error::BufferTooSmall(offset + name.len()));
    }
    for (i, &b) in name.iter().enumerate() {
        if b > 127 {
            return Err(Error::InvalidEncodingCharacter(b));
        }
        // QPACK requires lowercase field names.
        dst[offset + i] = if b.is_ascii_uppercase() { b | 0x20 } else { b };
    }
    Ok(offset + name.len())
}

/// Writes a value string: H=0 flag, 7-bit-prefix total length, then the
/// parts joined by `separator`.
fn encode_value_string(values: &[&[u8]], separator: &[u8], dst: &mut [u8]) -> Result<usize> {
    let total: usize = values.iter().map(|v| v.len()).sum::<usize>()
        + separator.len() * values.len().saturating_sub(1);

    let mut offset = integer::encode(string_len(total)?, 7, 0x00, dst)?;
    if dst.len() - offset < total {
        return Err(Error::BufferTooSmall(offset + total));
    }
    for (i, value) in values.iter().enumerate() {
        if i > 0 {
            dst[offset..offset + separator.len()].copy_from_slice(separator);
            offset += separator.len();
        }
        for &b in value.iter() {
            if b > 127 {
                return Err(Error::InvalidEncodingCharacter(b));
            }
            dst[offset] = b;
            offset += 1;
        }
    }
    Ok(offset)
}

fn string_len(len: usize) -> Result<u32> {
    u32::try_from(len)
        .ok()
        .filter(|&l| l <= i32::MAX as u32)
        .ok_or(Error::IntegerOverflow)
}
