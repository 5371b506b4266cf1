//! Primitive decoders: unaligned fixed-width reads and LEB128.
//!
//! Every byte the library pulls out of a section goes through these
//! functions, so all bounds logic lives in one place. They are pure: a
//! failed read consumes nothing and mutates nothing.

use crate::core::{DwarfError, Endianness, Result};

/// Read `width` bytes (1..=8) at `offset` and convert to host order.
///
/// The raw read never sign-extends; see [`sign_extend`] for signed
/// interpretations of fixed-width constants.
pub(crate) fn read_unsigned(
    data: &[u8],
    offset: usize,
    width: usize,
    endian: Endianness,
) -> Result<u64> {
    debug_assert!((1..=8).contains(&width));
    let end = offset.checked_add(width).ok_or(DwarfError::OutOfBounds {
        offset: offset as u64,
        len: width as u64,
        size: data.len() as u64,
    })?;
    if end > data.len() {
        return Err(DwarfError::OutOfBounds {
            offset: offset as u64,
            len: width as u64,
            size: data.len() as u64,
        });
    }
    let bytes = &data[offset..end];
    let mut value: u64 = 0;
    match endian {
        Endianness::Little => {
            for &byte in bytes.iter().rev() {
                value = (value << 8) | u64::from(byte);
            }
        }
        Endianness::Big => {
            for &byte in bytes {
                value = (value << 8) | u64::from(byte);
            }
        }
    }
    Ok(value)
}

/// Sign-extend a raw `width`-byte value read by [`read_unsigned`].
pub(crate) fn sign_extend(value: u64, width: usize) -> i64 {
    debug_assert!((1..=8).contains(&width));
    let shift = 64 - width * 8;
    ((value << shift) as i64) >> shift
}

/// Decode an unsigned LEB128 value at `offset`.
///
/// Returns the value and the number of bytes consumed. Decoding stops at
/// the first byte with the continuation bit clear; running off the end of
/// the buffer first is `OutOfBounds`. Payload bits beyond 64 are consumed
/// but discarded.
pub(crate) fn read_uleb128(data: &[u8], offset: usize) -> Result<(u64, usize)> {
    let mut value: u64 = 0;
    let mut shift: u32 = 0;
    let mut cursor = offset;
    loop {
        let Some(&byte) = data.get(cursor) else {
            return Err(DwarfError::OutOfBounds {
                offset: offset as u64,
                len: (cursor - offset + 1) as u64,
                size: data.len() as u64,
            });
        };
        cursor += 1;
        if shift < 64 {
            value |= u64::from(byte & 0x7f) << shift;
        }
        if byte & 0x80 == 0 {
            return Ok((value, cursor - offset));
        }
        shift += 7;
    }
}

/// Decode a signed LEB128 value at `offset`.
///
/// Two's-complement sign extension from the final group's sign bit.
pub(crate) fn read_sleb128(data: &[u8], offset: usize) -> Result<(i64, usize)> {
    let mut value: u64 = 0;
    let mut shift: u32 = 0;
    let mut cursor = offset;
    loop {
        let Some(&byte) = data.get(cursor) else {
            return Err(DwarfError::OutOfBounds {
                offset: offset as u64,
                len: (cursor - offset + 1) as u64,
                size: data.len() as u64,
            });
        };
        cursor += 1;
        if shift < 64 {
            value |= u64::from(byte & 0x7f) << shift;
        }
        shift += 7;
        if byte & 0x80 == 0 {
            if shift < 64 && byte & 0x40 != 0 {
                value |= u64::MAX << shift;
            }
            return Ok((value as i64, cursor - offset));
        }
    }
}
