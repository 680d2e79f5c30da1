//! Compact unsigned integers.
//!
//! Variable-length encoding used only for length and count prefixes. The low
//! two bits of the first byte select the mode:
//!
//! | mode | range              | layout                                            |
//! |------|--------------------|---------------------------------------------------|
//! | 0b00 | 0 ..= 63           | 1 byte, `n << 2`                                  |
//! | 0b01 | 64 ..= 2^14 - 1    | 2 bytes LE, `(n << 2) \| 1`                       |
//! | 0b10 | 2^14 ..= 2^30 - 1  | 4 bytes LE, `(n << 2) \| 2`                       |
//! | 0b11 | 2^30 ..            | 1 byte `((len - 4) << 2) \| 3`, then `len` LE bytes |
//!
//! Magnitudes are carried as `U256`, so mode 3 is limited to 32 bytes.
//! Decoding accepts only the canonical (smallest) mode for a value.

use crate::error::CodecError;
use alloy_primitives::U256;

pub const SINGLE_BYTE_MAX: u64 = (1 << 6) - 1;
pub const TWO_BYTE_MAX: u64 = (1 << 14) - 1;
pub const FOUR_BYTE_MAX: u64 = (1 << 30) - 1;

/// Largest mode-3 magnitude length representable as `U256`.
pub const MAX_BIG_INT_BYTES: usize = 32;

const MODE_MASK: u8 = 0b11;

/// Append the compact encoding of `n` to `out`.
pub fn encode_compact_into(n: U256, out: &mut Vec<u8>) {
    if n <= U256::from(SINGLE_BYTE_MAX) {
        out.push((low_u64(n) as u8) << 2);
    } else if n <= U256::from(TWO_BYTE_MAX) {
        let v = ((low_u64(n) as u16) << 2) | 0b01;
        out.extend_from_slice(&v.to_le_bytes());
    } else if n <= U256::from(FOUR_BYTE_MAX) {
        let v = ((low_u64(n) as u32) << 2) | 0b10;
        out.extend_from_slice(&v.to_le_bytes());
    } else {
        // n >= 2^30 always needs at least 4 bytes
        let len = n.byte_len();
        out.push((((len - 4) as u8) << 2) | 0b11);
        let le = n.to_le_bytes::<32>();
        out.extend_from_slice(&le[..len]);
    }
}

pub fn encode_compact(n: U256) -> Vec<u8> {
    let mut out = Vec::with_capacity(5);
    encode_compact_into(n, &mut out);
    out
}

/// Compact encoding of a length or count.
pub fn encode_compact_len(len: usize) -> Vec<u8> {
    encode_compact(U256::from(len as u64))
}

/// Decode a compact integer starting at `offset`.
///
/// Returns `(n, bytes_consumed)`.
pub fn decode_compact(bytes: &[u8], offset: usize) -> Result<(U256, usize), CodecError> {
    let first = *bytes
        .get(offset)
        .ok_or_else(|| CodecError::malformed(offset, "no bytes left for prefix"))?;

    match first & MODE_MASK {
        0b00 => Ok((U256::from(u64::from(first >> 2)), 1)),
        0b01 => {
            let raw = take::<2>(bytes, offset)?;
            let v = u64::from(u16::from_le_bytes(raw) >> 2);
            if v <= SINGLE_BYTE_MAX {
                return Err(non_canonical(offset, v));
            }
            Ok((U256::from(v), 2))
        }
        0b10 => {
            let raw = take::<4>(bytes, offset)?;
            let v = u64::from(u32::from_le_bytes(raw) >> 2);
            if v <= TWO_BYTE_MAX {
                return Err(non_canonical(offset, v));
            }
            Ok((U256::from(v), 4))
        }
        _ => {
            let len = usize::from(first >> 2) + 4;
            if len > MAX_BIG_INT_BYTES {
                return Err(CodecError::malformed(
                    offset,
                    format!("big-integer length {len} exceeds {MAX_BIG_INT_BYTES} bytes"),
                ));
            }
            let start = offset + 1;
            let raw = bytes.get(start..start + len).ok_or_else(|| {
                CodecError::malformed(
                    offset,
                    format!(
                        "big-integer mode needs {len} bytes, {} remaining",
                        bytes.len().saturating_sub(start)
                    ),
                )
            })?;
            if raw[len - 1] == 0 {
                return Err(CodecError::malformed(
                    offset,
                    "big-integer magnitude has a superfluous zero byte",
                ));
            }
            let n = U256::from_le_slice(raw);
            if n <= U256::from(FOUR_BYTE_MAX) {
                return Err(CodecError::malformed(
                    offset,
                    format!("value {n} must use a shorter mode"),
                ));
            }
            Ok((n, 1 + len))
        }
    }
}

/// Decode a compact length or count as `usize`.
pub fn decode_compact_len(bytes: &[u8], offset: usize) -> Result<(usize, usize), CodecError> {
    let (n, consumed) = decode_compact(bytes, offset)?;
    let len = to_usize(n).ok_or_else(|| {
        CodecError::malformed(offset, format!("length {n} does not fit in usize"))
    })?;
    Ok((len, consumed))
}

/// Number of bytes the compact encoding of `n` occupies.
pub fn compact_len(n: U256) -> usize {
    if n <= U256::from(SINGLE_BYTE_MAX) {
        1
    } else if n <= U256::from(TWO_BYTE_MAX) {
        2
    } else if n <= U256::from(FOUR_BYTE_MAX) {
        4
    } else {
        1 + n.byte_len()
    }
}

pub(crate) fn to_usize(n: U256) -> Option<usize> {
    let limbs = n.as_limbs();
    if limbs[1..].iter().any(|&l| l != 0) {
        return None;
    }
    usize::try_from(limbs[0]).ok()
}

fn low_u64(n: U256) -> u64 {
    n.as_limbs()[0]
}

fn take<const N: usize>(bytes: &[u8], offset: usize) -> Result<[u8; N], CodecError> {
    let raw = bytes.get(offset..offset + N).ok_or_else(|| {
        CodecError::malformed(
            offset,
            format!(
                "{N}-byte mode, {} bytes remaining",
                bytes.len().saturating_sub(offset)
            ),
        )
    })?;
    let mut out = [0u8; N];
    out.copy_from_slice(raw);
    Ok(out)
}

fn non_canonical(offset: usize, v: u64) -> CodecError {
    CodecError::malformed(offset, format!("value {v} must use a shorter mode"))
}
