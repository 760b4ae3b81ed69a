//! Signed-magnitude little-endian 64-bit integer encoding used for every
//! field of the patch header.
//!
//! Grounded on `examples/original_source/source/bsdiff.c`'s `offtout`/
//! `offtin` helpers: the magnitude occupies bits 0–62 (little-endian byte
//! order), and bit 7 of byte 7 carries the sign. Zero always uses the
//! positive encoding — `offtout` compares `x < 0` strictly before negating,
//! so there is no legal encoding of negative zero.

use crate::error::{Error, Result};

/// The largest magnitude this encoding can represent.
pub const MAX_MAGNITUDE: i64 = i64::MAX;

/// Encodes `value` into the 8-byte signed-magnitude little-endian form.
///
/// `value` must fit the full `i64` range; since `i64::MIN`'s magnitude
/// (`2^63`) does not fit in 63 bits, it is rejected as [`Error::SizeTooLarge`].
pub fn encode(value: i64) -> Result<[u8; 8]> {
    if value == i64::MIN {
        return Err(Error::SizeTooLarge(
            "offset magnitude exceeds 63 bits".into(),
        ));
    }
    let negative = value < 0;
    let mut magnitude = value.unsigned_abs();
    let mut out = [0u8; 8];
    for byte in out.iter_mut() {
        *byte = (magnitude & 0xff) as u8;
        magnitude >>= 8;
    }
    if negative {
        out[7] |= 0x80;
    }
    Ok(out)
}

/// Decodes an 8-byte signed-magnitude little-endian field back into a
/// signed value. The positive and (non-canonical) negative encodings of
/// zero both decode to `0`.
pub fn decode(bytes: [u8; 8]) -> i64 {
    let negative = bytes[7] & 0x80 != 0;
    let mut magnitude: u64 = 0;
    for (i, &b) in bytes.iter().enumerate() {
        let b = if i == 7 { b & 0x7f } else { b };
        magnitude |= (b as u64) << (8 * i);
    }
    if negative {
        -(magnitude as i64)
    } else {
        magnitude as i64
    }
}
