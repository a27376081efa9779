//! Code Point Conversions
//!
//! Pure functions converting a 32-bit code point to and from UTF-16 code
//! units and UTF-8 byte sequences. Decoders return the value together with
//! the number of units consumed so callers can walk a buffer.
//!
//! All functions are reentrant and hold no state.

use super::encoding::Encoding;
use super::error::{CodecError, Result};

/// A Unicode code point, 0..=0x10FFFF
pub type CodePoint = u32;

pub const MAX_CODEPOINT: CodePoint = 0x10FFFF;

pub const HIGH_SURROGATE_START: u16 = 0xD800;
pub const HIGH_SURROGATE_END: u16 = 0xDBFF;
pub const LOW_SURROGATE_START: u16 = 0xDC00;
pub const LOW_SURROGATE_END: u16 = 0xDFFF;

const SUPPLEMENTARY_BASE: CodePoint = 0x10000;

#[inline]
pub fn is_high_surrogate(unit: u16) -> bool {
    (HIGH_SURROGATE_START..=HIGH_SURROGATE_END).contains(&unit)
}

#[inline]
pub fn is_low_surrogate(unit: u16) -> bool {
    (LOW_SURROGATE_START..=LOW_SURROGATE_END).contains(&unit)
}

/// True for code points reserved for surrogate halves
#[inline]
pub fn is_surrogate(cp: CodePoint) -> bool {
    (0xD800..=0xDFFF).contains(&cp)
}

/// True for code points that may stand alone in text
#[inline]
pub fn is_scalar_value(cp: CodePoint) -> bool {
    cp <= MAX_CODEPOINT && !is_surrogate(cp)
}

/// Validate a standalone code point, reporting `position` on failure
pub fn check_scalar(cp: CodePoint, position: usize) -> Result<()> {
    if cp > MAX_CODEPOINT {
        Err(CodecError::invalid(Encoding::Ucs4, cp, position, "code point out of range"))
    } else if is_surrogate(cp) {
        Err(CodecError::invalid(Encoding::Ucs4, cp, position, "surrogate code point"))
    } else {
        Ok(())
    }
}

/// A decoded code point and the number of units it occupied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decoded {
    pub value: CodePoint,
    pub consumed: usize,
}

// ============================================================================
// UTF-16
// ============================================================================

/// One or two UTF-16 code units encoding a single code point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Utf16Units {
    units: [u16; 2],
    len: usize,
}

impl Utf16Units {
    #[inline]
    pub fn as_slice(&self) -> &[u16] {
        &self.units[..self.len]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// True when the code point needed a surrogate pair
    #[inline]
    pub fn is_pair(&self) -> bool {
        self.len == 2
    }
}

/// Encode a code point as UTF-16.
///
/// Values below 0x10000 are returned as a single unit without checking the
/// surrogate range; use [`check_scalar`] first when the input is untrusted.
#[inline]
pub fn codepoint_to_utf16(cp: CodePoint) -> Utf16Units {
    if cp < SUPPLEMENTARY_BASE {
        Utf16Units {
            units: [cp as u16, 0],
            len: 1,
        }
    } else {
        let value = cp - SUPPLEMENTARY_BASE;
        Utf16Units {
            units: [
                HIGH_SURROGATE_START + (value >> 10) as u16,
                LOW_SURROGATE_START + (value & 0x3FF) as u16,
            ],
            len: 2,
        }
    }
}

/// Decode the code point starting at `units[pos]`
pub fn decode_utf16(units: &[u16], pos: usize) -> Result<Decoded> {
    let first = match units.get(pos) {
        Some(&unit) => unit,
        None => return Err(CodecError::index("pos", pos)),
    };

    if is_high_surrogate(first) {
        match units.get(pos + 1) {
            Some(&low) if is_low_surrogate(low) => {
                let value = SUPPLEMENTARY_BASE
                    + (((first - HIGH_SURROGATE_START) as CodePoint) << 10)
                    + (low - LOW_SURROGATE_START) as CodePoint;
                Ok(Decoded { value, consumed: 2 })
            }
            Some(&other) => Err(CodecError::invalid(
                Encoding::Utf16,
                other as u32,
                pos + 1,
                "expected low surrogate after high surrogate",
            )),
            None => Err(CodecError::invalid(
                Encoding::Utf16,
                first as u32,
                pos,
                "high surrogate at end of input",
            )),
        }
    } else if is_low_surrogate(first) {
        Err(CodecError::invalid(
            Encoding::Utf16,
            first as u32,
            pos,
            "unpaired low surrogate",
        ))
    } else {
        Ok(Decoded {
            value: first as CodePoint,
            consumed: 1,
        })
    }
}

/// Translate a code point index into a code unit offset.
///
/// With `allow_last`, an index equal to the code point count returns
/// `units.len()` instead of failing.
pub fn offset_of_index(units: &[u16], index: usize, allow_last: bool) -> Result<usize> {
    let mut offset = 0;
    let mut count = 0;

    while offset < units.len() {
        if count == index {
            return Ok(offset);
        }
        offset += decode_utf16(units, offset)?.consumed;
        count += 1;
    }

    if count == index && allow_last {
        Ok(offset)
    } else {
        Err(CodecError::index("index", index))
    }
}

/// Number of code points in a UTF-16 buffer
pub fn codepoint_count(units: &[u16]) -> Result<usize> {
    let mut offset = 0;
    let mut count = 0;
    while offset < units.len() {
        offset += decode_utf16(units, offset)?.consumed;
        count += 1;
    }
    Ok(count)
}

/// Check that a UTF-16 buffer holds only well-formed surrogate pairs
pub fn validate_utf16(units: &[u16]) -> Result<()> {
    codepoint_count(units).map(|_| ())
}

// ============================================================================
// UTF-8
// ============================================================================

/// One to four bytes encoding a single code point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Utf8Bytes {
    bytes: [u8; 4],
    len: usize,
}

impl Utf8Bytes {
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Encode a code point as UTF-8
#[inline]
pub fn codepoint_to_utf8(cp: CodePoint) -> Utf8Bytes {
    let cont = |shift: u32| 0x80 | ((cp >> shift) & 0x3F) as u8;
    match cp {
        0..=0x7F => Utf8Bytes {
            bytes: [cp as u8, 0, 0, 0],
            len: 1,
        },
        0x80..=0x7FF => Utf8Bytes {
            bytes: [0xC0 | (cp >> 6) as u8, cont(0), 0, 0],
            len: 2,
        },
        0x800..=0xFFFF => Utf8Bytes {
            bytes: [0xE0 | (cp >> 12) as u8, cont(6), cont(0), 0],
            len: 3,
        },
        _ => Utf8Bytes {
            bytes: [0xF0 | ((cp >> 18) & 0x07) as u8, cont(12), cont(6), cont(0)],
            len: 4,
        },
    }
}

/// Decode the code point starting at `bytes[pos]`.
///
/// Errors report the position and value of the sequence's lead byte.
pub fn decode_utf8(bytes: &[u8], pos: usize) -> Result<Decoded> {
    let lead = match bytes.get(pos) {
        Some(&b) => b,
        None => return Err(CodecError::index("pos", pos)),
    };
    let fail = |description| CodecError::invalid(Encoding::Utf8, lead as u32, pos, description);

    let (len, mut value) = match lead.leading_ones() {
        0 => {
            return Ok(Decoded {
                value: lead as CodePoint,
                consumed: 1,
            })
        }
        1 => return Err(fail("unexpected continuation byte")),
        2 if lead >= 0xC2 => (2, (lead & 0x1F) as CodePoint),
        2 => return Err(fail("overlong two-byte sequence")),
        3 => (3, (lead & 0x0F) as CodePoint),
        4 if lead < 0xF5 => (4, (lead & 0x07) as CodePoint),
        _ => return Err(fail("invalid lead byte")),
    };

    let tail = match bytes.get(pos + 1..pos + len) {
        Some(tail) => tail,
        None => return Err(fail("truncated sequence")),
    };
    for &b in tail {
        if b & 0xC0 != 0x80 {
            return Err(fail("invalid continuation byte"));
        }
        value = (value << 6) | (b & 0x3F) as CodePoint;
    }

    match len {
        3 if value < 0x800 => Err(fail("overlong three-byte sequence")),
        3 if is_surrogate(value) => Err(fail("encoded surrogate")),
        4 if !(SUPPLEMENTARY_BASE..=MAX_CODEPOINT).contains(&value) => {
            Err(fail("four-byte sequence out of range"))
        }
        _ => Ok(Decoded {
            value,
            consumed: len,
        }),
    }
}
