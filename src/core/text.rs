//! Unicode Text Value
//!
//! `UnicodeText` holds text as canonical UTF-16 code units. Two codecs feed
//! and drain that storage:
//! - UTF-8: `assign_utf8`, `assign_utf8_nul`, `write_utf8`
//! - UTF-16: `assign_utf16`, `assign_utf16_nul`, `assign_utf16_bytes`, `write_utf16`
//!
//! Every construction path validates the whole input before it touches the
//! stored units, so a lone or misordered surrogate never persists.
//!
//! Offsets passed to `substr`, `erase` and `find` are code unit offsets.
//! Accessors named `*_index` take code point indices.

use super::codepoint::{
    check_scalar, codepoint_count, codepoint_to_utf16, codepoint_to_utf8, decode_utf16,
    decode_utf8, is_high_surrogate, is_low_surrogate, offset_of_index, validate_utf16, CodePoint,
};
use super::encoding::{Encoding, UTF16BE_BOM, UTF16LE_BOM, UTF8_BOM};
use super::error::{CodecError, Result};
use memchr::memchr;
use std::cmp::Ordering;
use std::fmt::{self, Write as _};

const BOM_UNIT: u16 = 0xFEFF;

/// Text stored as validated UTF-16 code units
///
/// Equality, ordering and hashing compare code units, so two canonically
/// equivalent but differently composed strings are not equal.
#[derive(Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UnicodeText {
    units: Vec<u16>,
}

impl UnicodeText {
    /// Create an empty text value
    #[inline]
    pub fn new() -> Self {
        UnicodeText { units: Vec::new() }
    }

    // ========================================================================
    // Construction
    // ========================================================================

    /// Build from counted UTF-16 code units
    pub fn from_utf16(units: &[u16]) -> Result<Self> {
        let mut text = UnicodeText::new();
        text.assign_utf16(units)?;
        Ok(text)
    }

    /// Build from UTF-8 bytes
    pub fn from_utf8(bytes: &[u8]) -> Result<Self> {
        let mut text = UnicodeText::new();
        text.assign_utf8(bytes)?;
        Ok(text)
    }

    /// Build from a Rust string. Cannot fail.
    pub fn from_utf8_str(s: &str) -> Self {
        UnicodeText {
            units: s.encode_utf16().collect(),
        }
    }

    /// Wrap units already known to be well formed, such as a slice of
    /// another `UnicodeText` cut on code point boundaries
    #[inline]
    pub(crate) fn from_valid_units(units: &[u16]) -> Self {
        UnicodeText {
            units: units.to_vec(),
        }
    }

    /// Build from a document's raw bytes, choosing the codec from its BOM
    /// or first bytes
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let mut text = UnicodeText::new();
        match Encoding::detect(bytes) {
            encoding @ (Encoding::Utf16Le | Encoding::Utf16Be) => {
                text.units = units_from_bytes(bytes, encoding)?;
            }
            _ => text.assign_utf8(bytes)?,
        }
        Ok(text)
    }

    /// Replace the content with counted UTF-16 code units.
    ///
    /// A leading U+FEFF is dropped.
    pub fn assign_utf16(&mut self, units: &[u16]) -> Result<()> {
        let start = usize::from(units.first() == Some(&BOM_UNIT));
        let body = &units[start..];
        validate_utf16(body).map_err(|e| e.relocate(Encoding::Utf16, start, 1))?;
        self.units.clear();
        self.units.extend_from_slice(body);
        Ok(())
    }

    /// Replace the content with NUL-terminated UTF-16 code units
    pub fn assign_utf16_nul(&mut self, units: &[u16]) -> Result<()> {
        let end = units.iter().position(|&u| u == 0).unwrap_or(units.len());
        self.assign_utf16(&units[..end])
    }

    /// Replace the content with UTF-16 bytes.
    ///
    /// Bytes are little-endian unless they open with the big-endian BOM.
    pub fn assign_utf16_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        let encoding = if bytes.starts_with(&UTF16BE_BOM) {
            Encoding::Utf16Be
        } else {
            Encoding::Utf16Le
        };
        self.units = units_from_bytes(bytes, encoding)?;
        Ok(())
    }

    /// Replace the content with counted UTF-8 bytes.
    ///
    /// A leading `EF BB BF` is dropped.
    pub fn assign_utf8(&mut self, bytes: &[u8]) -> Result<()> {
        let mut pos = Encoding::Utf8.bom_len(bytes);
        let mut units = Vec::with_capacity(bytes.len() - pos);
        while pos < bytes.len() {
            let decoded = decode_utf8(bytes, pos)?;
            units.extend_from_slice(codepoint_to_utf16(decoded.value).as_slice());
            pos += decoded.consumed;
        }
        self.units = units;
        Ok(())
    }

    /// Replace the content with NUL-terminated UTF-8 bytes
    pub fn assign_utf8_nul(&mut self, bytes: &[u8]) -> Result<()> {
        let end = memchr(0, bytes).unwrap_or(bytes.len());
        self.assign_utf8(&bytes[..end])
    }

    /// Replace the content with 7-bit ASCII bytes
    pub fn assign_ascii(&mut self, bytes: &[u8]) -> Result<()> {
        if let Some(pos) = bytes.iter().position(|b| !b.is_ascii()) {
            return Err(CodecError::invalid(
                Encoding::Ascii,
                bytes[pos] as u32,
                pos,
                "byte outside 7-bit range",
            ));
        }
        self.units.clear();
        self.units.extend(bytes.iter().map(|&b| b as u16));
        Ok(())
    }

    // ========================================================================
    // Storage access
    // ========================================================================

    /// The stored code units
    #[inline]
    pub fn as_units(&self) -> &[u16] {
        &self.units
    }

    /// Number of code units
    #[inline]
    pub fn len(&self) -> usize {
        self.units.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    #[inline]
    pub fn clear(&mut self) {
        self.units.clear();
    }

    /// True if every code point is ASCII space, tab, CR or LF
    pub fn is_whitespace(&self) -> bool {
        self.units
            .iter()
            .all(|&u| matches!(u, 0x20 | 0x09 | 0x0D | 0x0A))
    }

    // ========================================================================
    // Mutation
    // ========================================================================

    /// Append another text value
    #[inline]
    pub fn append(&mut self, other: &UnicodeText) {
        self.units.extend_from_slice(&other.units);
    }

    /// Append UTF-16 code units after validating them
    pub fn append_units(&mut self, units: &[u16]) -> Result<()> {
        validate_utf16(units)?;
        self.units.extend_from_slice(units);
        Ok(())
    }

    /// Append a Rust string
    #[inline]
    pub fn push_str(&mut self, s: &str) {
        self.units.extend(s.encode_utf16());
    }

    /// Append one code point; surrogates and values past U+10FFFF fail
    pub fn push_codepoint(&mut self, cp: CodePoint) -> Result<()> {
        check_scalar(cp, self.units.len())?;
        self.units
            .extend_from_slice(codepoint_to_utf16(cp).as_slice());
        Ok(())
    }

    /// Remove up to `count` code units starting at `pos`
    pub fn erase(&mut self, pos: usize, count: usize) -> Result<()> {
        if pos >= self.units.len() {
            if pos == 0 {
                return Ok(());
            }
            return Err(CodecError::index("pos", pos));
        }
        let end = pos.saturating_add(count).min(self.units.len());
        self.check_boundary(pos)?;
        self.check_boundary(end)?;
        self.units.drain(pos..end);
        Ok(())
    }

    /// Copy up to `count` code units starting at `pos`
    pub fn substr(&self, pos: usize, count: usize) -> Result<UnicodeText> {
        if pos > self.units.len() {
            return Err(CodecError::index("pos", pos));
        }
        let end = pos.saturating_add(count).min(self.units.len());
        self.check_boundary(pos)?;
        self.check_boundary(end)?;
        Ok(UnicodeText {
            units: self.units[pos..end].to_vec(),
        })
    }

    /// Replace the code point at `index`, or append when `index` is one
    /// past the last code point
    pub fn set_codepoint_at_index(&mut self, index: usize, cp: CodePoint) -> Result<()> {
        check_scalar(cp, index)?;
        let offset = offset_of_index(&self.units, index, true)?;
        let encoded = codepoint_to_utf16(cp);
        if offset == self.units.len() {
            self.units.extend_from_slice(encoded.as_slice());
            return Ok(());
        }
        let old = decode_utf16(&self.units, offset)?.consumed;
        self.units
            .splice(offset..offset + old, encoded.as_slice().iter().copied());
        Ok(())
    }

    /// Fails if `offset` falls between the halves of a surrogate pair
    fn check_boundary(&self, offset: usize) -> Result<()> {
        if offset > 0
            && offset < self.units.len()
            && is_low_surrogate(self.units[offset])
            && is_high_surrogate(self.units[offset - 1])
        {
            return Err(CodecError::invalid(
                Encoding::Utf16,
                self.units[offset] as u32,
                offset,
                "offset splits a surrogate pair",
            ));
        }
        Ok(())
    }

    // ========================================================================
    // Search and code point access
    // ========================================================================

    /// Code unit offset of the first occurrence of `needle` at or after `pos`
    pub fn find(&self, needle: &UnicodeText, pos: usize) -> Result<Option<usize>> {
        if needle.is_empty() || self.is_empty() {
            return Ok(None);
        }
        if pos > self.units.len() {
            return Err(CodecError::index("pos", pos));
        }
        Ok(self.units[pos..]
            .windows(needle.units.len())
            .position(|window| window == needle.units.as_slice())
            .map(|i| i + pos))
    }

    /// Code unit offset of the first occurrence of `cp` at or after `pos`
    pub fn find_codepoint(&self, cp: CodePoint, pos: usize) -> Result<Option<usize>> {
        check_scalar(cp, 0)?;
        let needle = UnicodeText {
            units: codepoint_to_utf16(cp).as_slice().to_vec(),
        };
        self.find(&needle, pos)
    }

    /// Code point starting at code unit `offset`
    #[inline]
    pub fn codepoint_at(&self, offset: usize) -> Result<CodePoint> {
        decode_utf16(&self.units, offset).map(|d| d.value)
    }

    /// Code point at code point `index`
    pub fn codepoint_at_index(&self, index: usize) -> Result<CodePoint> {
        let offset = offset_of_index(&self.units, index, false)?;
        self.codepoint_at(offset)
    }

    /// Number of code points
    pub fn codepoint_count(&self) -> Result<usize> {
        codepoint_count(&self.units)
    }

    /// Iterate over code points; stops after the first decode error
    pub fn code_points(&self) -> CodePoints<'_> {
        CodePoints {
            units: &self.units,
            pos: 0,
            failed: false,
        }
    }

    /// True if the code units at `pos` spell out `ascii`
    pub fn starts_with_ascii_at(&self, pos: usize, ascii: &str) -> bool {
        let bytes = ascii.as_bytes();
        match self.units.get(pos..pos + bytes.len()) {
            Some(window) => window.iter().zip(bytes).all(|(&u, &b)| u == b as u16),
            None => false,
        }
    }

    // ========================================================================
    // Comparison
    // ========================================================================

    /// Code unit-wise comparison
    pub fn compare(&self, other: &UnicodeText, case_insensitive: bool) -> Result<Ordering> {
        if case_insensitive {
            return Err(CodecError::NotImplemented("case-insensitive compare"));
        }
        Ok(self.units.cmp(&other.units))
    }

    /// Compare up to `count` code units starting at `pos` against `other`
    pub fn compare_range(
        &self,
        pos: usize,
        count: usize,
        other: &UnicodeText,
        case_insensitive: bool,
    ) -> Result<Ordering> {
        if case_insensitive {
            return Err(CodecError::NotImplemented("case-insensitive compare"));
        }
        if pos > self.units.len() {
            return Err(CodecError::index("pos", pos));
        }
        let end = pos.saturating_add(count).min(self.units.len());
        Ok(self.units[pos..end].cmp(other.units.as_slice()))
    }

    // ========================================================================
    // Serialization
    // ========================================================================

    /// Encode as UTF-8, with a leading `EF BB BF` only when `bom` is set
    pub fn write_utf8(&self, bom: bool) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(self.units.len() + 3);
        if bom {
            out.extend_from_slice(&UTF8_BOM);
        }
        for cp in self.code_points() {
            out.extend_from_slice(codepoint_to_utf8(cp?).as_slice());
        }
        Ok(out)
    }

    /// Encode as UTF-16LE, with a leading `FF FE` only when `bom` is set
    pub fn write_utf16(&self, bom: bool) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.units.len() * 2 + 2);
        if bom {
            out.extend_from_slice(&UTF16LE_BOM);
        }
        for unit in &self.units {
            out.extend_from_slice(&unit.to_le_bytes());
        }
        out
    }

    /// Decode into an owned Rust string
    pub fn to_utf8_string(&self) -> Result<String> {
        let mut out = String::with_capacity(self.units.len());
        for cp in self.code_points() {
            let cp = cp?;
            // decode_utf16 never yields a surrogate
            if let Some(c) = char::from_u32(cp) {
                out.push(c);
            }
        }
        Ok(out)
    }
}

/// Convert UTF-16 bytes of the given endianness into validated code units
fn units_from_bytes(bytes: &[u8], encoding: Encoding) -> Result<Vec<u16>> {
    let start = encoding.bom_len(bytes);
    let body = &bytes[start..];

    if body.len() % 2 != 0 {
        let last = bytes.len() - 1;
        return Err(CodecError::invalid(
            encoding,
            bytes[last] as u32,
            last,
            "odd number of bytes",
        ));
    }

    let units: Vec<u16> = body
        .chunks_exact(2)
        .map(|pair| match encoding {
            Encoding::Utf16Be => u16::from_be_bytes([pair[0], pair[1]]),
            _ => u16::from_le_bytes([pair[0], pair[1]]),
        })
        .collect();

    validate_utf16(&units).map_err(|e| e.relocate(encoding, start, 2))?;
    Ok(units)
}

/// Iterator over the code points of a `UnicodeText`
pub struct CodePoints<'a> {
    units: &'a [u16],
    pos: usize,
    failed: bool,
}

impl<'a> Iterator for CodePoints<'a> {
    type Item = Result<CodePoint>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.pos >= self.units.len() {
            return None;
        }
        match decode_utf16(self.units, self.pos) {
            Ok(decoded) => {
                self.pos += decoded.consumed;
                Some(Ok(decoded.value))
            }
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}

impl From<&str> for UnicodeText {
    fn from(s: &str) -> Self {
        UnicodeText::from_utf8_str(s)
    }
}

impl From<String> for UnicodeText {
    fn from(s: String) -> Self {
        UnicodeText::from_utf8_str(&s)
    }
}

impl PartialEq<str> for UnicodeText {
    fn eq(&self, other: &str) -> bool {
        self.units.iter().copied().eq(other.encode_utf16())
    }
}

impl PartialEq<&str> for UnicodeText {
    fn eq(&self, other: &&str) -> bool {
        *self == **other
    }
}

impl fmt::Display for UnicodeText {
    /// Lossy: undecodable units are shown as U+FFFD
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in char::decode_utf16(self.units.iter().copied()) {
            f.write_char(c.unwrap_or(char::REPLACEMENT_CHARACTER))?;
        }
        Ok(())
    }
}

impl fmt::Debug for UnicodeText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UnicodeText({:?})", self.to_string())
    }
}
