//! Encoding Kinds and BOM Detection
//!
//! Names the byte encodings the codec understands and detects them from a
//! byte order mark or the first bytes of an XML document.

use std::fmt;

/// UTF-8 byte order mark
pub const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];
/// UTF-16 little-endian byte order mark
pub const UTF16LE_BOM: [u8; 2] = [0xFF, 0xFE];
/// UTF-16 big-endian byte order mark
pub const UTF16BE_BOM: [u8; 2] = [0xFE, 0xFF];

/// Byte encoding of a text source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Encoding {
    Ascii,
    Utf8,
    /// Native 16-bit code units, as held in memory
    Utf16,
    Utf16Le,
    Utf16Be,
    /// Raw 32-bit code points
    Ucs4,
}

impl Encoding {
    /// Detect encoding from byte order mark or initial bytes
    pub fn detect(input: &[u8]) -> Self {
        if input.len() < 2 {
            return Encoding::Utf8;
        }

        match (input[0], input[1]) {
            (0xFF, 0xFE) => Encoding::Utf16Le,
            (0xFE, 0xFF) => Encoding::Utf16Be,
            // '<' followed by NUL or the reverse
            (0x00, b'<') => Encoding::Utf16Be,
            (b'<', 0x00) => Encoding::Utf16Le,
            _ => Encoding::Utf8,
        }
    }

    /// Length of the byte order mark at the start of `input`, if it
    /// matches this encoding
    pub fn bom_len(self, input: &[u8]) -> usize {
        match self {
            Encoding::Utf8 if input.starts_with(&UTF8_BOM) => 3,
            Encoding::Utf16Le if input.starts_with(&UTF16LE_BOM) => 2,
            Encoding::Utf16Be if input.starts_with(&UTF16BE_BOM) => 2,
            _ => 0,
        }
    }

    /// Canonical IANA-style name
    pub fn name(self) -> &'static str {
        match self {
            Encoding::Ascii => "US-ASCII",
            Encoding::Utf8 => "UTF-8",
            Encoding::Utf16 => "UTF-16",
            Encoding::Utf16Le => "UTF-16LE",
            Encoding::Utf16Be => "UTF-16BE",
            Encoding::Ucs4 => "UCS-4",
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
