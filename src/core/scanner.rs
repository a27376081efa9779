//! Code Point Scanner
//!
//! Cursor over a `UnicodeText` used by the pull reader:
//! - reads one code point at a time, decoding surrogate pairs
//! - counts lines (starting at 1) as it crosses `\n`
//! - classifies XML name characters per the Unicode NameStartChar ranges
//!
//! Positions are code unit offsets into the scanned text.

use super::codepoint::{decode_utf16, CodePoint};
use super::text::UnicodeText;

const LF: u16 = b'\n' as u16;

/// Cursor over an owned text value
#[derive(Debug, Clone, Default)]
pub struct Scanner {
    text: UnicodeText,
    pos: usize,
    line: usize,
}

impl Scanner {
    /// Create a new scanner positioned at the start of `text`
    pub fn new(text: UnicodeText) -> Self {
        Scanner {
            text,
            pos: 0,
            line: 1,
        }
    }

    /// Replace the scanned text and rewind
    pub fn reset(&mut self, text: UnicodeText) {
        self.text = text;
        self.pos = 0;
        self.line = 1;
    }

    #[inline]
    pub fn text(&self) -> &UnicodeText {
        &self.text
    }

    /// Get the current position
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Current line number, starting at 1
    #[inline]
    pub fn line(&self) -> usize {
        self.line
    }

    /// Check if we've reached the end
    #[inline]
    pub fn is_eof(&self) -> bool {
        self.pos >= self.text.len()
    }

    /// Peek at the code unit under the cursor
    #[inline]
    pub fn peek_unit(&self) -> Option<u16> {
        self.text.as_units().get(self.pos).copied()
    }

    /// Peek at the code unit `offset` units past the cursor
    #[inline]
    pub fn peek_unit_at(&self, offset: usize) -> Option<u16> {
        self.text.as_units().get(self.pos + offset).copied()
    }

    /// Peek at the code point under the cursor
    #[inline]
    pub fn peek(&self) -> Option<CodePoint> {
        decode_utf16(self.text.as_units(), self.pos)
            .ok()
            .map(|d| d.value)
    }

    /// Consume one code point
    pub fn advance(&mut self) -> Option<CodePoint> {
        let decoded = decode_utf16(self.text.as_units(), self.pos).ok()?;
        self.pos += decoded.consumed;
        if decoded.value == LF as CodePoint {
            self.line += 1;
        }
        Some(decoded.value)
    }

    /// Move the cursor forward to `target`, counting the lines crossed
    pub fn advance_to(&mut self, target: usize) {
        let target = target.min(self.text.len());
        if target <= self.pos {
            return;
        }
        self.line += self.text.as_units()[self.pos..target]
            .iter()
            .filter(|&&u| u == LF)
            .count();
        self.pos = target;
    }

    /// Skip ASCII whitespace (space, tab, newline, carriage return)
    pub fn skip_whitespace(&mut self) {
        while let Some(unit) = self.peek_unit() {
            if !is_whitespace(unit as CodePoint) {
                break;
            }
            self.pos += 1;
            if unit == LF {
                self.line += 1;
            }
        }
    }

    /// True if the text at the cursor spells `ascii`
    #[inline]
    pub fn starts_with(&self, ascii: &str) -> bool {
        self.text.starts_with_ascii_at(self.pos, ascii)
    }

    /// Consume `ascii` if the text at the cursor spells it
    pub fn consume(&mut self, ascii: &str) -> bool {
        if self.starts_with(ascii) {
            self.advance_to(self.pos + ascii.len());
            true
        } else {
            false
        }
    }

    /// Offset of the next occurrence of `ascii` at or after the cursor
    pub fn find(&self, ascii: &str) -> Option<usize> {
        let needle: Vec<u16> = ascii.bytes().map(u16::from).collect();
        if needle.is_empty() {
            return Some(self.pos);
        }
        self.text
            .as_units()
            .get(self.pos..)?
            .windows(needle.len())
            .position(|window| window == needle.as_slice())
            .map(|i| self.pos + i)
    }

    /// Copy the units between two code point boundaries
    #[inline]
    pub fn slice(&self, start: usize, end: usize) -> UnicodeText {
        UnicodeText::from_valid_units(&self.text.as_units()[start..end])
    }

    /// Read an XML name: a NameStartChar followed by NameChars
    pub fn read_name(&mut self) -> Option<UnicodeText> {
        let start = self.pos;
        match self.peek() {
            Some(cp) if is_name_start_char(cp) => {
                self.advance();
            }
            _ => return None,
        }
        while let Some(cp) = self.peek() {
            if !is_name_char(cp) {
                break;
            }
            self.advance();
        }
        Some(self.slice(start, self.pos))
    }
}

/// ASCII whitespace only: space, tab, CR, LF
#[inline]
pub fn is_whitespace(cp: CodePoint) -> bool {
    matches!(cp, 0x20 | 0x09 | 0x0D | 0x0A)
}

/// XML NameStartChar
#[inline]
pub fn is_name_start_char(cp: CodePoint) -> bool {
    matches!(cp,
        0x3A | 0x5F |
        0x41..=0x5A | 0x61..=0x7A |
        0xC0..=0xD6 | 0xD8..=0xF6 | 0xF8..=0x2FF |
        0x370..=0x37D | 0x37F..=0x1FFF |
        0x200C..=0x200D | 0x2070..=0x218F |
        0x2C00..=0x2FEF | 0x3001..=0xD7FF |
        0xF900..=0xFDCF | 0xFDF0..=0xFFFD |
        0x10000..=0xEFFFF
    )
}

/// XML NameChar
#[inline]
pub fn is_name_char(cp: CodePoint) -> bool {
    is_name_start_char(cp)
        || matches!(cp,
            0x2D | 0x2E |
            0x30..=0x39 |
            0xB7 |
            0x300..=0x36F |
            0x203F..=0x2040
        )
}
