//! XML Attribute Parsing
//!
//! Reads `Name '=' quote Value quote` pairs from a scanner positioned inside
//! a start tag, expanding references in the value.

use super::entities::{read_reference, BAD_CHAR_REFERENCE};
use super::scanner::Scanner;
use super::text::UnicodeText;

const COLON: u16 = b':' as u16;

/// A parsed XML attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Attribute name (prefix already stripped if the reader was told to)
    pub name: UnicodeText,
    /// Attribute value (entities decoded)
    pub value: UnicodeText,
}

impl Attribute {
    /// Create a new attribute
    pub fn new(name: impl Into<UnicodeText>, value: impl Into<UnicodeText>) -> Self {
        Attribute {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Local name (after colon, if namespaced)
    pub fn local_name(&self) -> UnicodeText {
        split_name(&self.name).1
    }

    /// Namespace prefix (before colon), if any
    pub fn prefix(&self) -> Option<UnicodeText> {
        split_name(&self.name).0
    }
}

/// Split a qualified name into prefix and local name at the first colon
pub fn split_name(name: &UnicodeText) -> (Option<UnicodeText>, UnicodeText) {
    let units = name.as_units();
    match units.iter().position(|&u| u == COLON) {
        Some(colon) => (
            Some(UnicodeText::from_valid_units(&units[..colon])),
            UnicodeText::from_valid_units(&units[colon + 1..]),
        ),
        None => (None, name.clone()),
    }
}

/// Parse one attribute at the cursor
pub fn read_attribute(scanner: &mut Scanner) -> Result<Attribute, &'static str> {
    let name = scanner.read_name().ok_or("expected attribute name")?;

    scanner.skip_whitespace();
    if !scanner.consume("=") {
        return Err("expected = character");
    }
    scanner.skip_whitespace();

    let value = read_quoted_value(scanner)?;
    Ok(Attribute { name, value })
}

/// Parse a single- or double-quoted attribute value
pub fn read_quoted_value(scanner: &mut Scanner) -> Result<UnicodeText, &'static str> {
    let quote = match scanner.peek_unit() {
        Some(q) if q == b'"' as u16 || q == b'\'' as u16 => q,
        _ => return Err("expected opening quote"),
    };
    scanner.advance();

    let mut value = UnicodeText::new();
    loop {
        match scanner.peek_unit() {
            None => return Err("expected closing quote"),
            Some(u) if u == quote => {
                scanner.advance();
                return Ok(value);
            }
            Some(u) if u == b'<' as u16 => return Err("illegal character in attribute value"),
            Some(u) if u == b'&' as u16 => {
                let cp = read_reference(scanner)?;
                value.push_codepoint(cp).map_err(|_| BAD_CHAR_REFERENCE)?;
            }
            Some(_) => {
                let start = scanner.position();
                scanner.advance();
                value.append(&scanner.slice(start, scanner.position()));
            }
        }
    }
}
