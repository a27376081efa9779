//! Element Tree
//!
//! Small owned tree built from `XmlReader` events. Used to load
//! configuration documents and write them back out.
//!
//! Only elements, attributes and character data are kept; comments and
//! processing instructions are dropped on load.

use crate::core::attributes::Attribute;
use crate::core::entities::escape_into;
use crate::core::error::CodecError;
use crate::core::scanner::is_whitespace;
use crate::core::text::UnicodeText;
use crate::reader::{ParseError, ReaderConfig, XmlEvent, XmlReader};
use std::fmt;
use thiserror::Error;

const INDENT: &str = "    ";
const LINE_SEPARATOR: &str = "\r\n";

/// Error raised while loading or building an element tree
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error("document is empty")]
    EmptyInput,

    #[error("invalid name: {0:?}")]
    InvalidName(String),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Codec(#[from] CodecError),
}

/// An element with its attributes, text and children
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    name: UnicodeText,
    text: UnicodeText,
    attributes: Vec<Attribute>,
    children: Vec<Element>,
}

impl Element {
    /// Create an empty element; the name must pass [`is_valid_name`]
    pub fn new(name: &str) -> Result<Self, LoadError> {
        if !is_valid_name(name) {
            return Err(LoadError::InvalidName(name.to_string()));
        }
        Ok(Element {
            name: UnicodeText::from(name),
            text: UnicodeText::new(),
            attributes: Vec::new(),
            children: Vec::new(),
        })
    }

    /// Build a tree from a whole document
    pub fn load(text: &UnicodeText, strip_namespaces: bool) -> Result<Self, LoadError> {
        if text.is_whitespace() {
            return Err(LoadError::EmptyInput);
        }

        let config = ReaderConfig::default().with_strip_namespaces(strip_namespaces);
        let mut reader = XmlReader::with_config(config);
        reader.set_text(text.clone());

        let mut stack: Vec<Element> = Vec::new();
        let mut root = None;
        while let Some(event) = reader.next_event()? {
            match event {
                XmlEvent::Start { name, attributes } => stack.push(Element {
                    name,
                    text: UnicodeText::new(),
                    attributes,
                    children: Vec::new(),
                }),
                XmlEvent::Chars(chars) => {
                    if let Some(current) = stack.last_mut() {
                        current.text.append(&chars);
                    }
                }
                XmlEvent::End { .. } => {
                    if let Some(done) = stack.pop() {
                        match stack.last_mut() {
                            Some(parent) => parent.children.push(done),
                            None => root = Some(done),
                        }
                    }
                }
                XmlEvent::Comment(_) | XmlEvent::Instruction { .. } => {}
            }
        }

        root.ok_or(LoadError::EmptyInput)
    }

    pub fn parse_str(document: &str, strip_namespaces: bool) -> Result<Self, LoadError> {
        Element::load(&UnicodeText::from(document), strip_namespaces)
    }

    /// Decode raw document bytes (UTF-8 or UTF-16, BOM optional) and load them
    pub fn from_bytes(bytes: &[u8], strip_namespaces: bool) -> Result<Self, LoadError> {
        let text = UnicodeText::decode(bytes)?;
        Element::load(&text, strip_namespaces)
    }

    pub fn name(&self) -> &UnicodeText {
        &self.name
    }

    pub fn text(&self) -> &UnicodeText {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<UnicodeText>) {
        self.text = text.into();
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    pub fn attribute(&self, name: &str) -> Option<&UnicodeText> {
        self.attributes
            .iter()
            .find(|a| a.name == *name)
            .map(|a| &a.value)
    }

    /// Set an attribute, replacing the value of an existing one in place
    pub fn set_attribute(&mut self, name: &str, value: impl Into<UnicodeText>) -> Result<(), LoadError> {
        if !is_valid_name(name) {
            return Err(LoadError::InvalidName(name.to_string()));
        }
        let value = value.into();
        match self.attributes.iter_mut().find(|a| a.name == *name) {
            Some(existing) => existing.value = value,
            None => self.attributes.push(Attribute::new(name, value)),
        }
        Ok(())
    }

    pub fn children(&self) -> &[Element] {
        &self.children
    }

    /// First child with the given name
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == *name)
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |c| c.name == *name)
    }

    pub fn add_child(&mut self, child: Element) {
        self.children.push(child);
    }

    /// Serialize the tree. With `line_separators`, each child goes on its
    /// own CRLF-terminated line indented four spaces per level.
    pub fn to_xml(&self, line_separators: bool) -> UnicodeText {
        let mut out = UnicodeText::new();
        self.write_into(&mut out, 0, line_separators);
        out
    }

    fn write_into(&self, out: &mut UnicodeText, depth: usize, line_separators: bool) {
        out.push_str("<");
        out.append(&self.name);
        for attr in &self.attributes {
            out.push_str(" ");
            out.append(&attr.name);
            out.push_str("=\"");
            escape_into(out, &attr.value);
            out.push_str("\"");
        }

        if self.text.is_empty() && self.children.is_empty() {
            out.push_str("/>");
            return;
        }

        out.push_str(">");
        write_text(out, &self.text);
        for child in &self.children {
            if line_separators {
                push_line(out, depth + 1);
            }
            child.write_into(out, depth + 1, line_separators);
        }
        if line_separators && !self.children.is_empty() {
            push_line(out, depth);
        }
        out.push_str("</");
        out.append(&self.name);
        out.push_str(">");
    }
}

/// Escape character data. A leading whitespace unit is written as a
/// character reference, since the reader skips whitespace at the start of
/// character data.
fn write_text(out: &mut UnicodeText, text: &UnicodeText) {
    let units = text.as_units();
    match units.first() {
        Some(&unit) if is_whitespace(u32::from(unit)) => {
            out.push_str(&format!("&#{};", unit));
            escape_into(out, &UnicodeText::from_valid_units(&units[1..]));
        }
        _ => escape_into(out, text),
    }
}

fn push_line(out: &mut UnicodeText, depth: usize) {
    out.push_str(LINE_SEPARATOR);
    for _ in 0..depth {
        out.push_str(INDENT);
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_xml(false))
    }
}

/// ASCII element and attribute names: `[_A-Za-z][_A-Za-z0-9.:-]*`
pub fn is_valid_name(name: &str) -> bool {
    let mut bytes = name.bytes();
    match bytes.next() {
        Some(b) if b == b'_' || b.is_ascii_alphabetic() => {}
        _ => return false,
    }
    bytes.all(|b| b.is_ascii_alphanumeric() || matches!(b, b'_' | b'-' | b'.' | b':'))
}
