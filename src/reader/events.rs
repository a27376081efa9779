//! XML Event Types
//!
//! Event types for pull-parser style XML processing. Each event owns its
//! names and text, so it stays valid after the reader moves on.

use crate::core::attributes::Attribute;
use crate::core::text::UnicodeText;
use std::fmt;

/// XML parsing event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlEvent {
    /// Start of an element: `<name attrs...>` or `<name attrs.../>`
    Start {
        name: UnicodeText,
        attributes: Vec<Attribute>,
    },
    /// End of an element, real or synthesized after `/>`
    End { name: UnicodeText },
    /// Character data, including CDATA sections
    Chars(UnicodeText),
    /// Comment content
    Comment(UnicodeText),
    /// Processing instruction: `<?name attrs...?>`
    Instruction {
        name: UnicodeText,
        attributes: Vec<Attribute>,
    },
}

/// Classification of an event without its payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum XmlEventKind {
    Start,
    End,
    Chars,
    Comment,
    Instruction,
}

impl fmt::Display for XmlEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            XmlEventKind::Start => "START",
            XmlEventKind::End => "END",
            XmlEventKind::Chars => "CHARS",
            XmlEventKind::Comment => "COMMENT",
            XmlEventKind::Instruction => "INSTRUCTION",
        };
        f.write_str(name)
    }
}

impl XmlEvent {
    pub fn kind(&self) -> XmlEventKind {
        match self {
            XmlEvent::Start { .. } => XmlEventKind::Start,
            XmlEvent::End { .. } => XmlEventKind::End,
            XmlEvent::Chars(_) => XmlEventKind::Chars,
            XmlEvent::Comment(_) => XmlEventKind::Comment,
            XmlEvent::Instruction { .. } => XmlEventKind::Instruction,
        }
    }

    /// Element or instruction name
    pub fn name(&self) -> Option<&UnicodeText> {
        match self {
            XmlEvent::Start { name, .. }
            | XmlEvent::End { name }
            | XmlEvent::Instruction { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Text of a CHARS or COMMENT event
    pub fn text(&self) -> Option<&UnicodeText> {
        match self {
            XmlEvent::Chars(text) | XmlEvent::Comment(text) => Some(text),
            _ => None,
        }
    }

    /// Attributes of a START or INSTRUCTION event, in document order
    pub fn attributes(&self) -> &[Attribute] {
        match self {
            XmlEvent::Start { attributes, .. } | XmlEvent::Instruction { attributes, .. } => {
                attributes
            }
            _ => &[],
        }
    }

    /// Get an attribute value by name
    pub fn attribute(&self, name: &str) -> Option<&UnicodeText> {
        self.attributes()
            .iter()
            .find(|a| a.name == *name)
            .map(|a| &a.value)
    }

    /// Check if this is a start element event
    pub fn is_start(&self) -> bool {
        matches!(self, XmlEvent::Start { .. })
    }

    /// Check if this is an end element event
    pub fn is_end(&self) -> bool {
        matches!(self, XmlEvent::End { .. })
    }
}

impl fmt::Display for XmlEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            XmlEvent::Start { name, .. } => write!(f, "<{}>", name),
            XmlEvent::End { name } => write!(f, "</{}>", name),
            XmlEvent::Chars(text) => write!(f, "{}", text),
            XmlEvent::Comment(text) => write!(f, "<!--{}-->", text),
            XmlEvent::Instruction { name, .. } => write!(f, "<?{}?>", name),
        }
    }
}
