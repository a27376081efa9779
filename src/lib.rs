//! xmltext - Validated Unicode text and a pull XML reader
//!
//! Layers:
//! - core: code point conversions, `UnicodeText` (canonical UTF-16 storage
//!   with strict UTF-8/UTF-16 codecs), scanner, entities, attributes
//! - reader: non-recursive pull parser producing one event per call
//! - dom: owned element tree built from reader events
//!
//! ```
//! use xmltext::{XmlEvent, XmlReader};
//!
//! let mut reader = XmlReader::with_text("<a x=\"1\">hi</a>");
//! while let Some(event) = reader.next_event().unwrap() {
//!     if let XmlEvent::Chars(text) = event {
//!         assert_eq!(text, "hi");
//!     }
//! }
//! ```

pub mod core;
pub mod dom;
pub mod reader;

pub use crate::core::encoding::Encoding;
pub use crate::core::error::CodecError;
pub use crate::core::text::UnicodeText;
pub use dom::{Element, LoadError};
pub use reader::{ParseError, ReaderConfig, ReaderStatus, XmlEvent, XmlEventKind, XmlReader};
