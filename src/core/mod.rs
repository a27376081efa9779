//! Unicode text primitives
//!
//! This module contains the building blocks the reader runs on:
//! - CodePoint: pure UTF-8/UTF-16 conversions of single code points
//! - Text: `UnicodeText`, the validated UTF-16 text value
//! - Encoding: encoding kinds and BOM detection
//! - Error: codec errors
//! - Scanner: code point cursor with line counting and name classes
//! - Entities: reference expansion and output escaping
//! - Attributes: attribute pairs and their parsing

pub mod attributes;
pub mod codepoint;
pub mod encoding;
pub mod entities;
pub mod error;
pub mod scanner;
pub mod text;

pub use error::CodecError;
pub use text::UnicodeText;
