//! DOM Module
//!
//! Owned element tree loaded through the pull reader and serialized back to
//! text.

pub mod element;

pub use element::{is_valid_name, Element, LoadError};
