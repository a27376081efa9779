//! XML Reader Module
//!
//! Pull parser over a `UnicodeText`:
//! - Pull: the resumable three-state reader (`XmlReader`)
//! - Events: XML event types returned one per call
//! - Namespace: scope-tagged prefix bindings and registered short ids
//! - Config: options and limits

pub mod config;
pub mod events;
pub mod namespace;
pub mod pull;

pub use config::ReaderConfig;
pub use events::{XmlEvent, XmlEventKind};
pub use pull::{parse_events, Events, IntoEvents, ParseError, ReaderStatus, XmlReader};
