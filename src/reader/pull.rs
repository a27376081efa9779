//! Pull XML Reader
//!
//! Non-recursive XML parser over a `UnicodeText`. Each `next_event` call
//! runs the state machine until exactly one event is ready, then returns it;
//! the cursor, line counter, open-tag stack and namespace scopes all live in
//! the reader, so the next call resumes where the last one stopped.
//!
//! States:
//! - START: expect `<` (prolog, or after the root element has closed)
//! - TAG: dispatch on the character following `<`
//! - CHARS: collect character data up to the next `<`
//!
//! Failures are sticky: the first error is recorded with its line number,
//! logged, and returned from every later call.

use super::config::ReaderConfig;
use super::events::{XmlEvent, XmlEventKind};
use super::namespace::NamespaceTable;
use crate::core::attributes::{read_attribute, split_name, Attribute};
use crate::core::entities::{read_reference, BAD_CHAR_REFERENCE};
use crate::core::scanner::{is_name_start_char, Scanner};
use crate::core::text::UnicodeText;
use log::{error, trace, warn};
use std::fmt;

const LT: u16 = b'<' as u16;
const GT: u16 = b'>' as u16;
const AMP: u16 = b'&' as u16;
const SLASH: u16 = b'/' as u16;
const QUESTION: u16 = b'?' as u16;
const BANG: u16 = b'!' as u16;

/// A fatal parse error and the line it was found on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub message: String,
    pub line: usize,
}

impl ParseError {
    pub fn new(message: impl Into<String>, line: usize) -> Self {
        ParseError {
            message: message.into(),
            line,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

impl std::error::Error for ParseError {}

/// Document status after the last call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReaderStatus {
    /// More events may follow
    Ok,
    /// The document ended cleanly
    Done,
    /// A fatal error was recorded
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseState {
    Start,
    Tag,
    Chars,
}

type Step = Result<Option<XmlEvent>, ParseError>;

/// Resumable pull parser
#[derive(Debug)]
pub struct XmlReader {
    config: ReaderConfig,
    scanner: Scanner,
    state: ParseState,
    /// Names of open elements, already translated
    stack: Vec<UnicodeText>,
    namespaces: NamespaceTable,
    /// END queued by a self-closing tag
    pending_end: Option<XmlEvent>,
    found_root: bool,
    last_kind: Option<XmlEventKind>,
    status: ReaderStatus,
    error: Option<ParseError>,
}

impl Default for XmlReader {
    fn default() -> Self {
        XmlReader::new()
    }
}

impl XmlReader {
    /// Create a reader with default configuration and no text
    pub fn new() -> Self {
        XmlReader::with_config(ReaderConfig::default())
    }

    pub fn with_config(config: ReaderConfig) -> Self {
        let namespaces =
            NamespaceTable::new(config.max_namespaces, config.max_registered_namespaces);
        XmlReader {
            config,
            scanner: Scanner::default(),
            state: ParseState::Start,
            stack: Vec::new(),
            namespaces,
            pending_end: None,
            found_root: false,
            last_kind: None,
            status: ReaderStatus::Ok,
            error: None,
        }
    }

    /// Create a default reader over `text`
    pub fn with_text(text: impl Into<UnicodeText>) -> Self {
        let mut reader = XmlReader::new();
        reader.set_text(text);
        reader
    }

    /// Bind a new document and reset all parse state. Registered namespace
    /// ids are kept.
    pub fn set_text(&mut self, text: impl Into<UnicodeText>) {
        self.scanner.reset(text.into());
        self.state = ParseState::Start;
        self.stack.clear();
        self.namespaces.clear_scopes();
        self.pending_end = None;
        self.found_root = false;
        self.last_kind = None;
        self.status = ReaderStatus::Ok;
        self.error = None;
    }

    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    pub fn status(&self) -> ReaderStatus {
        self.status
    }

    /// First fatal error, if any
    pub fn error(&self) -> Option<&ParseError> {
        self.error.as_ref()
    }

    /// Current line, starting at 1
    pub fn line(&self) -> usize {
        self.scanner.line()
    }

    /// Cursor position in code units
    pub fn position(&self) -> usize {
        self.scanner.position()
    }

    /// Number of open elements
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    // ========================================================================
    // Events
    // ========================================================================

    /// Return the next event, `Ok(None)` at a clean end of document, or the
    /// sticky error
    pub fn next_event(&mut self) -> Step {
        match self.status {
            ReaderStatus::Failed => return Err(self.sticky_error()),
            ReaderStatus::Done => return Ok(None),
            ReaderStatus::Ok => {}
        }

        if let Some(event) = self.pending_end.take() {
            self.namespaces.pop_scope(self.stack.len() + 1);
            self.last_kind = Some(XmlEventKind::End);
            return Ok(Some(event));
        }

        loop {
            let step = match self.state {
                ParseState::Start => self.parse_start(),
                ParseState::Tag => self.parse_tag(),
                ParseState::Chars => self.parse_chars(),
            };
            match step? {
                Some(event) => {
                    self.last_kind = Some(event.kind());
                    return Ok(Some(event));
                }
                None if self.status == ReaderStatus::Done => return Ok(None),
                None => {}
            }
        }
    }

    /// Skip the subtree of the START event just returned, leaving the cursor
    /// after its matching END. Does nothing if the last event was not a START.
    pub fn skip(&mut self) -> Result<(), ParseError> {
        if self.last_kind != Some(XmlEventKind::Start) {
            return Ok(());
        }
        trace!("skipping subtree at line {}", self.line());

        let mut depth = 1usize;
        while depth > 0 {
            match self.next_event()? {
                Some(XmlEvent::Start { .. }) => depth += 1,
                Some(XmlEvent::End { .. }) => depth -= 1,
                Some(_) => {}
                None => return Err(self.put_error("premature end of input")),
            }
        }
        Ok(())
    }

    /// Read the next event and require its kind, and its name when given
    pub fn expect(&mut self, kind: XmlEventKind, name: Option<&str>) -> Result<XmlEvent, ParseError> {
        let event = self.next_event()?;
        let matched = event.as_ref().is_some_and(|e| {
            e.kind() == kind
                && name.map_or(true, |n| e.name().is_some_and(|en| *en == *n))
        });

        match event {
            Some(event) if matched => Ok(event),
            other => {
                let actual = other.map_or_else(|| "end of input".to_string(), |e| e.to_string());
                let expected = name.unwrap_or("");
                let message = match kind {
                    XmlEventKind::Start => format!("expected element: <{}>: {}", expected, actual),
                    XmlEventKind::End => format!("expected element: </{}>: {}", expected, actual),
                    XmlEventKind::Chars => "expected character data".to_string(),
                    XmlEventKind::Comment => "expected comment".to_string(),
                    XmlEventKind::Instruction => "expected instruction".to_string(),
                };
                Err(self.put_error(message))
            }
        }
    }

    /// Iterate over the remaining events. Yields the error once if the
    /// document is malformed, then ends.
    pub fn events(&mut self) -> Events<'_> {
        Events { reader: self }
    }

    fn pull(&mut self) -> Option<Result<XmlEvent, ParseError>> {
        if self.status == ReaderStatus::Failed {
            return None;
        }
        self.next_event().transpose()
    }

    // ========================================================================
    // Namespaces
    // ========================================================================

    /// Bind a short id in `'a'..='z'` to a namespace URI. Failure does not
    /// affect the document status.
    pub fn register_namespace(
        &mut self,
        id: char,
        uri: impl Into<UnicodeText>,
    ) -> Result<(), ParseError> {
        self.namespaces.register(id, uri.into()).map_err(|message| {
            let message = if message == "too many registered namespaces" {
                format!("{} (>{})", message, self.config.max_registered_namespaces)
            } else {
                message.to_string()
            };
            warn!("cannot register namespace '{}': {}", id, message);
            ParseError::new(message, self.scanner.line())
        })
    }

    /// URI bound to `prefix` in the current scope; `""` is the default
    /// namespace
    pub fn resolve_namespace(&self, prefix: &str) -> Option<&UnicodeText> {
        self.namespaces.resolve(&UnicodeText::from(prefix))
    }

    /// Registered short id of the URI bound to `prefix`
    pub fn namespace_id(&self, prefix: &str) -> Option<char> {
        self.namespaces.id_of(&UnicodeText::from(prefix))
    }

    // ========================================================================
    // Error path
    // ========================================================================

    /// Record a fatal error. Only the first one sticks.
    fn put_error(&mut self, message: impl Into<String>) -> ParseError {
        if let Some(first) = &self.error {
            return first.clone();
        }
        let err = ParseError::new(message, self.scanner.line());
        error!("XML parse error at line {}: {}", err.line, err.message);
        self.error = Some(err.clone());
        self.status = ReaderStatus::Failed;
        err
    }

    fn sticky_error(&self) -> ParseError {
        match &self.error {
            Some(err) => err.clone(),
            None => ParseError::new("reader failed", self.scanner.line()),
        }
    }

    #[inline]
    fn fail<T>(&mut self, message: impl Into<String>) -> Result<T, ParseError> {
        Err(self.put_error(message))
    }

    #[inline]
    fn check<T>(&mut self, result: Result<T, &'static str>) -> Result<T, ParseError> {
        result.or_else(|message| self.fail(message))
    }

    /// End of input reached with nothing pending
    fn finish(&mut self) -> Step {
        if !self.stack.is_empty() {
            return self.fail("premature end of input");
        }
        if !self.found_root {
            return self.fail("expected element");
        }
        self.status = ReaderStatus::Done;
        Ok(None)
    }

    /// State to resume in after markup that leaves the stack unchanged
    #[inline]
    fn after_markup(&self) -> ParseState {
        if self.stack.is_empty() {
            ParseState::Start
        } else {
            ParseState::Chars
        }
    }

    #[inline]
    fn translate(&self, name: UnicodeText) -> UnicodeText {
        if self.config.strip_namespaces {
            split_name(&name).1
        } else {
            name
        }
    }

    // ========================================================================
    // States
    // ========================================================================

    fn parse_start(&mut self) -> Step {
        self.scanner.skip_whitespace();
        match self.scanner.peek_unit() {
            None => self.finish(),
            Some(LT) => {
                self.scanner.advance();
                self.state = ParseState::Tag;
                Ok(None)
            }
            Some(_) => self.fail("markup outside root element"),
        }
    }

    fn parse_tag(&mut self) -> Step {
        self.scanner.skip_whitespace();
        match self.scanner.peek_unit() {
            None => self.fail("premature end of input"),
            Some(SLASH) => {
                self.scanner.advance();
                self.parse_end_tag()
            }
            Some(QUESTION) => {
                self.scanner.advance();
                self.parse_instruction()
            }
            Some(BANG) => {
                if self.scanner.consume("!--") {
                    self.parse_comment()
                } else if self.scanner.consume("![CDATA[") {
                    self.parse_cdata()
                } else if self.scanner.consume("!DOCTYPE") {
                    self.parse_doctype()
                } else {
                    self.fail("expected comment, CDATA, or DOCTYPE")
                }
            }
            Some(_) => match self.scanner.peek() {
                Some(cp) if is_name_start_char(cp) => self.parse_start_tag(),
                _ => self.fail("expected element"),
            },
        }
    }

    fn parse_start_tag(&mut self) -> Step {
        if self.found_root && self.stack.is_empty() {
            return self.fail("markup outside root element");
        }
        let name = match self.scanner.read_name() {
            Some(name) => name,
            None => return self.fail("expected element name"),
        };
        if self.stack.len() >= self.config.max_nesting {
            let max = self.config.max_nesting;
            return self.fail(format!("element stack overflow (>{})", max));
        }

        let depth = self.stack.len() + 1;
        let attributes = self.parse_attributes(Some(depth))?;

        let self_closing = if self.scanner.consume("/>") {
            true
        } else if self.scanner.consume(">") {
            false
        } else if self.scanner.is_eof() {
            return self.fail("premature end of input");
        } else {
            return self.fail("expected closing angle bracket");
        };

        self.found_root = true;
        let name = self.translate(name);
        if self_closing {
            self.pending_end = Some(XmlEvent::End { name: name.clone() });
            self.state = self.after_markup();
        } else {
            self.stack.push(name.clone());
            self.state = ParseState::Chars;
        }
        Ok(Some(XmlEvent::Start { name, attributes }))
    }

    /// Parse attributes up to `/`, `>` or `?`. `xmlns` declarations bind
    /// namespaces for the element at `scope_depth`; instructions pass `None`.
    fn parse_attributes(&mut self, scope_depth: Option<usize>) -> Result<Vec<Attribute>, ParseError> {
        let mut attributes: Vec<Attribute> = Vec::new();
        // qualified names as written, before any prefix is stripped
        let mut seen: Vec<UnicodeText> = Vec::new();
        loop {
            self.scanner.skip_whitespace();
            match self.scanner.peek_unit() {
                None => return self.fail("premature end of input"),
                Some(SLASH) | Some(GT) | Some(QUESTION) => return Ok(attributes),
                Some(_) => {}
            }

            let attr = read_attribute(&mut self.scanner);
            let attr = self.check(attr)?;

            if let Some(depth) = scope_depth {
                if self.declare_namespace(&attr, depth)? {
                    continue;
                }
            }

            if attributes.len() >= self.config.max_attributes {
                let max = self.config.max_attributes;
                return self.fail(format!("too many attributes (>{})", max));
            }
            if seen.contains(&attr.name) {
                return self.fail(format!("duplicate attribute: {}", attr.name));
            }
            seen.push(attr.name.clone());
            let name = match scope_depth {
                Some(_) => self.translate(attr.name),
                None => attr.name,
            };
            attributes.push(Attribute {
                name,
                value: attr.value,
            });
        }
    }

    /// Handle `xmlns` and `xmlns:p`; returns true if the attribute was a
    /// declaration
    fn declare_namespace(&mut self, attr: &Attribute, depth: usize) -> Result<bool, ParseError> {
        let prefix = if attr.name == "xmlns" {
            UnicodeText::new()
        } else {
            match split_name(&attr.name) {
                (Some(p), local) if p == "xmlns" => local,
                _ => return Ok(false),
            }
        };

        if !self.namespaces.declare(prefix, attr.value.clone(), depth) {
            let max = self.config.max_namespaces;
            return self.fail(format!("too many namespaces (>{})", max));
        }
        Ok(true)
    }

    fn parse_end_tag(&mut self) -> Step {
        let name = match self.scanner.read_name() {
            Some(name) => name,
            None => return self.fail("expected element name"),
        };
        self.scanner.skip_whitespace();
        if !self.scanner.consume(">") {
            return if self.scanner.is_eof() {
                self.fail("premature end of input")
            } else {
                self.fail("expected closing angle bracket")
            };
        }

        let name = self.translate(name);
        let open = match self.stack.last() {
            Some(open) => open.clone(),
            None => return self.fail(format!("too many closing tags: </{}>", name)),
        };
        if open != name {
            return self.fail(format!("open/close tag mismatch: {}/{}", open, name));
        }

        self.namespaces.pop_scope(self.stack.len());
        self.stack.pop();
        self.state = self.after_markup();
        Ok(Some(XmlEvent::End { name }))
    }

    fn parse_chars(&mut self) -> Step {
        self.scanner.skip_whitespace();
        let mut text = UnicodeText::new();

        loop {
            match self.scanner.peek_unit() {
                None => return self.finish(),
                Some(LT) => {
                    self.scanner.advance();
                    self.state = ParseState::Tag;
                    break;
                }
                Some(AMP) => {
                    let cp = read_reference(&mut self.scanner);
                    let cp = self.check(cp)?;
                    let pushed = text.push_codepoint(cp).map_err(|_| BAD_CHAR_REFERENCE);
                    self.check(pushed)?;
                }
                Some(_) => {
                    let start = self.scanner.position();
                    while !matches!(self.scanner.peek_unit(), None | Some(LT) | Some(AMP)) {
                        self.scanner.advance();
                    }
                    text.append(&self.scanner.slice(start, self.scanner.position()));
                }
            }
        }

        if text.is_empty() {
            Ok(None)
        } else {
            Ok(Some(XmlEvent::Chars(text)))
        }
    }

    fn parse_comment(&mut self) -> Step {
        let start = self.scanner.position();
        let end = match self.scanner.find("--") {
            Some(end) if self.scanner.text().starts_with_ascii_at(end, "-->") => end,
            _ => return self.fail("malformed comment"),
        };

        let text = self.scanner.slice(start, end);
        self.scanner.advance_to(end + 3);
        self.state = self.after_markup();

        if self.config.emit_comments {
            Ok(Some(XmlEvent::Comment(text)))
        } else {
            Ok(None)
        }
    }

    fn parse_cdata(&mut self) -> Step {
        if self.stack.is_empty() {
            return self.fail("markup outside root element");
        }
        let start = self.scanner.position();
        let end = match self.scanner.find("]]>") {
            Some(end) => end,
            None => return self.fail("unterminated CDATA section"),
        };

        let text = self.scanner.slice(start, end);
        self.scanner.advance_to(end + 3);
        self.state = ParseState::Chars;

        if text.is_empty() {
            Ok(None)
        } else {
            Ok(Some(XmlEvent::Chars(text)))
        }
    }

    /// Skip to the `>` that is outside quotes and outside an internal subset
    fn parse_doctype(&mut self) -> Step {
        if self.found_root {
            return self.fail("markup outside root element");
        }

        let mut quote: Option<u16> = None;
        let mut in_subset = false;
        loop {
            let unit = match self.scanner.peek_unit() {
                Some(unit) => unit,
                None => return self.fail("unterminated DOCTYPE element"),
            };
            self.scanner.advance();
            match (quote, unit) {
                (Some(q), u) if u == q => quote = None,
                (Some(_), _) => {}
                (None, u) if u == b'"' as u16 || u == b'\'' as u16 => quote = Some(u),
                (None, u) if u == b'[' as u16 => in_subset = true,
                (None, u) if u == b']' as u16 => in_subset = false,
                (None, GT) if !in_subset => break,
                _ => {}
            }
        }

        self.state = ParseState::Start;
        Ok(None)
    }

    fn parse_instruction(&mut self) -> Step {
        let name = match self.scanner.read_name() {
            Some(name) => name,
            None => return self.fail("expected element name"),
        };
        let attributes = self.parse_attributes(None)?;
        if !self.scanner.consume("?>") {
            return if self.scanner.is_eof() {
                self.fail("premature end of input")
            } else {
                self.fail("expected closing angle bracket")
            };
        }

        self.state = self.after_markup();
        if self.config.emit_instructions {
            Ok(Some(XmlEvent::Instruction { name, attributes }))
        } else {
            Ok(None)
        }
    }
}

/// Borrowing event iterator; see [`XmlReader::events`]
pub struct Events<'r> {
    reader: &'r mut XmlReader,
}

impl Iterator for Events<'_> {
    type Item = Result<XmlEvent, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.reader.pull()
    }
}

/// Owning event iterator
pub struct IntoEvents {
    reader: XmlReader,
}

impl Iterator for IntoEvents {
    type Item = Result<XmlEvent, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.reader.pull()
    }
}

impl IntoIterator for XmlReader {
    type Item = Result<XmlEvent, ParseError>;
    type IntoIter = IntoEvents;

    fn into_iter(self) -> IntoEvents {
        IntoEvents { reader: self }
    }
}

/// Parse a whole document into its event sequence
pub fn parse_events(text: &UnicodeText) -> Result<Vec<XmlEvent>, ParseError> {
    XmlReader::with_text(text.clone()).into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn start(name: &str, attrs: &[(&str, &str)]) -> XmlEvent {
        XmlEvent::Start {
            name: name.into(),
            attributes: attrs.iter().map(|&(n, v)| Attribute::new(n, v)).collect(),
        }
    }

    fn end(name: &str) -> XmlEvent {
        XmlEvent::End { name: name.into() }
    }

    fn chars(text: &str) -> XmlEvent {
        XmlEvent::Chars(text.into())
    }

    fn events(doc: &str) -> Result<Vec<XmlEvent>, ParseError> {
        parse_events(&UnicodeText::from(doc))
    }

    fn error_of(doc: &str) -> ParseError {
        events(doc).unwrap_err()
    }

    #[test]
    fn test_nested_elements() {
        assert_eq!(
            events("<a x=\"1\"><b>hi</b></a>").unwrap(),
            vec![
                start("a", &[("x", "1")]),
                start("b", &[]),
                chars("hi"),
                end("b"),
                end("a"),
            ]
        );
    }

    #[test]
    fn test_self_closing_consumes_nothing_between_calls() {
        let mut reader = XmlReader::with_text("<a/>");
        assert_eq!(reader.next_event().unwrap(), Some(start("a", &[])));
        let pos = reader.position();
        assert_eq!(reader.next_event().unwrap(), Some(end("a")));
        assert_eq!(reader.position(), pos);
        assert_eq!(reader.next_event().unwrap(), None);
        assert_eq!(reader.status(), ReaderStatus::Done);
    }

    #[test]
    fn test_tag_mismatch() {
        let err = error_of("<a><b></a>");
        assert_eq!(err.message, "open/close tag mismatch: b/a");
    }

    #[test]
    fn test_entities_in_text() {
        assert_eq!(
            events("<a>5 &lt; 6 &amp; true</a>").unwrap(),
            vec![start("a", &[]), chars("5 < 6 & true"), end("a")]
        );
    }

    #[test]
    fn test_character_references() {
        assert_eq!(
            events("<a>&#65;&#x42;</a>").unwrap()[1],
            chars("AB")
        );
        assert_eq!(error_of("<a>&#256;</a>").message, "bad character reference");
        assert_eq!(error_of("<a>&#65 x</a>").message, "bad character reference");
        assert_eq!(error_of("<a>&nope;</a>").message, "bad entity reference");
    }

    #[test]
    fn test_character_references_below_256() {
        assert_eq!(
            events("<a>&#0;&#1;&#255;</a>").unwrap()[1],
            chars("\u{0}\u{1}\u{ff}")
        );
        assert_eq!(events("<a>&#000065;</a>").unwrap()[1], chars("A"));
    }

    #[test]
    fn test_instruction_skipped() {
        assert_eq!(
            events("<?xml version=\"1.0\"?><root/>").unwrap(),
            vec![start("root", &[]), end("root")]
        );
    }

    #[test]
    fn test_instruction_emitted() {
        let config = ReaderConfig::default().with_emit_instructions(true);
        let mut reader = XmlReader::with_config(config);
        reader.set_text("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<r/>");
        let pi = reader.next_event().unwrap().unwrap();
        assert_eq!(pi.kind(), XmlEventKind::Instruction);
        assert_eq!(pi.name().unwrap(), "xml");
        assert_eq!(pi.attribute("encoding").unwrap(), "UTF-8");
        assert_eq!(reader.next_event().unwrap(), Some(start("r", &[])));
        assert_eq!(reader.depth(), 0);
    }

    #[test]
    fn test_skip_matches_manual_advance() {
        let doc = "<r><a><b>x</b><c/><!-- n --></a><d/></r>";

        let mut skipped = XmlReader::with_text(doc);
        skipped.next_event().unwrap();
        assert_eq!(skipped.next_event().unwrap(), Some(start("a", &[])));
        skipped.skip().unwrap();

        let mut manual = XmlReader::with_text(doc);
        loop {
            if manual.next_event().unwrap() == Some(end("a")) {
                break;
            }
        }

        assert_eq!(skipped.position(), manual.position());
        assert_eq!(skipped.depth(), 1);
        assert_eq!(skipped.next_event().unwrap(), Some(start("d", &[])));
        assert_eq!(manual.next_event().unwrap(), Some(start("d", &[])));
    }

    #[test]
    fn test_skip_self_closing_and_noop() {
        let mut reader = XmlReader::with_text("<r><a/><b/></r>");
        reader.next_event().unwrap();
        reader.next_event().unwrap();
        reader.skip().unwrap();
        // last event is END now, so this does nothing
        reader.skip().unwrap();
        assert_eq!(reader.next_event().unwrap(), Some(start("b", &[])));
    }

    #[test]
    fn test_whitespace_handling() {
        assert_eq!(
            events("\n  <a>\n  text  <b/>\n</a>\n").unwrap(),
            vec![start("a", &[]), chars("text  "), start("b", &[]), end("b"), end("a")]
        );
    }

    #[test]
    fn test_namespace_prefixes_stripped() {
        let doc = "<s:Envelope xmlns:s=\"urn:soap\" s:mustUnderstand=\"1\"><s:Body/></s:Envelope>";
        assert_eq!(
            events(doc).unwrap(),
            vec![
                start("Envelope", &[("mustUnderstand", "1")]),
                start("Body", &[]),
                end("Body"),
                end("Envelope"),
            ]
        );
    }

    #[test]
    fn test_namespace_prefixes_kept() {
        let config = ReaderConfig::default().with_strip_namespaces(false);
        let mut reader = XmlReader::with_config(config);
        reader.set_text("<p:a xmlns:p=\"urn:p\" p:x=\"1\"></p:a>");
        assert_eq!(reader.next_event().unwrap(), Some(start("p:a", &[("p:x", "1")])));
        assert_eq!(reader.next_event().unwrap(), Some(end("p:a")));
    }

    #[test]
    fn test_namespace_scope() {
        let mut reader = XmlReader::with_text(
            "<r xmlns=\"urn:default\"><a xmlns:x=\"urn:x\"><b/></a><c/></r>",
        );
        reader.next_event().unwrap();
        assert_eq!(reader.resolve_namespace("").unwrap(), "urn:default");
        assert!(reader.resolve_namespace("x").is_none());

        reader.next_event().unwrap();
        assert_eq!(reader.resolve_namespace("x").unwrap(), "urn:x");
        reader.next_event().unwrap();
        reader.next_event().unwrap();
        assert_eq!(reader.resolve_namespace("x").unwrap(), "urn:x");

        assert_eq!(reader.next_event().unwrap(), Some(end("a")));
        assert!(reader.resolve_namespace("x").is_none());
        assert!(reader.resolve_namespace("").is_some());
    }

    #[test]
    fn test_self_closing_namespace_purged() {
        let mut reader = XmlReader::with_text("<r><a xmlns:x=\"urn:x\"/><b/></r>");
        reader.next_event().unwrap();
        reader.next_event().unwrap();
        assert!(reader.resolve_namespace("x").is_some());
        assert_eq!(reader.next_event().unwrap(), Some(end("a")));
        assert!(reader.resolve_namespace("x").is_none());
    }

    #[test]
    fn test_registered_namespace_id() {
        let mut reader = XmlReader::new();
        reader.register_namespace('w', "urn:wsman").unwrap();
        reader.set_text("<w:r xmlns:w=\"urn:wsman\" xmlns:o=\"urn:other\"><w:a/></w:r>");
        reader.next_event().unwrap();
        assert_eq!(reader.namespace_id("w"), Some('w'));
        assert_eq!(reader.namespace_id("o"), None);
        // names are stripped, never rewritten with the id
        assert_eq!(reader.next_event().unwrap(), Some(start("a", &[])));
    }

    #[test]
    fn test_register_namespace_errors() {
        let mut reader = XmlReader::new();
        assert_eq!(
            reader.register_namespace('Q', "urn:q").unwrap_err().message,
            "illegal namespace id"
        );
        assert_eq!(
            reader.register_namespace('q', "").unwrap_err().message,
            "empty namespace uri"
        );
        for (i, id) in ('a'..='z').enumerate() {
            reader.register_namespace(id, format!("urn:{}", i)).unwrap();
        }
        assert_eq!(reader.status(), ReaderStatus::Ok);
    }

    #[test]
    fn test_comments() {
        assert_eq!(
            events("<!-- head --><a><!--x--></a>").unwrap(),
            vec![
                XmlEvent::Comment(" head ".into()),
                start("a", &[]),
                XmlEvent::Comment("x".into()),
                end("a"),
            ]
        );
        let config = ReaderConfig::default().with_emit_comments(false);
        let mut reader = XmlReader::with_config(config);
        reader.set_text("<a><!--x--></a>");
        let all: Result<Vec<_>, _> = reader.events().collect();
        assert_eq!(all.unwrap(), vec![start("a", &[]), end("a")]);
    }

    #[test]
    fn test_malformed_comment() {
        assert_eq!(error_of("<a><!-- a -- b --></a>").message, "malformed comment");
        assert_eq!(error_of("<a><!-- open").message, "malformed comment");
    }

    #[test]
    fn test_cdata() {
        assert_eq!(
            events("<a>x<![CDATA[<b>&amp;</b>]]></a>").unwrap(),
            vec![start("a", &[]), chars("x"), chars("<b>&amp;</b>"), end("a")]
        );
        assert_eq!(
            error_of("<a><![CDATA[never").message,
            "unterminated CDATA section"
        );
    }

    #[test]
    fn test_doctype_skipped() {
        let doc = "<!DOCTYPE r [ <!ENTITY e \"a>b\"> ]>\n<r/>";
        assert_eq!(events(doc).unwrap(), vec![start("r", &[]), end("r")]);
        assert_eq!(
            error_of("<!DOCTYPE r [ <!ELEMENT r ANY>").message,
            "unterminated DOCTYPE element"
        );
    }

    #[test]
    fn test_unknown_bang_markup() {
        assert_eq!(
            error_of("<a><!ELEMENT x></a>").message,
            "expected comment, CDATA, or DOCTYPE"
        );
    }

    #[test]
    fn test_structure_errors() {
        assert_eq!(error_of("").message, "expected element");
        assert_eq!(error_of("<a><b></b>").message, "premature end of input");
        assert_eq!(error_of("<a>text").message, "premature end of input");
        assert_eq!(error_of("</a>").message, "too many closing tags: </a>");
        assert_eq!(error_of("<1a/>").message, "expected element");
        assert_eq!(error_of("<a/>trailing").message, "markup outside root element");
        assert_eq!(error_of("<a/><b/>").message, "markup outside root element");
        assert_eq!(error_of("text<a/>").message, "markup outside root element");
        assert_eq!(error_of("<a/><![CDATA[x]]>").message, "markup outside root element");
        assert_eq!(error_of("<a x=\"1\" / >").message, "expected closing angle bracket");
        assert_eq!(error_of("<a><!DOCTYPE a></a>").message, "markup outside root element");
        assert_eq!(error_of("<a/><!DOCTYPE a>").message, "markup outside root element");
    }

    #[test]
    fn test_whitespace_after_open_bracket() {
        assert_eq!(
            events("< a>< b/></a>").unwrap(),
            vec![start("a", &[]), start("b", &[]), end("b"), end("a")]
        );
        assert_eq!(error_of("<a></a>< ").message, "premature end of input");
    }

    #[test]
    fn test_trailing_misc_allowed() {
        assert_eq!(
            events("<a/>\n<!-- done --> <?pi x=\"1\"?>\n").unwrap(),
            vec![start("a", &[]), end("a"), XmlEvent::Comment(" done ".into())]
        );
    }

    #[test]
    fn test_attribute_errors() {
        assert_eq!(error_of("<a x=1/>").message, "expected opening quote");
        assert_eq!(error_of("<a x/>").message, "expected = character");
        assert_eq!(error_of("<a x=\"1/>").message, "expected closing quote");
        assert_eq!(error_of("<a x=\"1\" x=\"2\"/>").message, "duplicate attribute: x");
        assert_eq!(
            error_of("<a p:x=\"1\" p:x=\"2\"/>").message,
            "duplicate attribute: p:x"
        );
    }

    #[test]
    fn test_same_local_name_under_different_prefixes() {
        let doc = "<a xmlns:p=\"urn:p\" xmlns:q=\"urn:q\" p:id=\"1\" q:id=\"2\"/>";
        assert_eq!(
            events(doc).unwrap(),
            vec![start("a", &[("id", "1"), ("id", "2")]), end("a")]
        );
    }

    #[test]
    fn test_limits() {
        let config = ReaderConfig::default().with_max_nesting(2);
        let mut reader = XmlReader::with_config(config);
        reader.set_text("<a><b><c/></b></a>");
        let err = reader.events().find_map(Result::err).unwrap();
        assert_eq!(err.message, "element stack overflow (>2)");

        let config = ReaderConfig::default().with_max_attributes(1);
        let mut reader = XmlReader::with_config(config);
        reader.set_text("<a x=\"1\" y=\"2\"/>");
        assert_eq!(reader.next_event().unwrap_err().message, "too many attributes (>1)");

        let config = ReaderConfig::default().with_max_namespaces(1);
        let mut reader = XmlReader::with_config(config);
        reader.set_text("<a xmlns:x=\"urn:x\" xmlns:y=\"urn:y\"/>");
        assert_eq!(reader.next_event().unwrap_err().message, "too many namespaces (>1)");
    }

    #[test]
    fn test_error_is_sticky_and_has_line() {
        let mut reader = XmlReader::with_text("<a>\n<b>\n</c>");
        assert!(reader.next_event().unwrap().is_some());
        assert!(reader.next_event().unwrap().is_some());
        let err = reader.next_event().unwrap_err();
        assert_eq!(err.line, 3);
        assert_eq!(err.to_string(), "line 3: open/close tag mismatch: b/c");
        assert_eq!(reader.status(), ReaderStatus::Failed);
        assert_eq!(reader.next_event().unwrap_err(), err);
        assert_eq!(reader.error(), Some(&err));
    }

    #[test]
    fn test_iterator_yields_error_once() {
        let reader = XmlReader::with_text("<a></b>");
        let items: Vec<_> = reader.into_iter().collect();
        assert_eq!(items.len(), 2);
        assert!(items[0].is_ok());
        assert!(items[1].is_err());
    }

    #[test]
    fn test_expect() {
        let mut reader = XmlReader::with_text("<a><b>text</b></a>");
        reader.expect(XmlEventKind::Start, Some("a")).unwrap();
        reader.expect(XmlEventKind::Start, None).unwrap();
        let text = reader.expect(XmlEventKind::Chars, None).unwrap();
        assert_eq!(text.text().unwrap(), "text");
        let err = reader.expect(XmlEventKind::End, Some("a")).unwrap_err();
        assert_eq!(err.message, "expected element: </a>: </b>");
        assert_eq!(reader.status(), ReaderStatus::Failed);
    }

    #[test]
    fn test_expect_chars_message() {
        let mut reader = XmlReader::with_text("<a><b/></a>");
        reader.next_event().unwrap();
        let err = reader.expect(XmlEventKind::Chars, None).unwrap_err();
        assert_eq!(err.message, "expected character data");
    }

    #[test]
    fn test_set_text_resets() {
        let mut reader = XmlReader::with_text("<a>");
        reader.next_event().unwrap();
        assert!(reader.next_event().is_err());
        reader.set_text("<b/>");
        assert_eq!(reader.status(), ReaderStatus::Ok);
        assert!(reader.error().is_none());
        assert_eq!(reader.next_event().unwrap(), Some(start("b", &[])));
    }

    #[test]
    fn test_non_ascii_and_surrogate_names() {
        assert_eq!(
            events("<\u{e9}l\u{e9}ment v=\"\u{1F600}\">\u{4E2D}</\u{e9}l\u{e9}ment>").unwrap(),
            vec![
                start("\u{e9}l\u{e9}ment", &[("v", "\u{1F600}")]),
                chars("\u{4E2D}"),
                end("\u{e9}l\u{e9}ment"),
            ]
        );
    }

    #[test]
    fn test_decoded_utf16_document() {
        let bytes: Vec<u8> = [0xFF, 0xFE]
            .into_iter()
            .chain("<a>z</a>".encode_utf16().flat_map(|u| u.to_le_bytes()))
            .collect();
        let text = UnicodeText::decode(&bytes).unwrap();
        assert_eq!(
            parse_events(&text).unwrap(),
            vec![start("a", &[]), chars("z"), end("a")]
        );
    }
}
