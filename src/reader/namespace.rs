//! Namespace Scope Table
//!
//! Stack of `xmlns` bindings tagged with the depth of the element that
//! declared them, plus the client-registered short-id table.

use crate::core::text::UnicodeText;

/// Namespace binding (prefix -> URI)
#[derive(Debug, Clone)]
struct NsBinding {
    prefix: UnicodeText,
    uri: UnicodeText,
    /// Short id registered for `uri` when the binding was declared
    id: Option<char>,
    depth: usize,
}

#[derive(Debug, Clone)]
struct Registration {
    id: char,
    uri: UnicodeText,
}

/// Stack-based namespace table
#[derive(Debug, Clone)]
pub struct NamespaceTable {
    bindings: Vec<NsBinding>,
    registered: Vec<Registration>,
    max_bindings: usize,
    max_registered: usize,
}

impl NamespaceTable {
    pub fn new(max_bindings: usize, max_registered: usize) -> Self {
        NamespaceTable {
            bindings: Vec::with_capacity(max_bindings.min(16)),
            registered: Vec::new(),
            max_bindings,
            max_registered,
        }
    }

    /// Declare a binding for the element at `depth`.
    ///
    /// Returns false when the table already holds `max_bindings` entries.
    pub fn declare(&mut self, prefix: UnicodeText, uri: UnicodeText, depth: usize) -> bool {
        if self.bindings.len() >= self.max_bindings {
            return false;
        }
        let id = self.registered_id(&uri);
        self.bindings.push(NsBinding {
            prefix,
            uri,
            id,
            depth,
        });
        true
    }

    /// Leave the element at `depth`, removing the bindings it declared
    pub fn pop_scope(&mut self, depth: usize) {
        while let Some(binding) = self.bindings.last() {
            if binding.depth < depth {
                break;
            }
            self.bindings.pop();
        }
    }

    /// Drop every binding; registrations survive
    pub fn clear_scopes(&mut self) {
        self.bindings.clear();
    }

    /// Resolve a prefix to its URI; the empty prefix is the default namespace
    pub fn resolve(&self, prefix: &UnicodeText) -> Option<&UnicodeText> {
        self.find(prefix).map(|b| &b.uri)
    }

    /// Short id of the URI a prefix is bound to
    pub fn id_of(&self, prefix: &UnicodeText) -> Option<char> {
        self.find(prefix).and_then(|b| b.id)
    }

    fn find(&self, prefix: &UnicodeText) -> Option<&NsBinding> {
        // Search from most recent to oldest
        self.bindings.iter().rev().find(|b| b.prefix == *prefix)
    }

    /// Number of live bindings
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Bind a short id in `'a'..='z'` to a URI. Re-registering an id
    /// replaces its URI.
    pub fn register(&mut self, id: char, uri: UnicodeText) -> Result<(), &'static str> {
        if !id.is_ascii_lowercase() {
            return Err("illegal namespace id");
        }
        if uri.is_empty() {
            return Err("empty namespace uri");
        }
        if let Some(existing) = self.registered.iter_mut().find(|r| r.id == id) {
            existing.uri = uri;
            return Ok(());
        }
        if self.registered.len() >= self.max_registered {
            return Err("too many registered namespaces");
        }
        self.registered.push(Registration { id, uri });
        Ok(())
    }

    /// Short id registered for a URI
    pub fn registered_id(&self, uri: &UnicodeText) -> Option<char> {
        self.registered.iter().find(|r| r.uri == *uri).map(|r| r.id)
    }
}
