//! Reader Configuration

/// Options and limits for `XmlReader`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReaderConfig {
    /// Reduce `prefix:local` element and attribute names to `local`
    pub strip_namespaces: bool,
    /// Return processing instructions as events instead of skipping them
    pub emit_instructions: bool,
    /// Return comments as events instead of skipping them
    pub emit_comments: bool,
    /// Maximum number of open elements
    pub max_nesting: usize,
    /// Maximum number of live `xmlns` bindings
    pub max_namespaces: usize,
    /// Maximum number of registered short ids
    pub max_registered_namespaces: usize,
    /// Maximum number of attributes on one tag
    pub max_attributes: usize,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        ReaderConfig {
            strip_namespaces: true,
            emit_instructions: false,
            emit_comments: true,
            max_nesting: 64,
            max_namespaces: 32,
            max_registered_namespaces: 32,
            max_attributes: 32,
        }
    }
}

impl ReaderConfig {
    pub fn with_strip_namespaces(mut self, strip: bool) -> Self {
        self.strip_namespaces = strip;
        self
    }

    pub fn with_emit_instructions(mut self, emit: bool) -> Self {
        self.emit_instructions = emit;
        self
    }

    pub fn with_emit_comments(mut self, emit: bool) -> Self {
        self.emit_comments = emit;
        self
    }

    pub fn with_max_nesting(mut self, max: usize) -> Self {
        self.max_nesting = max;
        self
    }

    pub fn with_max_namespaces(mut self, max: usize) -> Self {
        self.max_namespaces = max;
        self
    }

    pub fn with_max_attributes(mut self, max: usize) -> Self {
        self.max_attributes = max;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ReaderConfig::default();
        assert!(config.strip_namespaces);
        assert!(!config.emit_instructions);
        assert!(config.emit_comments);
        assert_eq!(config.max_nesting, 64);
        assert_eq!(config.max_namespaces, 32);
        assert_eq!(config.max_registered_namespaces, 32);
        assert_eq!(config.max_attributes, 32);
    }

    #[test]
    fn test_builders() {
        let config = ReaderConfig::default()
            .with_strip_namespaces(false)
            .with_emit_instructions(true)
            .with_max_nesting(4);
        assert!(!config.strip_namespaces);
        assert!(config.emit_instructions);
        assert_eq!(config.max_nesting, 4);
    }
}
