//! Codec Errors
//!
//! Errors raised by the code point conversions and by `UnicodeText`.
//! Every failure is fatal to the call that raised it: there is no partial
//! result and no substitution of replacement characters.

use super::encoding::Encoding;
use thiserror::Error;

/// Error raised while encoding, decoding or indexing Unicode text
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// An invalid or truncated code unit sequence
    #[error("{encoding} decode error at position {position} (value 0x{value:X}): {description}")]
    InvalidCodeUnit {
        encoding: Encoding,
        /// Offending byte, code unit or code point
        value: u32,
        /// Offset of the offending unit in its source buffer
        position: usize,
        description: &'static str,
    },

    /// A position or index outside the valid range
    #[error("illegal index {name} = {index}")]
    IllegalIndex { name: &'static str, index: usize },

    /// A declared capability with no implementation
    #[error("not implemented: {0}")]
    NotImplemented(&'static str),
}

impl CodecError {
    #[inline]
    pub(crate) fn invalid(
        encoding: Encoding,
        value: u32,
        position: usize,
        description: &'static str,
    ) -> Self {
        CodecError::InvalidCodeUnit {
            encoding,
            value,
            position,
            description,
        }
    }

    #[inline]
    pub(crate) fn index(name: &'static str, index: usize) -> Self {
        CodecError::IllegalIndex { name, index }
    }

    /// Move an encoding error found in a sub-slice into the coordinates of
    /// its source buffer: `position` becomes `base + position * scale`
    pub(crate) fn relocate(self, encoding: Encoding, base: usize, scale: usize) -> Self {
        match self {
            CodecError::InvalidCodeUnit {
                value,
                position,
                description,
                ..
            } => CodecError::InvalidCodeUnit {
                encoding,
                value,
                position: base + position * scale,
                description,
            },
            other => other,
        }
    }

    /// Position of the offending unit, for encoding errors
    pub fn position(&self) -> Option<usize> {
        match self {
            CodecError::InvalidCodeUnit { position, .. } => Some(*position),
            _ => None,
        }
    }
}

/// Result alias for codec operations
pub type Result<T> = std::result::Result<T, CodecError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_invalid_code_unit() {
        let err = CodecError::invalid(Encoding::Utf8, 0xC0, 3, "invalid continuation byte");
        assert_eq!(
            err.to_string(),
            "UTF-8 decode error at position 3 (value 0xC0): invalid continuation byte"
        );
        assert_eq!(err.position(), Some(3));
    }

    #[test]
    fn test_display_illegal_index() {
        let err = CodecError::index("pos", 17);
        assert_eq!(err.to_string(), "illegal index pos = 17");
        assert_eq!(err.position(), None);
    }

    #[test]
    fn test_relocate() {
        let err = CodecError::invalid(Encoding::Utf16, 0xDC00, 2, "unpaired low surrogate")
            .relocate(Encoding::Utf16Be, 2, 2);
        assert_eq!(err.position(), Some(6));
        assert!(matches!(
            err,
            CodecError::InvalidCodeUnit {
                encoding: Encoding::Utf16Be,
                ..
            }
        ));
        let err = CodecError::index("pos", 1).relocate(Encoding::Utf8, 3, 1);
        assert_eq!(err, CodecError::index("pos", 1));
    }

    #[test]
    fn test_not_implemented_is_distinct() {
        let err = CodecError::NotImplemented("case-insensitive compare");
        assert!(matches!(err, CodecError::NotImplemented(_)));
        assert_eq!(err.to_string(), "not implemented: case-insensitive compare");
    }
}
