//! Error types for the span-text codec.
//!
//! Decoding span text never fails: malformed regions fall back to plain
//! text. Errors only arise where the codec has to consult the
//! writing-system resolver, or from the standalone hex helper.

use thiserror::Error;

/// Result type for span-text operations.
pub type SpanTextResult<T> = Result<T, SpanTextError>;

/// Errors that can occur while converting between span text and native rich text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SpanTextError {
    /// A run's language tag has no writing-system id.
    #[error("unknown language tag: {tag}")]
    UnknownLanguage {
        /// The unresolved language tag.
        tag: String,
    },

    /// A native run refers to a writing-system id with no tag.
    #[error("unknown writing system id: {id}")]
    UnknownWritingSystem {
        /// The unresolved writing-system id.
        id: i32,
    },

    /// Hex-encoded property payload is malformed.
    #[error("invalid hex payload: {message}")]
    InvalidHex {
        /// Description of the problem.
        message: String,
    },
}

impl SpanTextError {
    /// Create an unknown language error.
    pub fn unknown_language(tag: impl Into<String>) -> Self {
        Self::UnknownLanguage { tag: tag.into() }
    }

    /// Create an invalid hex error.
    pub fn invalid_hex(message: impl Into<String>) -> Self {
        Self::InvalidHex {
            message: message.into(),
        }
    }
}
