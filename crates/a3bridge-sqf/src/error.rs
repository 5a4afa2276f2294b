//! Errors raised while reading SQF literals.

use thiserror::Error;

/// Errors that can occur when decoding SQF text.
///
/// Positions are byte offsets into the literal after any host quote
/// layer has been removed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    /// Input ended in the middle of a value.
    #[error("unexpected end of input")]
    UnexpectedEnd,

    /// A character that cannot start or continue the current value.
    #[error("unexpected character '{found}' at position {position}")]
    UnexpectedCharacter {
        /// The offending character.
        found: char,
        /// Byte offset of the character.
        position: usize,
    },

    /// A separator or closing bracket where a value was required.
    #[error("empty element at position {position}")]
    EmptyElement {
        /// Byte offset of the missing value.
        position: usize,
    },

    /// Non-whitespace content after a complete value.
    #[error("trailing input at position {position}")]
    TrailingInput {
        /// Byte offset where the trailing content starts.
        position: usize,
    },

    /// A numeric token that is not a valid number.
    #[error("invalid number '{literal}' at position {position}")]
    InvalidNumber {
        /// The rejected token.
        literal: String,
        /// Byte offset of the token.
        position: usize,
    },

    /// A bare word other than `true` or `false`.
    #[error("unsupported literal '{literal}' at position {position}")]
    UnsupportedLiteral {
        /// The rejected word.
        literal: String,
        /// Byte offset of the word.
        position: usize,
    },

    /// Arrays nested past the supported depth.
    #[error("arrays nested deeper than {max} levels")]
    TooDeep {
        /// Maximum nesting depth accepted by the decoder.
        max: usize,
    },

    /// Map decoding was given something other than an array.
    #[error("invalid format: expected an array of key-value pairs")]
    NotAnArray,

    /// A map entry that is not a two-element array.
    #[error("invalid key-value pair at index {index}")]
    InvalidPair {
        /// Index of the entry within its pair list.
        index: usize,
    },

    /// A map entry whose key is not a string.
    #[error("invalid key type at index {index}: expected string")]
    InvalidKey {
        /// Index of the entry within its pair list.
        index: usize,
    },
}

/// Result type for decoding operations.
pub type DecodeResult<T> = Result<T, DecodeError>;
