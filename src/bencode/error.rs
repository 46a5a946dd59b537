use thiserror::Error;

/// Errors that can occur while decoding bencode.
///
/// # Examples
///
/// ```
/// use btfs::bencode::{decode, DecodeError};
///
/// // Truncated input
/// let result = decode(b"i42");
/// assert!(matches!(result, Err(DecodeError::UnexpectedEof)));
///
/// // Invalid integer (leading zeros)
/// let result = decode(b"i007e");
/// assert!(matches!(result, Err(DecodeError::BadInteger(_))));
///
/// // Trailing data
/// let result = decode(b"i42eextra");
/// assert!(matches!(result, Err(DecodeError::Trailing)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Input ended before a complete value was parsed.
    #[error("unexpected end of input")]
    UnexpectedEof,

    /// Integer is malformed (empty, `-0`, leading zeros, or overflow).
    #[error("bad integer: {0}")]
    BadInteger(String),

    /// Byte string length prefix is not a valid number.
    #[error("bad string length")]
    BadStringLength,

    /// Dictionary key is not a byte string.
    #[error("dictionary key is not a byte string")]
    BadKeyType,

    /// Extra data exists after the outer value.
    #[error("trailing data after value")]
    Trailing,

    /// Nesting limit exceeded.
    #[error("nesting too deep")]
    DepthLimit,
}
