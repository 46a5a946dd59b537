use crate::bencode::DecodeError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MetainfoError {
    #[error("bencode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("missing field: {0}")]
    MissingField(&'static str),

    #[error("wrong type for {0}")]
    WrongType(&'static str),

    #[error("duplicate key: {0}")]
    DuplicateKey(&'static str),

    #[error("declared encoding is not UTF-8")]
    BadEncoding,

    #[error("bad file path")]
    BadPath,

    #[error("exactly one of length and files must be present")]
    LengthFilesConflict,

    #[error("pieces length is not a multiple of 20")]
    PiecesNotMultiple20,

    #[error("empty name")]
    EmptyName,

    #[error("invalid info hash length")]
    InvalidInfoHashLength,
}
