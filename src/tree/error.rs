use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    /// A file path names an entry that already exists.
    #[error("file path collides with an existing entry")]
    PathCollision,

    /// An entry location string exceeds the maximum length.
    #[error("entry location too long")]
    LocationOverflow,

    /// The hash count does not cover the torrent's total length.
    #[error("piece count does not match hash count")]
    PieceCountMismatch,

    /// The implied final piece size is not in `(0, piece_length]`.
    #[error("final piece size out of range")]
    FinalPieceOutOfRange,
}
