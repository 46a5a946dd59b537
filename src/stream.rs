//! Piece-backed file streams
//!
//! A [`FileStream`] reads the bytes of one torrent file by mapping its
//! position through the piece layout and fetching the covering pieces from
//! a [`PieceProvider`]. Reads wait for missing pieces on a polling
//! interval within a bounded budget; a timeout surfaces as a short read,
//! never as an error. Streams are read-only.

mod error;
mod file_stream;
mod provider;

pub use error::StreamError;
pub use file_stream::{FileStream, StreamConfig, Whence};
pub use provider::{PieceEngine, PieceProvider};

#[cfg(test)]
mod tests;
