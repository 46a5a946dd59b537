//! Directory tree and piece layout
//!
//! Converts the flat file list of a [`Metainfo`](crate::metainfo::Metainfo)
//! into a sorted directory tree rooted at the torrent name, and derives the
//! two views of the piece layout: per file, the piece fragments covering its
//! bytes; per piece, the file slices the piece is made of. Both views are
//! fixed once built.

mod builder;
mod error;
mod layout;

pub use error::TreeError;
pub use layout::{FileFragment, FileId, FileMeta, Node, Piece, PieceSlice, TorrentTree};

#[cfg(test)]
mod tests;
