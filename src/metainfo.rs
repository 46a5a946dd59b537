//! Torrent metainfo validation (BEP-3)
//!
//! Turns decoded bencode into a typed, read-only [`Metainfo`] record. The
//! validator enforces the v1 schema strictly: every recognized key may
//! appear at most once, `length` and `files` are mutually exclusive, and
//! a declared `encoding` must be exactly `UTF-8`.

mod error;
mod info_hash;
mod torrent;

pub use error::MetainfoError;
pub use info_hash::InfoHash;
pub use torrent::{FileEntry, Metainfo};
