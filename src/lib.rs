//! btfs - a BitTorrent metainfo virtual filesystem
//!
//! This library exposes a `.torrent` file as a read-only directory tree.
//! Consumers iterate the tree like a local filesystem: enumerate children,
//! open a leaf, read bytes at arbitrary offsets. Piece retrieval is
//! delegated to a pluggable provider; this crate handles everything from
//! the raw metainfo bytes to byte-accurate reads across piece boundaries.
//!
//! # Modules
//!
//! - [`bencode`] - BEP-3 bencode decoding with info-dictionary span capture
//! - [`metainfo`] - metainfo schema validation and info hashes
//! - [`tree`] - directory tree construction and the piece/file layout maps
//! - [`tracker`] - HTTP tracker announces over a pluggable transport
//! - [`stream`] - piece-backed read-only file streams
//! - [`vfs`] - the host-facing directory view
//! - [`constants`] - tuning parameters and protocol constants

pub mod bencode;
pub mod constants;
pub mod metainfo;
pub mod stream;
pub mod tracker;
pub mod tree;
pub mod vfs;

pub use bencode::{decode, decode_torrent, encode, DecodeError, DecodedTorrent, Value};
pub use metainfo::{FileEntry, InfoHash, Metainfo, MetainfoError};
pub use stream::{FileStream, PieceEngine, PieceProvider, StreamConfig, StreamError, Whence};
pub use tracker::{
    AnnounceRequest, AnnounceResponse, HttpTransport, PeerId, TrackerClient, TrackerError,
    TrackerEvent, TrackerTransport,
};
pub use tree::{FileFragment, FileId, FileMeta, Node, Piece, PieceSlice, TorrentTree, TreeError};
pub use vfs::{
    ByteSource, DirectoryNode, FileNode, FileSource, MemorySource, NodeView, PlainTypeOracle,
    TorrentVfs, TypeHandle, TypeOracle, VfsError,
};
