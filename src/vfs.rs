//! Read-only directory view over a torrent
//!
//! [`TorrentVfs::mount`] reads a `.torrent` file from a [`ByteSource`],
//! validates it, builds the directory tree, and registers the torrent with
//! a [`PieceEngine`](crate::stream::PieceEngine). The result is a virtual
//! directory: iterate entries, look up children, open file streams. All
//! entries are read-only; mutating operations fail uniformly.
//!
//! A torrent that fails to parse mounts as an inert tree: iteration yields
//! nothing and [`TorrentVfs::last_error`] reports the failure, keeping
//! "failed to parse" observably distinct from "parsed but empty".

mod entry;
mod error;
mod oracle;
mod source;

pub use entry::{DirectoryNode, FileNode, NodeView, TorrentVfs};
pub use error::VfsError;
pub use oracle::{PlainTypeOracle, TypeHandle, TypeOracle};
pub use source::{ByteSource, FileSource, MemorySource};
