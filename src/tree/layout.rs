use std::collections::BTreeMap;

use bytes::Bytes;

/// Index of a file in the torrent's flat file table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FileId(pub usize);

/// One contiguous range of a file's bytes inside a single piece.
///
/// A file's fragments, in order, tile its byte range `[0, length)`. All but
/// the first fragment start at `offset_in_piece == 0`; all but the last end
/// at the piece boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileFragment {
    /// Index of the covering piece.
    pub piece: u32,
    /// Where the fragment starts inside that piece.
    pub offset_in_piece: u64,
    /// Fragment length in bytes.
    pub length: u64,
}

/// One contiguous range of a piece's bytes inside a single file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PieceSlice {
    /// The file the bytes belong to.
    pub file: FileId,
    /// Where the slice starts inside that file.
    pub offset_in_file: u64,
    /// Slice length in bytes.
    pub length: u64,
}

/// A piece of the torrent.
///
/// `slices`, in order, tile the piece's byte range; their lengths sum to
/// `length`, which equals the piece length for every piece but possibly
/// the last.
#[derive(Debug, Clone)]
pub struct Piece {
    pub index: u32,
    pub hash: [u8; 20],
    pub length: u64,
    pub slices: Vec<PieceSlice>,
}

/// Flat per-file record: placement in the torrent's piece space and the
/// fragments covering it.
#[derive(Debug, Clone)]
pub struct FileMeta {
    pub id: FileId,
    /// Informational absolute location, `/` + joined path segments.
    pub location: String,
    /// File length in bytes.
    pub length: u64,
    /// Byte offset of the file's first byte in the torrent's piece space.
    pub offset: u64,
    /// Covering piece fragments in file order; empty for zero-length files.
    pub fragments: Vec<FileFragment>,
}

/// A node of the directory tree.
///
/// Directory children are keyed by raw segment bytes; iteration order is
/// byte-lexicographic and deterministic.
#[derive(Debug, Clone)]
pub enum Node {
    Directory {
        location: String,
        children: BTreeMap<Bytes, Node>,
    },
    File {
        location: String,
        file: FileId,
    },
}

impl Node {
    /// Returns the node's informational location string.
    pub fn location(&self) -> &str {
        match self {
            Node::Directory { location, .. } => location,
            Node::File { location, .. } => location,
        }
    }

    /// Returns `true` for directory nodes.
    pub fn is_directory(&self) -> bool {
        matches!(self, Node::Directory { .. })
    }

    /// Returns the children map if this is a directory.
    pub fn children(&self) -> Option<&BTreeMap<Bytes, Node>> {
        match self {
            Node::Directory { children, .. } => Some(children),
            Node::File { .. } => None,
        }
    }

    /// Returns the file table index if this is a file.
    pub fn file_id(&self) -> Option<FileId> {
        match self {
            Node::File { file, .. } => Some(*file),
            Node::Directory { .. } => None,
        }
    }
}

/// The built directory tree plus both piece-layout views.
///
/// Read-only after construction; shares its lifetime with the `Metainfo`
/// it was built from.
#[derive(Debug, Clone)]
pub struct TorrentTree {
    pub(super) root_name: Bytes,
    pub(super) root: Node,
    pub(super) files: Vec<FileMeta>,
    pub(super) pieces: Vec<Piece>,
    pub(super) piece_length: u64,
    pub(super) total_length: u64,
    pub(super) creation_date: i64,
}

impl TorrentTree {
    /// Returns the root node, named [`root_name`](Self::root_name).
    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Returns the raw bytes of the root entry's name.
    pub fn root_name(&self) -> &Bytes {
        &self.root_name
    }

    /// Returns the flat file table in metainfo order.
    pub fn files(&self) -> &[FileMeta] {
        &self.files
    }

    /// Returns the record for one file.
    pub fn file(&self, id: FileId) -> &FileMeta {
        &self.files[id.0]
    }

    /// Returns all pieces with their hashes and file slices.
    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    /// Returns the number of bytes per piece (last piece may be shorter).
    pub fn piece_length(&self) -> u64 {
        self.piece_length
    }

    /// Returns the total length of all files.
    pub fn total_length(&self) -> u64 {
        self.total_length
    }

    /// Returns the number of pieces.
    pub fn pieces_count(&self) -> u64 {
        self.pieces.len() as u64
    }

    /// Returns the creation timestamp applied to every entry.
    pub fn creation_date(&self) -> i64 {
        self.creation_date
    }
}
