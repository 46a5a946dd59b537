use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use super::error::VfsError;
use super::oracle::{TypeHandle, TypeOracle};
use super::source::ByteSource;
use crate::metainfo::Metainfo;
use crate::stream::{FileStream, PieceEngine, PieceProvider, StreamConfig};
use crate::tree::{FileId, Node, TorrentTree};

/// Read-only permission mask reported by every entry.
const ENTRY_PERMISSIONS: u32 = 0o444;

struct Mounted {
    tree: Arc<TorrentTree>,
    metainfo: Arc<Metainfo>,
    provider: Arc<dyn PieceProvider>,
    oracle: Arc<dyn TypeOracle>,
}

/// A torrent mounted as a virtual directory.
///
/// The mount itself acts as the directory containing the torrent's root
/// entry (the entry named by the metainfo `name`). Construction never
/// fails: a malformed torrent mounts inert, with empty iteration and the
/// failure retrievable from [`last_error`](Self::last_error).
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use btfs::vfs::{MemorySource, PlainTypeOracle, TorrentVfs};
/// # use btfs::stream::PieceEngine;
/// # fn engine() -> Arc<dyn PieceEngine> { unimplemented!() }
///
/// let data = std::fs::read("example.torrent").unwrap();
/// let mut source = MemorySource::new(data, 0);
/// let vfs = TorrentVfs::mount(&mut source, Arc::new(PlainTypeOracle), engine().as_ref());
///
/// for entry in vfs.entries() {
///     println!("{}", entry.location());
/// }
/// ```
pub struct TorrentVfs {
    mounted: Option<Mounted>,
    last_error: Mutex<Option<VfsError>>,
}

impl TorrentVfs {
    /// Reads, validates, and mounts a torrent.
    ///
    /// On success the torrent is registered with the piece engine and the
    /// directory tree becomes iterable. On failure the mount is inert and
    /// the error is retrievable.
    pub fn mount(
        source: &mut dyn ByteSource,
        oracle: Arc<dyn TypeOracle>,
        engine: &dyn PieceEngine,
    ) -> TorrentVfs {
        match Self::try_mount(source, oracle, engine) {
            Ok(mounted) => TorrentVfs {
                mounted: Some(mounted),
                last_error: Mutex::new(None),
            },
            Err(error) => {
                debug!(%error, "torrent mount failed");
                TorrentVfs {
                    mounted: None,
                    last_error: Mutex::new(Some(error)),
                }
            }
        }
    }

    fn try_mount(
        source: &mut dyn ByteSource,
        oracle: Arc<dyn TypeOracle>,
        engine: &dyn PieceEngine,
    ) -> Result<Mounted, VfsError> {
        let size = usize::try_from(source.size())
            .map_err(|_| VfsError::Source("torrent file too large".to_string()))?;
        let mut data = vec![0u8; size];
        let read = source
            .read_all(&mut data)
            .map_err(|e| VfsError::Source(e.to_string()))?;
        if read != size as u64 {
            return Err(VfsError::Source("short read of torrent file".to_string()));
        }

        let metainfo = Metainfo::from_bytes(&data, source.ctime())?;
        let tree = TorrentTree::build(&metainfo)?;
        let provider = engine.add_torrent(metainfo.info_hash, &metainfo);

        Ok(Mounted {
            tree: Arc::new(tree),
            metainfo: Arc::new(metainfo),
            provider,
            oracle,
        })
    }

    /// Returns `true` when the torrent parsed and the tree is live.
    pub fn is_mounted(&self) -> bool {
        self.mounted.is_some()
    }

    /// Returns the most recent failure observed on this mount.
    pub fn last_error(&self) -> Option<VfsError> {
        self.last_error.lock().clone()
    }

    /// Returns the validated metainfo, if mounted.
    pub fn metainfo(&self) -> Option<&Arc<Metainfo>> {
        self.mounted.as_ref().map(|m| &m.metainfo)
    }

    /// Returns the directory tree, if mounted.
    pub fn tree(&self) -> Option<&Arc<TorrentTree>> {
        self.mounted.as_ref().map(|m| &m.tree)
    }

    /// Iterates the mount's entries: the torrent's root entry, or nothing
    /// for an inert mount.
    pub fn entries(&self) -> impl Iterator<Item = NodeView<'_>> {
        self.mounted.iter().map(|m| {
            NodeView::new(m, &self.last_error, m.tree.root_name().as_ref(), m.tree.root())
        })
    }

    /// Looks up the root entry by name.
    pub fn lookup(&self, name: &[u8]) -> Option<NodeView<'_>> {
        let mounted = self.mounted.as_ref()?;
        (mounted.tree.root_name().as_ref() == name).then(|| {
            NodeView::new(
                mounted,
                &self.last_error,
                mounted.tree.root_name().as_ref(),
                mounted.tree.root(),
            )
        })
    }
}

/// A view of one tree node, typed by kind.
pub enum NodeView<'a> {
    Directory(DirectoryNode<'a>),
    File(FileNode<'a>),
}

impl<'a> NodeView<'a> {
    fn new(
        mounted: &'a Mounted,
        errors: &'a Mutex<Option<VfsError>>,
        name: &'a [u8],
        node: &'a Node,
    ) -> Self {
        match node {
            Node::Directory { .. } => NodeView::Directory(DirectoryNode {
                mounted,
                errors,
                name,
                node,
                entry_type: mounted.oracle.type_of_directory(),
            }),
            Node::File { file, .. } => NodeView::File(FileNode {
                mounted,
                errors,
                name,
                node,
                file: *file,
                entry_type: mounted.oracle.type_of_file(name),
            }),
        }
    }

    /// Returns the entry name: the last path segment, raw bytes.
    pub fn title(&self) -> &'a [u8] {
        match self {
            NodeView::Directory(dir) => dir.title(),
            NodeView::File(file) => file.title(),
        }
    }

    /// Returns the informational location string.
    pub fn location(&self) -> &'a str {
        match self {
            NodeView::Directory(dir) => dir.location(),
            NodeView::File(file) => file.location(),
        }
    }

    /// Returns the content type resolved by the oracle.
    pub fn node_type(&self) -> &TypeHandle {
        match self {
            NodeView::Directory(dir) => dir.node_type(),
            NodeView::File(file) => file.node_type(),
        }
    }

    /// Returns the entry size: file length, 0 for directories.
    pub fn size(&self) -> u64 {
        match self {
            NodeView::Directory(_) => 0,
            NodeView::File(file) => file.size(),
        }
    }

    pub fn ctime(&self) -> i64 {
        match self {
            NodeView::Directory(dir) => dir.mounted.tree.creation_date(),
            NodeView::File(file) => file.mounted.tree.creation_date(),
        }
    }

    pub fn mtime(&self) -> i64 {
        self.ctime()
    }

    pub fn atime(&self) -> i64 {
        self.ctime()
    }

    pub fn permissions(&self) -> u32 {
        ENTRY_PERMISSIONS
    }

    pub fn is_directory(&self) -> bool {
        matches!(self, NodeView::Directory(_))
    }

    pub fn as_directory(&self) -> Option<&DirectoryNode<'a>> {
        match self {
            NodeView::Directory(dir) => Some(dir),
            NodeView::File(_) => None,
        }
    }

    pub fn as_file(&self) -> Option<&FileNode<'a>> {
        match self {
            NodeView::File(file) => Some(file),
            NodeView::Directory(_) => None,
        }
    }
}

/// A directory entry: sorted child iteration and lookup, no mutation.
pub struct DirectoryNode<'a> {
    mounted: &'a Mounted,
    errors: &'a Mutex<Option<VfsError>>,
    name: &'a [u8],
    node: &'a Node,
    entry_type: TypeHandle,
}

impl<'a> DirectoryNode<'a> {
    pub fn title(&self) -> &'a [u8] {
        self.name
    }

    pub fn location(&self) -> &'a str {
        self.node.location()
    }

    /// Returns the content type, resolved when the view was constructed.
    pub fn node_type(&self) -> &TypeHandle {
        &self.entry_type
    }

    /// Iterates children in byte-lexicographic name order.
    pub fn entries(&self) -> impl Iterator<Item = NodeView<'a>> + '_ {
        self.node
            .children()
            .into_iter()
            .flatten()
            .map(|(name, node)| NodeView::new(self.mounted, self.errors, name.as_ref(), node))
    }

    /// Looks up a child by exact name bytes.
    pub fn lookup(&self, name: &[u8]) -> Option<NodeView<'a>> {
        self.node
            .children()?
            .get_key_value(name)
            .map(|(key, node)| NodeView::new(self.mounted, self.errors, key.as_ref(), node))
    }

    /// Entry creation is not available on a torrent mount.
    pub fn create_entry(&self, _name: &[u8]) -> Result<(), VfsError> {
        Err(self.fail(VfsError::ReadOnly))
    }

    pub fn rename(&self, _name: &[u8], _to: &[u8]) -> Result<(), VfsError> {
        Err(self.fail(VfsError::NotSupported))
    }

    pub fn remove(&self, _name: &[u8]) -> Result<(), VfsError> {
        Err(self.fail(VfsError::NotSupported))
    }

    pub fn copy(&self, _name: &[u8], _to: &[u8]) -> Result<(), VfsError> {
        Err(self.fail(VfsError::NotSupported))
    }

    fn fail(&self, error: VfsError) -> VfsError {
        *self.errors.lock() = Some(error.clone());
        error
    }
}

/// A file entry; opening it yields a piece-backed [`FileStream`].
pub struct FileNode<'a> {
    mounted: &'a Mounted,
    errors: &'a Mutex<Option<VfsError>>,
    name: &'a [u8],
    node: &'a Node,
    file: FileId,
    entry_type: TypeHandle,
}

impl<'a> FileNode<'a> {
    pub fn title(&self) -> &'a [u8] {
        self.name
    }

    pub fn location(&self) -> &'a str {
        self.node.location()
    }

    /// Returns the content type, resolved when the view was constructed.
    pub fn node_type(&self) -> &TypeHandle {
        &self.entry_type
    }

    pub fn size(&self) -> u64 {
        self.mounted.tree.file(self.file).length
    }

    /// Opens a read stream at position 0.
    pub fn open(&self) -> FileStream {
        FileStream::open(
            Arc::clone(&self.mounted.tree),
            self.file,
            Arc::clone(&self.mounted.provider),
        )
    }

    /// Opens a read stream with explicit configuration.
    pub fn open_with(&self, config: StreamConfig) -> FileStream {
        FileStream::open_with(
            Arc::clone(&self.mounted.tree),
            self.file,
            Arc::clone(&self.mounted.provider),
            config,
        )
    }

    pub fn rename(&self, _to: &[u8]) -> Result<(), VfsError> {
        Err(self.fail(VfsError::NotSupported))
    }

    pub fn remove(&self) -> Result<(), VfsError> {
        Err(self.fail(VfsError::NotSupported))
    }

    fn fail(&self, error: VfsError) -> VfsError {
        *self.errors.lock() = Some(error.clone());
        error
    }
}
