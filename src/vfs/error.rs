use thiserror::Error;

use crate::metainfo::MetainfoError;
use crate::tree::TreeError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VfsError {
    /// Reading the backing `.torrent` bytes failed.
    #[error("source error: {0}")]
    Source(String),

    /// The metainfo failed to decode or validate.
    #[error(transparent)]
    Metainfo(#[from] MetainfoError),

    /// The directory tree or piece layout could not be built.
    #[error(transparent)]
    Tree(#[from] TreeError),

    /// The entry rejects modification.
    #[error("entry is read-only")]
    ReadOnly,

    /// The operation is not available on a torrent mount.
    #[error("operation not supported")]
    NotSupported,
}
