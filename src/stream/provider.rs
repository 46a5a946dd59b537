use std::sync::Arc;

use bytes::Bytes;

use crate::metainfo::{InfoHash, Metainfo};

/// Supplies downloaded pieces for one torrent session.
///
/// The provider owns the pieces in flight; a stream borrows each delivered
/// [`Bytes`] only long enough to copy out the slice it needs. Deadline
/// hints are advisory: lower ranks ask for earlier delivery, and the
/// provider decides how to honor them.
pub trait PieceProvider: Send + Sync {
    /// Returns `true` once the piece has been downloaded and verified.
    fn have_piece(&self, piece: u32) -> bool;

    /// Returns the piece bytes if available.
    fn read_piece(&self, piece: u32) -> Option<Bytes>;

    /// Asks for the piece to be prioritized; lower ranks come first.
    fn set_piece_deadline(&self, piece: u32, rank: u32);

    /// Drops all deadline hints registered for this session.
    fn clear_deadlines(&self);
}

/// Mints per-torrent piece sessions.
///
/// The engine behind this trait is the component that actually talks to
/// peers; registering a torrent yields the [`PieceProvider`] handle that
/// streams read from.
pub trait PieceEngine: Send + Sync {
    fn add_torrent(&self, info_hash: InfoHash, metainfo: &Metainfo) -> Arc<dyn PieceProvider>;
}
