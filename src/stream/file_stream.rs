use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use tokio::time::{sleep, Instant};
use tracing::trace;

use super::error::StreamError;
use super::provider::PieceProvider;
use crate::constants::{PIECE_POKE_INTERVAL, READ_AHEAD_PIECES, READ_BUDGET};
use crate::tree::{FileId, FileMeta, TorrentTree};

/// Origin of a seek offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Whence {
    /// Offset from the start of the file.
    FromBeginning,
    /// Signed offset from the current position.
    FromCurrent,
    /// Offset measured back from the end of the file.
    FromEnd,
}

/// Tuning knobs for one stream.
#[derive(Debug, Clone)]
pub struct StreamConfig {
    /// Interval between piece-availability polls.
    pub poke_interval: Duration,
    /// Total wait budget per read call.
    pub read_budget: Duration,
    /// Number of upcoming pieces hinted to the provider.
    pub read_ahead_pieces: u32,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            poke_interval: PIECE_POKE_INTERVAL,
            read_budget: READ_BUDGET,
            read_ahead_pieces: READ_AHEAD_PIECES,
        }
    }
}

/// A read-only stream over one file of a torrent.
///
/// The stream maps its position through the file's piece layout, requests
/// pieces from the provider one at a time, and copies out the covering
/// slice. The most recently delivered piece stays buffered, so sequential
/// reads within one piece fetch it once.
///
/// A stream has a single reader; concurrent `read`/`seek` calls on the same
/// stream are not supported. Multiple streams over the same torrent may
/// share one provider.
pub struct FileStream {
    tree: Arc<TorrentTree>,
    file: FileId,
    provider: Arc<dyn PieceProvider>,
    config: StreamConfig,
    pos: u64,
    buffered: Option<(u32, Bytes)>,
}

impl FileStream {
    /// Opens a stream at position 0 with default configuration.
    pub fn open(tree: Arc<TorrentTree>, file: FileId, provider: Arc<dyn PieceProvider>) -> Self {
        Self::open_with(tree, file, provider, StreamConfig::default())
    }

    /// Opens a stream with explicit configuration.
    ///
    /// Registers read-ahead hints for the pieces covering the start of the
    /// file, with earlier pieces getting earlier deadlines.
    pub fn open_with(
        tree: Arc<TorrentTree>,
        file: FileId,
        provider: Arc<dyn PieceProvider>,
        config: StreamConfig,
    ) -> Self {
        let stream = Self {
            tree,
            file,
            provider,
            config,
            pos: 0,
            buffered: None,
        };
        stream.hint_read_ahead();
        stream
    }

    /// Returns the current position in the file.
    pub fn position(&self) -> u64 {
        self.pos
    }

    /// Returns the file length in bytes.
    pub fn length(&self) -> u64 {
        self.meta().length
    }

    /// Moves the read position.
    ///
    /// `FromEnd` offsets are measured back from the end: `seek(10,
    /// FromEnd)` on a 100-byte file lands on 90. Seeking to the file
    /// length is legal; reads from there return 0 bytes.
    ///
    /// # Errors
    ///
    /// [`StreamError::OutOfRange`] when the target falls outside
    /// `[0, length]`; the position is left unchanged.
    pub fn seek(&mut self, offset: i64, whence: Whence) -> Result<u64, StreamError> {
        let length = self.meta().length;

        let new_pos = match whence {
            Whence::FromBeginning => u64::try_from(offset).ok(),
            Whence::FromCurrent => self.pos.checked_add_signed(offset),
            Whence::FromEnd => u64::try_from(offset)
                .ok()
                .and_then(|back| length.checked_sub(back)),
        };
        let new_pos = new_pos
            .filter(|p| *p <= length)
            .ok_or(StreamError::OutOfRange)?;

        if new_pos != self.pos {
            self.pos = new_pos;
            self.provider.clear_deadlines();
            self.hint_read_ahead();
        }
        Ok(self.pos)
    }

    /// Reads up to `buf.len()` bytes at the current position.
    ///
    /// Waits for each missing piece by polling the provider every
    /// [`StreamConfig::poke_interval`], within one
    /// [`StreamConfig::read_budget`] for the whole call. When the budget
    /// elapses, whatever has been copied so far is returned; callers detect
    /// timeouts by short (possibly zero-byte) reads.
    pub async fn read(&mut self, buf: &mut [u8]) -> usize {
        let (offset, length) = {
            let meta = self.meta();
            (meta.offset, meta.length)
        };
        let piece_length = self.tree.piece_length();
        let deadline = Instant::now() + self.config.read_budget;
        let mut copied = 0;

        while copied < buf.len() && self.pos < length {
            let global = offset + self.pos;
            let piece = (global / piece_length) as u32;
            let offset_in_piece = (global % piece_length) as usize;

            let data = match self.piece_bytes(piece, deadline).await {
                Some(data) => data,
                None => break,
            };

            let remaining = usize::try_from(length - self.pos).unwrap_or(usize::MAX);
            let n = (buf.len() - copied)
                .min(remaining)
                .min(data.len().saturating_sub(offset_in_piece));
            if n == 0 {
                break;
            }

            buf[copied..copied + n].copy_from_slice(&data[offset_in_piece..offset_in_piece + n]);
            copied += n;
            self.pos += n as u64;
        }

        copied
    }

    /// Streams are read-only; writing always fails.
    pub fn write(&mut self, _buf: &[u8]) -> Result<usize, StreamError> {
        Err(StreamError::ReadOnly)
    }

    fn meta(&self) -> &FileMeta {
        self.tree.file(self.file)
    }

    /// Returns the piece bytes, waiting for delivery within the deadline.
    async fn piece_bytes(&mut self, piece: u32, deadline: Instant) -> Option<Bytes> {
        if let Some((index, data)) = &self.buffered {
            if *index == piece {
                return Some(data.clone());
            }
        }

        loop {
            if self.provider.have_piece(piece) {
                if let Some(data) = self.provider.read_piece(piece) {
                    self.buffered = Some((piece, data.clone()));
                    return Some(data);
                }
            }

            let now = Instant::now();
            if now >= deadline {
                trace!(piece, "piece wait budget elapsed");
                return None;
            }
            sleep(self.config.poke_interval.min(deadline - now)).await;
        }
    }

    fn hint_read_ahead(&self) {
        if self.config.read_ahead_pieces == 0 {
            return;
        }
        let meta = self.meta();
        if meta.length == 0 || self.pos >= meta.length {
            return;
        }

        let piece_length = self.tree.piece_length();
        let first = (meta.offset + self.pos) / piece_length;
        let file_last = (meta.offset + meta.length - 1) / piece_length;
        let last = (first + u64::from(self.config.read_ahead_pieces) - 1).min(file_last);

        for (rank, piece) in (first..=last).enumerate() {
            self.provider.set_piece_deadline(piece as u32, rank as u32);
        }
    }
}

impl Drop for FileStream {
    fn drop(&mut self) {
        self.provider.clear_deadlines();
    }
}
