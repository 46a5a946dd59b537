//! Tuning parameters and protocol constants.

use std::time::Duration;

// ============================================================================
// Client identification
// ============================================================================

/// Client ID prefix for peer ID generation (Azureus-style)
pub const CLIENT_PREFIX: &[u8] = b"-BF0001-";

/// User agent string for HTTP requests
pub const USER_AGENT: &str = "btfs/0.1.0";

/// Default BitTorrent listen port reported to trackers
pub const DEFAULT_PORT: u16 = 6881;

// ============================================================================
// Metainfo
// ============================================================================

/// Size of a SHA-1 digest; pieces are identified by hashes of this length
pub const HASH_SIZE: usize = 20;

/// Maximum bencode nesting depth accepted by the decoder
pub const MAX_DECODE_DEPTH: usize = 256;

/// Maximum length of an entry location string
pub const MAX_LOCATION_LENGTH: usize = 4096;

// ============================================================================
// Tracker
// ============================================================================

/// Maximum length of an assembled announce URL
pub const MAX_ANNOUNCE_URL_LENGTH: usize = 4096;

/// HTTP tracker request timeout
pub const HTTP_TRACKER_TIMEOUT: Duration = Duration::from_secs(30);

// ============================================================================
// Streaming
// ============================================================================

/// Interval between piece-availability polls while a read is waiting
pub const PIECE_POKE_INTERVAL: Duration = Duration::from_millis(100);

/// Total wait budget per read call; on elapse the read returns short
pub const READ_BUDGET: Duration = Duration::from_secs(60);

/// Number of pieces ahead of the read position hinted to the provider
pub const READ_AHEAD_PIECES: u32 = 8;
