//! Bencode decoding (BEP-3)
//!
//! Bencode is the encoding used by BitTorrent for storing and transmitting
//! loosely structured data. The decoder here is total on untrusted input:
//! allocation is bounded by the input length and nesting is depth-limited.
//!
//! [`decode_torrent`] additionally records the byte range of the top-level
//! `info` dictionary, so the SHA-1 identity of a torrent can be computed
//! over the exact source bytes without re-encoding.

mod decode;
mod encode;
mod error;
mod value;

pub use decode::{decode, decode_torrent, DecodedTorrent};
pub use encode::encode;
pub use error::DecodeError;
pub use value::Value;
