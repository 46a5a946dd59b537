//! HTTP tracker announces (BEP-3)
//!
//! Builds the announce request URL with percent-escaped binary parameters,
//! issues it through a pluggable [`TrackerTransport`], and decodes the
//! bencoded response into an [`AnnounceResponse`]. The transport is an
//! explicit lifecycle object owned by the caller; the default
//! [`HttpTransport`] wraps a `reqwest` client.

mod error;
mod http;
mod peer_id;
mod response;
mod transport;

pub use error::TrackerError;
pub use http::{AnnounceRequest, TrackerClient};
pub use peer_id::PeerId;
pub use response::{parse_compact_peers, AnnounceResponse, TrackerEvent};
pub use transport::{HttpTransport, TrackerTransport, TransportFuture};
