use std::net::{IpAddr, Ipv4Addr, SocketAddr};

/// Announce event reported to the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrackerEvent {
    #[default]
    None,
    Started,
    Stopped,
    Completed,
}

impl TrackerEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrackerEvent::None => "",
            TrackerEvent::Started => "started",
            TrackerEvent::Stopped => "stopped",
            TrackerEvent::Completed => "completed",
        }
    }
}

/// A successful announce: re-announce intervals, optional warning, and the
/// peer list. The peer list is a snapshot; each announce replaces it.
#[derive(Debug, Clone)]
pub struct AnnounceResponse {
    /// Seconds the tracker asks us to wait before the next announce.
    pub interval: u32,
    /// Optional lower bound on the re-announce interval.
    pub min_interval: Option<u32>,
    /// Non-fatal warning from the tracker.
    pub warning: Option<String>,
    /// Number of seeders, when reported.
    pub complete: Option<u32>,
    /// Number of leechers, when reported.
    pub incomplete: Option<u32>,
    /// Announced peers.
    pub peers: Vec<SocketAddr>,
}

impl AnnounceResponse {
    pub fn new(interval: u32) -> Self {
        Self {
            interval,
            min_interval: None,
            warning: None,
            complete: None,
            incomplete: None,
            peers: Vec::new(),
        }
    }
}

/// Parses a compact peer blob: 6 bytes per peer, 4-byte IPv4 address and
/// 2-byte port, both in network order. The caller checks the length is a
/// multiple of 6.
pub fn parse_compact_peers(data: &[u8]) -> Vec<SocketAddr> {
    data.chunks_exact(6)
        .map(|chunk| {
            let ip = Ipv4Addr::new(chunk[0], chunk[1], chunk[2], chunk[3]);
            let port = u16::from_be_bytes([chunk[4], chunk[5]]);
            SocketAddr::new(IpAddr::V4(ip), port)
        })
        .collect()
}
