use std::fmt;
use std::sync::OnceLock;

use rand::Rng as _;

use crate::constants::CLIENT_PREFIX;

static PROCESS_PEER_ID: OnceLock<PeerId> = OnceLock::new();

/// A 20-byte peer identifier sent with every announce.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PeerId(pub [u8; 20]);

impl PeerId {
    /// Generates a fresh peer ID: client prefix plus random tail.
    pub fn generate() -> Self {
        let mut id = [0u8; 20];
        id[..CLIENT_PREFIX.len()].copy_from_slice(CLIENT_PREFIX);
        rand::rng().fill(&mut id[CLIENT_PREFIX.len()..]);
        Self(id)
    }

    /// Returns the peer ID used for the lifetime of this process.
    ///
    /// Generated on first use, stable afterwards, shared by every tracker
    /// client in the process.
    pub fn global() -> Self {
        *PROCESS_PEER_ID.get_or_init(Self::generate)
    }

    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() != 20 {
            return None;
        }
        let mut id = [0u8; 20];
        id.copy_from_slice(bytes);
        Some(Self(id))
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }
}

impl fmt::Debug for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0[0] == b'-' && self.0[7] == b'-' {
            if let Ok(client) = std::str::from_utf8(&self.0[1..7]) {
                return write!(f, "PeerId({})", client);
            }
        }
        write!(f, "PeerId({:02x?})", &self.0[..8])
    }
}
