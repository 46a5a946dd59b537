use std::fmt;

use super::error::MetainfoError;

/// A BitTorrent v1 info hash: the 20-byte SHA-1 of the info dictionary's
/// source bytes.
///
/// The digest is taken over the exact bytes of the `info` dictionary as it
/// appears in the `.torrent` file (delimiters included), never over a
/// re-encoding: torrents whose key order deviates from canonical would
/// otherwise change identity.
///
/// # Examples
///
/// ```
/// use btfs::metainfo::InfoHash;
///
/// let hash = InfoHash::from_info_bytes(b"d4:name4:teste");
/// assert_eq!(hash.to_hex().len(), 40);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct InfoHash(pub [u8; 20]);

impl InfoHash {
    /// Creates an info hash from raw digest bytes.
    pub fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Creates an info hash by hashing info dictionary bytes.
    pub fn from_info_bytes(info_bytes: &[u8]) -> Self {
        use sha1::{Digest, Sha1};
        let mut hasher = Sha1::new();
        hasher.update(info_bytes);
        let hash: [u8; 20] = hasher.finalize().into();
        Self(hash)
    }

    /// Parses an info hash from a 40-character hex string.
    pub fn from_hex(s: &str) -> Result<Self, MetainfoError> {
        if s.len() != 40 {
            return Err(MetainfoError::InvalidInfoHashLength);
        }
        let bytes = hex_decode(s).ok_or(MetainfoError::InvalidInfoHashLength)?;
        let mut arr = [0u8; 20];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }

    /// Returns the raw bytes of the info hash.
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Converts to a lowercase hexadecimal string.
    pub fn to_hex(&self) -> String {
        self.0
            .iter()
            .fold(String::with_capacity(40), |mut s, b| {
                use std::fmt::Write;
                let _ = write!(s, "{:02x}", b);
                s
            })
    }

    /// Percent-encodes the hash for use as a tracker announce query value.
    ///
    /// Unreserved bytes (`A-Z a-z 0-9 - _ . ~`) pass through; every other
    /// byte becomes `%HH`.
    pub fn url_encode(&self) -> String {
        self.0
            .iter()
            .fold(String::with_capacity(60), |mut s, &b| {
                if b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.' | b'~') {
                    s.push(b as char);
                } else {
                    use std::fmt::Write;
                    let _ = write!(s, "%{:02X}", b);
                }
                s
            })
    }
}

impl fmt::Debug for InfoHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "InfoHash({})", self.to_hex())
    }
}

impl fmt::Display for InfoHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

fn hex_decode(s: &str) -> Option<Vec<u8>> {
    if s.len() % 2 != 0 {
        return None;
    }
    (0..s.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&s[i..i + 2], 16).ok())
        .collect()
}
