use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use tracing::{debug, warn};

use super::error::TrackerError;
use super::peer_id::PeerId;
use super::response::{parse_compact_peers, AnnounceResponse, TrackerEvent};
use super::transport::TrackerTransport;
use crate::bencode::{decode, Value};
use crate::constants::{HTTP_TRACKER_TIMEOUT, MAX_ANNOUNCE_URL_LENGTH};
use crate::metainfo::InfoHash;

/// Parameters of one announce.
#[derive(Debug, Clone)]
pub struct AnnounceRequest {
    pub info_hash: InfoHash,
    pub peer_id: PeerId,
    pub port: u16,
    pub uploaded: u64,
    pub downloaded: u64,
    pub left: u64,
    pub event: TrackerEvent,
}

/// An announce client bound to one tracker URL.
///
/// # Examples
///
/// ```no_run
/// use btfs::metainfo::InfoHash;
/// use btfs::tracker::{
///     AnnounceRequest, HttpTransport, PeerId, TrackerClient, TrackerEvent,
/// };
///
/// # async fn example() -> Result<(), btfs::tracker::TrackerError> {
/// let client = TrackerClient::new(
///     HttpTransport::new()?,
///     "http://tracker.example.com/announce",
/// );
///
/// let response = client
///     .announce(&AnnounceRequest {
///         info_hash: InfoHash::from_bytes([0; 20]),
///         peer_id: PeerId::global(),
///         port: 6881,
///         uploaded: 0,
///         downloaded: 0,
///         left: 1000,
///         event: TrackerEvent::Started,
///     })
///     .await?;
///
/// println!("{} peers, next announce in {}s", response.peers.len(), response.interval);
/// # Ok(())
/// # }
/// ```
pub struct TrackerClient<T: TrackerTransport> {
    transport: T,
    announce: String,
    timeout: Duration,
}

impl<T: TrackerTransport> TrackerClient<T> {
    pub fn new(transport: T, announce: &str) -> Self {
        Self {
            transport,
            announce: announce.to_string(),
            timeout: HTTP_TRACKER_TIMEOUT,
        }
    }

    /// Overrides the transport timeout for each announce.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the tracker URL this client announces to.
    pub fn url(&self) -> &str {
        &self.announce
    }

    /// Returns a reference to the underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Performs one announce and decodes the tracker's reply.
    ///
    /// # Errors
    ///
    /// [`TrackerError::Transport`] when the HTTP exchange fails,
    /// [`TrackerError::Failure`] when the tracker reports a failure reason,
    /// and [`TrackerError::BadResponse`] when the reply violates the
    /// announce schema or the assembled URL exceeds its bound.
    pub async fn announce(
        &self,
        request: &AnnounceRequest,
    ) -> Result<AnnounceResponse, TrackerError> {
        let url = build_announce_url(&self.announce, request)?;
        debug!(url = %url, "tracker announce");

        let (body, status) = self.transport.get(&url, self.timeout).await?;
        debug!(status, len = body.len(), "tracker response");

        let response = parse_announce_response(&body)?;
        if let Some(warning) = &response.warning {
            warn!(warning = %warning, "tracker warning");
        }
        Ok(response)
    }
}

/// Appends the query parameters to the announce URL, continuing an existing
/// query string with `&`. The result is bounded; an oversize URL fails
/// before any request is issued.
fn build_announce_url(
    announce: &str,
    request: &AnnounceRequest,
) -> Result<String, TrackerError> {
    use std::fmt::Write;

    let mut url = String::with_capacity(announce.len() + 192);
    url.push_str(announce);
    url.push(if announce.contains('?') { '&' } else { '?' });
    url.push_str("info_hash=");
    url.push_str(&request.info_hash.url_encode());
    url.push_str("&peer_id=");
    url.push_str(&escape_bytes(request.peer_id.as_bytes()));
    let _ = write!(
        url,
        "&port={}&uploaded={}&downloaded={}&left={}&event={}",
        request.port, request.uploaded, request.downloaded, request.left,
        request.event.as_str(),
    );

    if url.len() > MAX_ANNOUNCE_URL_LENGTH {
        return Err(TrackerError::BadResponse("announce url too long"));
    }
    Ok(url)
}

/// Percent-escapes arbitrary bytes for a query value: unreserved bytes pass
/// through, everything else becomes `%HH`.
fn escape_bytes(bytes: &[u8]) -> String {
    use std::fmt::Write;

    bytes
        .iter()
        .fold(String::with_capacity(bytes.len() * 3), |mut s, &b| {
            if b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.' | b'~') {
                s.push(b as char);
            } else {
                let _ = write!(s, "%{:02X}", b);
            }
            s
        })
}

fn parse_announce_response(body: &[u8]) -> Result<AnnounceResponse, TrackerError> {
    let root = decode(body).map_err(|_| TrackerError::BadResponse("not bencode"))?;
    let pairs = root
        .as_dict()
        .ok_or(TrackerError::BadResponse("expected dictionary"))?;

    let mut failure = None;
    let mut warning = None;
    let mut interval = None;
    let mut min_interval = None;
    let mut complete = None;
    let mut incomplete = None;
    let mut peers = None;

    for (key, value) in pairs {
        match key.as_ref() {
            b"failure reason" => set_once(&mut failure, value)?,
            b"warning message" => set_once(&mut warning, value)?,
            b"interval" => set_once(&mut interval, value)?,
            b"min interval" => set_once(&mut min_interval, value)?,
            b"complete" => set_once(&mut complete, value)?,
            b"incomplete" => set_once(&mut incomplete, value)?,
            b"peers" => set_once(&mut peers, value)?,
            _ => {}
        }
    }

    if let Some(value) = failure {
        let reason = value
            .as_str()
            .ok_or(TrackerError::BadResponse("failure reason"))?;
        return Err(TrackerError::Failure(reason.to_string()));
    }

    let interval = interval
        .and_then(|v| v.as_integer())
        .filter(|i| (1..=i64::from(u32::MAX)).contains(i))
        .ok_or(TrackerError::BadResponse("interval"))? as u32;

    let mut response = AnnounceResponse::new(interval);
    response.min_interval = match min_interval {
        Some(value) => Some(
            value
                .as_integer()
                .filter(|i| (1..=i64::from(u32::MAX)).contains(i))
                .ok_or(TrackerError::BadResponse("min interval"))? as u32,
        ),
        None => None,
    };
    response.complete = parse_u32(complete, "complete")?;
    response.incomplete = parse_u32(incomplete, "incomplete")?;

    if let Some(value) = warning {
        let text = value
            .as_str()
            .ok_or(TrackerError::BadResponse("warning message"))?;
        response.warning = Some(text.to_string());
    }

    let peers = peers.ok_or(TrackerError::BadResponse("missing peers"))?;
    response.peers = match peers {
        Value::Bytes(blob) => {
            if blob.len() % 6 != 0 {
                return Err(TrackerError::BadResponse("compact peers length"));
            }
            parse_compact_peers(blob)
        }
        Value::List(list) => {
            let mut out = Vec::with_capacity(list.len());
            for entry in list {
                let ip: IpAddr = entry
                    .get(b"ip")
                    .and_then(|v| v.as_str())
                    .and_then(|s| s.parse().ok())
                    .ok_or(TrackerError::BadResponse("peer ip"))?;
                let port = entry
                    .get(b"port")
                    .and_then(|v| v.as_integer())
                    .filter(|p| (0..=i64::from(u16::MAX)).contains(p))
                    .ok_or(TrackerError::BadResponse("peer port"))?;
                out.push(SocketAddr::new(ip, port as u16));
            }
            out
        }
        _ => return Err(TrackerError::BadResponse("peers")),
    };

    Ok(response)
}

fn parse_u32(slot: Option<&Value>, name: &'static str) -> Result<Option<u32>, TrackerError> {
    match slot {
        Some(value) => {
            let n = value
                .as_integer()
                .filter(|i| (0..=i64::from(u32::MAX)).contains(i))
                .ok_or(TrackerError::BadResponse(name))?;
            Ok(Some(n as u32))
        }
        None => Ok(None),
    }
}

fn set_once<'a>(slot: &mut Option<&'a Value>, value: &'a Value) -> Result<(), TrackerError> {
    if slot.replace(value).is_some() {
        return Err(TrackerError::BadResponse("duplicate key"));
    }
    Ok(())
}
