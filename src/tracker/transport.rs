use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use bytes::Bytes;

use super::error::TrackerError;
use crate::constants::USER_AGENT;

/// Future returned by [`TrackerTransport::get`].
pub type TransportFuture<'a> =
    Pin<Box<dyn Future<Output = std::io::Result<(Bytes, u16)>> + Send + 'a>>;

/// HTTP transport used by the tracker client.
///
/// Implementations own their connection state and must be safe to share;
/// building one must not install process-wide state behind the caller's
/// back. Tests substitute a mock to run announces without a network.
pub trait TrackerTransport: Send + Sync {
    /// Issues a GET and resolves to the response body and status code.
    fn get(&self, url: &str, timeout: Duration) -> TransportFuture<'_>;
}

/// Default transport over a [`reqwest::Client`].
///
/// # Examples
///
/// ```no_run
/// use btfs::tracker::{HttpTransport, TrackerClient};
///
/// # fn main() -> Result<(), btfs::tracker::TrackerError> {
/// let transport = HttpTransport::new()?;
/// let client = TrackerClient::new(transport, "http://tracker.example.com/announce");
/// # Ok(())
/// # }
/// ```
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Builds the underlying HTTP client.
    pub fn new() -> Result<Self, TrackerError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| TrackerError::Transport(std::io::Error::other(e)))?;
        Ok(Self { client })
    }
}

impl TrackerTransport for HttpTransport {
    fn get(&self, url: &str, timeout: Duration) -> TransportFuture<'_> {
        let request = self.client.get(url).timeout(timeout).send();
        Box::pin(async move {
            let response = request.await.map_err(std::io::Error::other)?;
            let status = response.status().as_u16();
            let body = response.bytes().await.map_err(std::io::Error::other)?;
            Ok((body, status))
        })
    }
}
