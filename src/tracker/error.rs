use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrackerError {
    /// The transport failed to complete the HTTP exchange.
    #[error("transport error: {0}")]
    Transport(#[from] std::io::Error),

    /// The response violated the announce schema, or the request could not
    /// be assembled within bounds.
    #[error("bad tracker response: {0}")]
    BadResponse(&'static str),

    /// The tracker answered with a `failure reason`.
    #[error("tracker failure: {0}")]
    Failure(String),
}
