use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StreamError {
    /// A seek would land outside `[0, length]`.
    #[error("seek out of range")]
    OutOfRange,

    /// Streams never accept writes.
    #[error("stream is read-only")]
    ReadOnly,
}
