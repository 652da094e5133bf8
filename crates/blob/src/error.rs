use thiserror::Error;

/// Errors that can occur while storing an offloaded payload.
#[derive(Debug, Error)]
pub enum PayloadStoreError {
    /// The requested storage key is not usable.
    #[error("invalid storage key: {0}")]
    InvalidKey(String),

    /// The storage backend rejected or failed the write.
    #[error("payload storage error: {0}")]
    Storage(String),

    /// A network or connection error occurred reaching the backend.
    #[error("payload store connection error: {0}")]
    Connection(String),

    /// The backend throttled the write.
    #[error("payload store request throttled")]
    Throttled,

    /// The write timed out.
    #[error("payload store request timed out")]
    Timeout,

    /// The pointer could not be encoded or decoded.
    #[error("payload pointer serialization error: {0}")]
    Serialization(String),
}

impl PayloadStoreError {
    /// Returns `true` if the error is transient and the write may succeed on
    /// retry. This layer never retries; the flag is for callers.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Connection(_) | Self::Throttled | Self::Timeout
        )
    }
}
