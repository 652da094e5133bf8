use offload_blob::PayloadStoreError;
use thiserror::Error;

/// Errors from the SNS and S3 adapters.
#[derive(Debug, Error)]
pub enum AwsError {
    /// The AWS SDK returned an error from the service.
    #[error("AWS service error: {0}")]
    ServiceError(String),

    /// The request was throttled by the AWS service.
    #[error("AWS request throttled")]
    Throttled,

    /// A network or connection error occurred communicating with AWS.
    #[error("AWS connection error: {0}")]
    Connection(String),

    /// The request timed out.
    #[error("AWS request timed out")]
    Timeout,

    /// The message could not be turned into an SDK request.
    #[error("invalid message: {0}")]
    InvalidMessage(String),

    /// Configuration is invalid.
    #[error("invalid configuration: {0}")]
    Configuration(String),
}

impl AwsError {
    /// Returns `true` if the error is transient and the request may succeed on
    /// retry.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Throttled | Self::Connection(_) | Self::Timeout)
    }
}

impl From<AwsError> for PayloadStoreError {
    fn from(err: AwsError) -> Self {
        match err {
            AwsError::ServiceError(msg) => PayloadStoreError::Storage(msg),
            AwsError::Throttled => PayloadStoreError::Throttled,
            AwsError::Connection(msg) => PayloadStoreError::Connection(msg),
            AwsError::Timeout => PayloadStoreError::Timeout,
            AwsError::InvalidMessage(msg) => PayloadStoreError::InvalidKey(msg),
            AwsError::Configuration(msg) => PayloadStoreError::Storage(msg),
        }
    }
}

/// Classify an AWS SDK error string into the appropriate [`AwsError`].
///
/// This helper inspects the error message for common patterns (throttling,
/// timeout, connection) and maps them to the correct variant.
pub fn classify_sdk_error(error_str: &str) -> AwsError {
    let lower = error_str.to_lowercase();
    if lower.contains("throttl") || lower.contains("rate exceed") || lower.contains("too many") {
        AwsError::Throttled
    } else if lower.contains("timeout") || lower.contains("timed out") {
        AwsError::Timeout
    } else if lower.contains("connection")
        || lower.contains("connect")
        || lower.contains("dns")
        || lower.contains("network")
    {
        AwsError::Connection(error_str.to_owned())
    } else {
        AwsError::ServiceError(error_str.to_owned())
    }
}
