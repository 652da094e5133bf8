use thiserror::Error;

/// Errors raised while preparing a message for offload.
///
/// All of these are detected before anything is written to the payload store,
/// so a caller can correct the message and publish again.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OffloadError {
    /// The message has a non-empty body and uses the multi-protocol JSON
    /// structure.
    #[error("this client does not support sending multi-protocol messages")]
    UnsupportedStructure,

    /// The message carries more attributes than an offloaded message may have.
    #[error(
        "number of message attributes [{count}] exceeds the maximum allowed for large-payload messages [{max}]"
    )]
    TooManyAttributes {
        /// Number of attributes on the message.
        count: usize,
        /// Maximum allowed.
        max: usize,
    },

    /// The caller already used the reserved size attribute name.
    #[error("message attribute name {0} is reserved for use by the extended client")]
    ReservedAttributeName(String),

    /// The attributes alone are larger than the offload threshold.
    #[error(
        "total size of message attributes is {size} bytes which is larger than the threshold of {threshold} bytes; consider including the payload in the message body instead of message attributes"
    )]
    AttributeSizeExceeded {
        /// Computed attribute size in bytes.
        size: usize,
        /// Configured threshold in bytes.
        threshold: usize,
    },

    /// The client configuration is invalid.
    #[error("invalid configuration: {0}")]
    Configuration(String),
}
