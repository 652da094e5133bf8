//! Well-known names and limits shared with the consumer-side decoder and the
//! queue-offloading client.

/// Default offload threshold in bytes (the SNS message size limit, 256 KiB).
pub const DEFAULT_PAYLOAD_SIZE_THRESHOLD: usize = 262_144;

/// Maximum number of caller attributes on an offloaded message.
///
/// The transport allows ten; one slot is kept for [`RESERVED_ATTRIBUTE_NAME`].
pub const MAX_ALLOWED_ATTRIBUTES: usize = 10 - 1;

/// Attribute carrying the original body size of an offloaded message.
///
/// This name is part of the wire contract with the consumer and must not change.
pub const RESERVED_ATTRIBUTE_NAME: &str = "ExtendedPayloadSize";

/// Attribute whose string value, when present, is used as the storage key.
pub const STORAGE_KEY_ATTRIBUTE: &str = "S3Key";

/// Message structure tag for multi-protocol JSON envelopes.
pub const MULTIPLE_PROTOCOL_MESSAGE_STRUCTURE: &str = "json";

/// Data type of the reserved size attribute.
pub const NUMBER_DATA_TYPE: &str = "Number";
