use serde::{Deserialize, Serialize};

use crate::error::PayloadStoreError;

/// Type tag the consumer-side decoder expects as the first pointer element.
pub const POINTER_CLASS_NAME: &str = "software.amazon.payloadoffloading.PayloadS3Pointer";

/// Location of an offloaded payload.
///
/// Serialises to the two-element JSON array shared with the consumer-side
/// decoder:
///
/// ```json
/// ["software.amazon.payloadoffloading.PayloadS3Pointer",{"s3BucketName":"bucket","s3Key":"key"}]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayloadPointer {
    /// Bucket holding the payload.
    #[serde(rename = "s3BucketName")]
    pub bucket_name: String,

    /// Object key of the payload.
    #[serde(rename = "s3Key")]
    pub key: String,
}

impl PayloadPointer {
    pub fn new(bucket_name: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket_name: bucket_name.into(),
            key: key.into(),
        }
    }

    /// Encode to the wire form used as the message body.
    pub fn to_json(&self) -> Result<String, PayloadStoreError> {
        serde_json::to_string(&(POINTER_CLASS_NAME, self))
            .map_err(|e| PayloadStoreError::Serialization(e.to_string()))
    }

    /// Decode a pointer previously produced by [`to_json`](Self::to_json).
    pub fn from_json(s: &str) -> Result<Self, PayloadStoreError> {
        let (class, pointer): (String, Self) = serde_json::from_str(s)
            .map_err(|e| PayloadStoreError::Serialization(e.to_string()))?;
        if class != POINTER_CLASS_NAME {
            return Err(PayloadStoreError::Serialization(format!(
                "unexpected pointer type '{class}'"
            )));
        }
        Ok(pointer)
    }
}
