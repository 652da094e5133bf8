use std::collections::HashMap;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::constants::{MULTIPLE_PROTOCOL_MESSAGE_STRUCTURE, NUMBER_DATA_TYPE, STORAGE_KEY_ATTRIBUTE};

/// A typed message attribute.
///
/// The transport expects exactly one of `string_value` / `binary_value` to be
/// set; sizing counts both if both are present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeValue {
    /// Type tag such as `"String"`, `"Number"` or `"Binary"`.
    pub data_type: Option<String>,

    /// String form of the value (used by `String` and `Number` types).
    pub string_value: Option<String>,

    /// Raw bytes (used by the `Binary` type).
    pub binary_value: Option<Bytes>,
}

impl AttributeValue {
    /// A `String` attribute.
    pub fn string(value: impl Into<String>) -> Self {
        Self {
            data_type: Some("String".to_owned()),
            string_value: Some(value.into()),
            binary_value: None,
        }
    }

    /// A `Number` attribute. The transport carries numbers as strings.
    pub fn number(value: impl Into<String>) -> Self {
        Self {
            data_type: Some(NUMBER_DATA_TYPE.to_owned()),
            string_value: Some(value.into()),
            binary_value: None,
        }
    }

    /// A `Binary` attribute.
    pub fn binary(value: impl Into<Bytes>) -> Self {
        Self {
            data_type: Some("Binary".to_owned()),
            string_value: None,
            binary_value: Some(value.into()),
        }
    }

    /// Override the type tag (e.g. `"Number.float"`).
    #[must_use]
    pub fn with_data_type(mut self, data_type: impl Into<String>) -> Self {
        self.data_type = Some(data_type.into());
        self
    }
}

/// A publish request.
///
/// Only `body` and `attributes` are ever rewritten by the offload pipeline, and
/// always on a copy. The routing fields are forwarded to the transport as-is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Message body.
    pub body: String,

    /// Message structure tag. `"json"` marks a multi-protocol envelope.
    #[serde(default)]
    pub structure: Option<String>,

    /// Message attributes keyed by name.
    #[serde(default)]
    pub attributes: HashMap<String, AttributeValue>,

    /// Topic to publish to.
    #[serde(default)]
    pub topic_arn: Option<String>,

    /// Endpoint to publish to directly (mobile push).
    #[serde(default)]
    pub target_arn: Option<String>,

    /// Phone number for SMS delivery.
    #[serde(default)]
    pub phone_number: Option<String>,

    /// Subject line for email endpoints.
    #[serde(default)]
    pub subject: Option<String>,

    /// Message group ID (FIFO topics).
    #[serde(default)]
    pub message_group_id: Option<String>,

    /// Message deduplication ID (FIFO topics).
    #[serde(default)]
    pub message_deduplication_id: Option<String>,
}

impl Message {
    /// Create a message with the given body and nothing else set.
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            ..Self::default()
        }
    }

    /// Replace the body.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// Set the topic ARN.
    #[must_use]
    pub fn with_topic_arn(mut self, topic_arn: impl Into<String>) -> Self {
        self.topic_arn = Some(topic_arn.into());
        self
    }

    /// Set the target (endpoint) ARN.
    #[must_use]
    pub fn with_target_arn(mut self, target_arn: impl Into<String>) -> Self {
        self.target_arn = Some(target_arn.into());
        self
    }

    /// Set the phone number.
    #[must_use]
    pub fn with_phone_number(mut self, phone_number: impl Into<String>) -> Self {
        self.phone_number = Some(phone_number.into());
        self
    }

    /// Set the subject.
    #[must_use]
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Set the message structure tag.
    #[must_use]
    pub fn with_structure(mut self, structure: impl Into<String>) -> Self {
        self.structure = Some(structure.into());
        self
    }

    /// Set the FIFO message group ID.
    #[must_use]
    pub fn with_message_group_id(mut self, group_id: impl Into<String>) -> Self {
        self.message_group_id = Some(group_id.into());
        self
    }

    /// Set the FIFO deduplication ID.
    #[must_use]
    pub fn with_message_deduplication_id(mut self, dedup_id: impl Into<String>) -> Self {
        self.message_deduplication_id = Some(dedup_id.into());
        self
    }

    /// Add or replace an attribute.
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: AttributeValue) -> Self {
        self.attributes.insert(name.into(), value);
        self
    }

    /// Whether the message is a multi-protocol JSON envelope.
    pub fn is_multi_protocol(&self) -> bool {
        self.structure.as_deref() == Some(MULTIPLE_PROTOCOL_MESSAGE_STRUCTURE)
    }

    /// The storage key requested by the producer, if any.
    pub fn storage_key_hint(&self) -> Option<&str> {
        self.attributes
            .get(STORAGE_KEY_ATTRIBUTE)
            .and_then(|value| value.string_value.as_deref())
    }
}
