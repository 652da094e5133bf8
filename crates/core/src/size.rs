//! Byte accounting for message bodies and attributes.
//!
//! Sizes are UTF-8 byte lengths, which is how the transport measures them.

use std::collections::HashMap;

use crate::message::{AttributeValue, Message};

/// UTF-8 encoded length of `s` in bytes.
pub fn string_size(s: &str) -> usize {
    s.len()
}

/// Size of one attribute: name, type tag, string value and binary value.
pub fn attribute_size(name: &str, value: &AttributeValue) -> usize {
    let mut size = string_size(name);
    if let Some(data_type) = value.data_type.as_deref() {
        size += string_size(data_type);
    }
    if let Some(string_value) = value.string_value.as_deref() {
        size += string_size(string_value);
    }
    if let Some(binary_value) = &value.binary_value {
        size += binary_value.len();
    }
    size
}

/// Sum of [`attribute_size`] over every attribute.
pub fn total_attributes_size(attributes: &HashMap<String, AttributeValue>) -> usize {
    attributes
        .iter()
        .map(|(name, value)| attribute_size(name, value))
        .sum()
}

/// Body size plus attribute size.
pub fn message_size(message: &Message) -> usize {
    string_size(&message.body) + total_attributes_size(&message.attributes)
}
