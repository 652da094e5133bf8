//! Core types for publishing messages whose bodies may be too large for the
//! messaging transport.
//!
//! This crate holds the pieces of the offload pipeline that need no I/O:
//!
//! - [`Message`] / [`AttributeValue`] — the publish request model
//! - [`size`] — byte accounting for bodies and attributes
//! - [`validate`] — attribute constraints checked before a body is offloaded
//! - [`policy`] — the decision whether a body goes to the payload store
//! - [`OffloadConfig`] — read-only client configuration
//!
//! The store and the transport are consumed through traits defined in
//! `offload-blob` and `offload-client`.

pub mod config;
pub mod constants;
pub mod error;
pub mod message;
pub mod policy;
pub mod size;
pub mod validate;

pub use config::OffloadConfig;
pub use constants::{
    DEFAULT_PAYLOAD_SIZE_THRESHOLD, MAX_ALLOWED_ATTRIBUTES, MULTIPLE_PROTOCOL_MESSAGE_STRUCTURE,
    NUMBER_DATA_TYPE, RESERVED_ATTRIBUTE_NAME, STORAGE_KEY_ATTRIBUTE,
};
pub use error::OffloadError;
pub use message::{AttributeValue, Message};
pub use policy::should_offload;
pub use size::{attribute_size, message_size, string_size, total_attributes_size};
