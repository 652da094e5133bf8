use offload_blob::PayloadStore;
use offload_core::constants::RESERVED_ATTRIBUTE_NAME;
use offload_core::validate::{validate_count, validate_reserved_name_absent, validate_total_size};
use offload_core::{
    AttributeValue, Message, OffloadConfig, OffloadError, attribute_size, should_offload,
    string_size, total_attributes_size,
};
use tracing::{debug, error, info, instrument};

use crate::error::TransformError;

/// The message to hand to the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outgoing {
    /// A copy of the caller's message, content unchanged.
    PassThrough(Message),

    /// A copy whose body was replaced by `pointer` and which carries the
    /// reserved size attribute.
    Offloaded {
        /// The rewritten message.
        message: Message,
        /// Pointer returned by the payload store.
        pointer: String,
    },
}

impl Outgoing {
    pub fn message(&self) -> &Message {
        match self {
            Self::PassThrough(message) | Self::Offloaded { message, .. } => message,
        }
    }

    pub fn into_message(self) -> Message {
        match self {
            Self::PassThrough(message) | Self::Offloaded { message, .. } => message,
        }
    }

    pub fn is_offloaded(&self) -> bool {
        matches!(self, Self::Offloaded { .. })
    }
}

/// Turns a caller's message into its outgoing form.
///
/// Holds no state between calls; every [`transform`](Self::transform) works on
/// a fresh copy of the message it is given.
pub struct RequestTransformer<'a> {
    config: &'a OffloadConfig,
    store: &'a dyn PayloadStore,
}

impl<'a> RequestTransformer<'a> {
    pub fn new(config: &'a OffloadConfig, store: &'a dyn PayloadStore) -> Self {
        Self { config, store }
    }

    /// Decide whether `message` needs offloading and, if so, store its body
    /// and build the rewritten copy.
    ///
    /// Every constraint is checked before the store is written to, so any
    /// [`TransformError::Offload`] leaves no trace in the payload store.
    #[instrument(skip_all, fields(body_bytes = message.body.len(), attributes = message.attributes.len()))]
    pub async fn transform(&self, message: &Message) -> Result<Outgoing, TransformError> {
        if message.body.is_empty() {
            debug!("empty body, passing through");
            return Ok(Outgoing::PassThrough(message.clone()));
        }

        // Multi-protocol envelopes are refused at any size.
        if message.is_multi_protocol() {
            let err = OffloadError::UnsupportedStructure;
            error!(structure = ?message.structure, "{err}");
            return Err(err.into());
        }

        let body_size = string_size(&message.body);
        let attributes_size = total_attributes_size(&message.attributes);
        let total_size = body_size + attributes_size;

        if !should_offload(self.config, total_size) {
            debug!(total_size, "below offload threshold, passing through");
            return Ok(Outgoing::PassThrough(message.clone()));
        }

        let threshold = self.config.payload_size_threshold();
        validate_count(&message.attributes)?;
        validate_reserved_name_absent(&message.attributes)?;
        validate_total_size(threshold, attributes_size)?;

        let size_attribute = AttributeValue::number(body_size.to_string());
        validate_total_size(
            threshold,
            attributes_size + attribute_size(RESERVED_ATTRIBUTE_NAME, &size_attribute),
        )?;

        debug!(total_size, threshold, "offloading message body");
        let stored = match message.storage_key_hint() {
            Some(key) => self.store.store_with_key(&message.body, key).await,
            None => self.store.store(&message.body).await,
        };
        let pointer = stored.map_err(|e| {
            error!(error = %e, "payload store write failed");
            TransformError::Store(e)
        })?;
        info!(body_bytes = body_size, "message body offloaded to payload store");

        let offloaded = message
            .clone()
            .with_body(pointer.clone())
            .with_attribute(RESERVED_ATTRIBUTE_NAME, size_attribute);

        Ok(Outgoing::Offloaded {
            message: offloaded,
            pointer,
        })
    }
}
