//! Publish client that moves oversized message bodies to a payload store.
//!
//! [`ExtendedClient`] wraps any [`Deliverer`] (the transport's publish
//! capability). Small messages are delivered unchanged. When a message is too
//! large, or the client is configured to always offload, the body is written
//! to a [`PayloadStore`](offload_blob::PayloadStore), replaced by the returned
//! pointer, and tagged with the `ExtendedPayloadSize` attribute carrying the
//! original body size. The caller's message is never modified.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use offload_blob::MemoryPayloadStore;
//! use offload_client::{Deliverer, ExtendedClient};
//! use offload_core::{Message, OffloadConfig};
//!
//! # async fn example<D: Deliverer>(transport: D) -> Result<(), Box<dyn std::error::Error>> {
//! let config = OffloadConfig::new().with_payload_support_enabled("large-payloads");
//! let store = Arc::new(MemoryPayloadStore::new("large-payloads"));
//! let client = ExtendedClient::new(transport, store, config)?;
//!
//! let message = Message::new("x".repeat(300_000)).with_topic_arn("arn:aws:sns:us-east-1:123:topic");
//! client.publish(&message).await?;
//! # Ok(())
//! # }
//! ```

pub mod deliver;
pub mod error;
pub mod extended;
pub mod transform;

pub use deliver::Deliverer;
pub use error::{PublishError, TransformError};
pub use extended::ExtendedClient;
pub use transform::{Outgoing, RequestTransformer};
