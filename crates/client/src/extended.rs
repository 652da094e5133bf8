use std::sync::Arc;

use offload_blob::PayloadStore;
use offload_core::{Message, OffloadConfig, OffloadError};
use tracing::{debug, instrument};

use crate::deliver::Deliverer;
use crate::error::PublishError;
use crate::transform::RequestTransformer;

/// A transport client with transparent large-payload offloading.
///
/// [`publish`](Self::publish) runs the offload pipeline and then delegates to
/// the wrapped deliverer exactly once. Every other transport operation is
/// reached through [`inner`](Self::inner) and behaves exactly as on the
/// underlying client.
///
/// The client keeps no per-call state, so it can be shared across tasks
/// (e.g. behind an `Arc`) and published to concurrently.
pub struct ExtendedClient<D> {
    deliverer: D,
    store: Arc<dyn PayloadStore>,
    config: OffloadConfig,
}

impl<D> std::fmt::Debug for ExtendedClient<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtendedClient")
            .field("config", &self.config)
            .field("store", &"<PayloadStore>")
            .finish_non_exhaustive()
    }
}

impl<D: Deliverer> ExtendedClient<D> {
    /// Wrap `deliverer`, offloading bodies to `store` as `config` dictates.
    pub fn new(
        deliverer: D,
        store: Arc<dyn PayloadStore>,
        config: OffloadConfig,
    ) -> Result<Self, OffloadError> {
        config.validate()?;
        Ok(Self {
            deliverer,
            store,
            config,
        })
    }

    /// Publish `message`, offloading its body first if needed.
    ///
    /// Returns the transport's response unchanged. `message` itself is never
    /// modified; an offloaded copy is what reaches the transport.
    pub async fn publish(&self, message: &Message) -> Result<D::Response, PublishError<D::Error>> {
        self.offload_and_deliver(message).await
    }

    #[instrument(skip_all, fields(topic_arn = ?message.topic_arn))]
    async fn offload_and_deliver(
        &self,
        message: &Message,
    ) -> Result<D::Response, PublishError<D::Error>> {
        let outgoing = RequestTransformer::new(&self.config, self.store.as_ref())
            .transform(message)
            .await?;
        debug!(offloaded = outgoing.is_offloaded(), "delivering message");

        self.deliverer
            .publish(outgoing.into_message())
            .await
            .map_err(PublishError::Delivery)
    }

    /// The wrapped transport client.
    pub fn inner(&self) -> &D {
        &self.deliverer
    }

    /// Unwrap into the transport client.
    pub fn into_inner(self) -> D {
        self.deliverer
    }

    pub fn config(&self) -> &OffloadConfig {
        &self.config
    }
}

impl<D: Deliverer> Deliverer for ExtendedClient<D> {
    type Response = D::Response;
    type Error = PublishError<D::Error>;

    async fn publish(&self, message: Message) -> Result<Self::Response, Self::Error> {
        self.offload_and_deliver(&message).await
    }
}
