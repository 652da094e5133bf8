use offload_core::Message;

/// The transport's publish capability.
///
/// Implemented by transport adapters (e.g. the SNS deliverer in `offload-aws`)
/// and by [`ExtendedClient`](crate::ExtendedClient) itself, so an extended
/// client can stand in wherever a plain transport is expected.
///
/// This trait uses native `async fn` and is therefore not object-safe; use it
/// as a generic bound.
pub trait Deliverer: Send + Sync {
    /// Whatever the transport returns for a successful publish.
    type Response: Send;

    /// The transport's own error type, surfaced to callers unchanged.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Deliver a finished message.
    fn publish(
        &self,
        message: Message,
    ) -> impl std::future::Future<Output = Result<Self::Response, Self::Error>> + Send;
}
