use offload_blob::PayloadStoreError;
use offload_core::OffloadError;
use thiserror::Error;

/// Failure while turning a message into its outgoing form.
#[derive(Debug, Error)]
pub enum TransformError {
    /// The message violates an offload constraint. Nothing was stored.
    #[error(transparent)]
    Offload(#[from] OffloadError),

    /// Writing the body to the payload store failed.
    #[error("failed to store the message content in the payload store: {0}")]
    Store(#[source] PayloadStoreError),
}

/// Failure of an extended publish.
///
/// `Transform` errors mean the message never reached the transport;
/// `Delivery` carries the transport's own error untouched.
#[derive(Debug, Error)]
pub enum PublishError<E> {
    #[error(transparent)]
    Transform(#[from] TransformError),

    #[error(transparent)]
    Delivery(E),
}

impl<E> PublishError<E> {
    /// The validation error, if the publish was rejected before any store write.
    pub fn as_offload_error(&self) -> Option<&OffloadError> {
        match self {
            Self::Transform(TransformError::Offload(err)) => Some(err),
            _ => None,
        }
    }

    /// Returns `true` if the body could not be written to the payload store.
    pub fn is_store_failure(&self) -> bool {
        matches!(self, Self::Transform(TransformError::Store(_)))
    }

    /// Returns `true` if the transport rejected the publish.
    pub fn is_delivery_failure(&self) -> bool {
        matches!(self, Self::Delivery(_))
    }
}

impl<E> From<OffloadError> for PublishError<E> {
    fn from(err: OffloadError) -> Self {
        Self::Transform(TransformError::Offload(err))
    }
}
