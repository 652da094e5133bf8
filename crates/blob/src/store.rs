use async_trait::async_trait;

use crate::error::PayloadStoreError;

/// Pluggable storage backend for offloaded message bodies.
///
/// Implementors write the payload somewhere durable (e.g. S3) and return an
/// opaque pointer string. The pointer replaces the message body on the wire
/// and is all the consumer gets to find the original payload again.
#[async_trait]
pub trait PayloadStore: Send + Sync {
    /// Store `payload` under a key chosen by the store.
    async fn store(&self, payload: &str) -> Result<String, PayloadStoreError>;

    /// Store `payload` under the given `key`.
    ///
    /// Used when the producer pre-selects the key, e.g. to line up with an
    /// idempotency scheme.
    async fn store_with_key(&self, payload: &str, key: &str) -> Result<String, PayloadStoreError>;
}

/// A fresh storage key (UUID v4) for stores that pick their own keys.
pub fn generate_key() -> String {
    uuid::Uuid::new_v4().to_string()
}
