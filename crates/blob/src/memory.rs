use async_trait::async_trait;
use dashmap::DashMap;
use tracing::debug;

use crate::error::PayloadStoreError;
use crate::pointer::PayloadPointer;
use crate::store::{PayloadStore, generate_key};

/// In-process payload store keyed by storage key.
///
/// Useful for tests and local development where no real blob store is
/// available. Pointers it returns use the same wire format as the S3 store.
#[derive(Debug)]
pub struct MemoryPayloadStore {
    bucket_name: String,
    objects: DashMap<String, String>,
}

impl MemoryPayloadStore {
    /// Create an empty store that reports `bucket_name` in its pointers.
    pub fn new(bucket_name: impl Into<String>) -> Self {
        Self {
            bucket_name: bucket_name.into(),
            objects: DashMap::new(),
        }
    }

    pub fn bucket_name(&self) -> &str {
        &self.bucket_name
    }

    /// Payload stored under `key`, if any.
    pub fn get(&self, key: &str) -> Option<String> {
        self.objects.get(key).map(|entry| entry.value().clone())
    }

    /// Number of stored payloads.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    fn put(&self, payload: &str, key: String) -> Result<String, PayloadStoreError> {
        let pointer = PayloadPointer::new(&self.bucket_name, &key).to_json()?;
        debug!(key = %key, bytes = payload.len(), "stored payload in memory");
        self.objects.insert(key, payload.to_owned());
        Ok(pointer)
    }
}

#[async_trait]
impl PayloadStore for MemoryPayloadStore {
    async fn store(&self, payload: &str) -> Result<String, PayloadStoreError> {
        self.put(payload, generate_key())
    }

    async fn store_with_key(&self, payload: &str, key: &str) -> Result<String, PayloadStoreError> {
        if key.is_empty() {
            return Err(PayloadStoreError::InvalidKey(
                "storage key must not be empty".to_owned(),
            ));
        }
        self.put(payload, key.to_owned())
    }
}
