use async_trait::async_trait;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{ObjectCannedAcl, ServerSideEncryption};
use offload_blob::{PayloadPointer, PayloadStore, PayloadStoreError, generate_key};
use offload_core::OffloadConfig;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument};

use crate::auth::build_sdk_config;
use crate::config::AwsBaseConfig;
use crate::error::{AwsError, classify_sdk_error};

/// Configuration for the S3 payload store.
#[derive(Clone, Serialize, Deserialize)]
pub struct S3StoreConfig {
    /// Shared AWS configuration (region, role ARN, endpoint URL).
    #[serde(flatten)]
    pub aws: AwsBaseConfig,

    /// Bucket that offloaded bodies are written to.
    pub bucket: String,

    /// KMS key for SSE-KMS encryption. Objects use the bucket default
    /// encryption when unset.
    #[serde(default)]
    pub kms_key_id: Option<String>,

    /// Canned ACL applied to each object (e.g. `"bucket-owner-full-control"`).
    #[serde(default)]
    pub canned_acl: Option<String>,
}

impl std::fmt::Debug for S3StoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3StoreConfig")
            .field("aws", &self.aws)
            .field("bucket", &self.bucket)
            .field("kms_key_id", &self.kms_key_id.as_ref().map(|_| "[REDACTED]"))
            .field("canned_acl", &self.canned_acl)
            .finish()
    }
}

impl S3StoreConfig {
    /// Create a new `S3StoreConfig` for the given region and bucket.
    pub fn new(region: impl Into<String>, bucket: impl Into<String>) -> Self {
        Self {
            aws: AwsBaseConfig::new(region),
            bucket: bucket.into(),
            kms_key_id: None,
            canned_acl: None,
        }
    }

    /// Take the bucket from an offload configuration.
    pub fn from_offload_config(
        aws: AwsBaseConfig,
        offload: &OffloadConfig,
    ) -> Result<Self, AwsError> {
        let bucket = offload
            .bucket_name()
            .filter(|b| !b.is_empty())
            .ok_or_else(|| {
                AwsError::Configuration("offload configuration has no bucket name".to_owned())
            })?;
        Ok(Self {
            aws,
            bucket: bucket.to_owned(),
            kms_key_id: None,
            canned_acl: None,
        })
    }

    /// Encrypt objects with SSE-KMS using the given key.
    #[must_use]
    pub fn with_kms_key_id(mut self, kms_key_id: impl Into<String>) -> Self {
        self.kms_key_id = Some(kms_key_id.into());
        self
    }

    /// Apply a canned ACL to each object.
    #[must_use]
    pub fn with_canned_acl(mut self, canned_acl: impl Into<String>) -> Self {
        self.canned_acl = Some(canned_acl.into());
        self
    }

    /// Set the endpoint URL override (for `LocalStack`).
    #[must_use]
    pub fn with_endpoint_url(mut self, endpoint_url: impl Into<String>) -> Self {
        self.aws.endpoint_url = Some(endpoint_url.into());
        self
    }
}

/// Payload store that writes offloaded bodies to S3.
///
/// Each payload becomes one object; the returned pointer names its bucket and
/// key.
pub struct S3PayloadStore {
    config: S3StoreConfig,
    client: aws_sdk_s3::Client,
}

impl std::fmt::Debug for S3PayloadStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3PayloadStore")
            .field("config", &self.config)
            .field("client", &"<S3Client>")
            .finish()
    }
}

impl S3PayloadStore {
    /// Create a new `S3PayloadStore` by building an AWS SDK client.
    pub async fn new(config: S3StoreConfig) -> Self {
        let sdk_config = build_sdk_config(&config.aws).await;
        let client = aws_sdk_s3::Client::new(&sdk_config);
        Self { config, client }
    }

    /// Create an `S3PayloadStore` with a pre-built client.
    pub fn with_client(config: S3StoreConfig, client: aws_sdk_s3::Client) -> Self {
        Self { config, client }
    }

    pub fn bucket(&self) -> &str {
        &self.config.bucket
    }

    #[instrument(skip_all, fields(provider = "aws-s3", bucket = %self.config.bucket, key = %key))]
    async fn put(&self, payload: &str, key: String) -> Result<String, PayloadStoreError> {
        // Build the pointer first so a serialization failure leaves no object behind.
        let pointer = PayloadPointer::new(&self.config.bucket, &key).to_json()?;

        let mut request = self
            .client
            .put_object()
            .bucket(&self.config.bucket)
            .key(&key)
            .body(ByteStream::from(payload.as_bytes().to_vec()));

        if let Some(ref kms_key_id) = self.config.kms_key_id {
            request = request
                .server_side_encryption(ServerSideEncryption::AwsKms)
                .ssekms_key_id(kms_key_id);
        }
        if let Some(ref acl) = self.config.canned_acl {
            request = request.acl(ObjectCannedAcl::from(acl.as_str()));
        }

        debug!(bytes = payload.len(), "writing payload to S3");
        request.send().await.map_err(|e| {
            let err_str = DisplayErrorContext(&e).to_string();
            error!(error = %err_str, "S3 put failed");
            PayloadStoreError::from(classify_sdk_error(&err_str))
        })?;

        info!(bytes = payload.len(), "payload stored in S3");
        Ok(pointer)
    }
}

#[async_trait]
impl PayloadStore for S3PayloadStore {
    async fn store(&self, payload: &str) -> Result<String, PayloadStoreError> {
        self.put(payload, generate_key()).await
    }

    async fn store_with_key(&self, payload: &str, key: &str) -> Result<String, PayloadStoreError> {
        validate_key(key)?;
        self.put(payload, key.to_owned()).await
    }
}

/// Reject keys S3 would refuse: empty, or longer than 1024 bytes.
fn validate_key(key: &str) -> Result<(), PayloadStoreError> {
    if key.is_empty() {
        return Err(PayloadStoreError::InvalidKey(
            "storage key must not be empty".to_owned(),
        ));
    }
    if key.len() > 1024 {
        return Err(PayloadStoreError::InvalidKey(format!(
            "storage key is {} bytes, S3 allows at most 1024",
            key.len()
        )));
    }
    Ok(())
}
