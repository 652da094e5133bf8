use std::collections::HashMap;

use aws_sdk_sns::error::DisplayErrorContext;
use aws_sdk_sns::operation::publish::PublishOutput;
use aws_sdk_sns::primitives::Blob;
use aws_sdk_sns::types::MessageAttributeValue;
use offload_client::Deliverer;
use offload_core::{AttributeValue, Message};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument};

use crate::auth::build_sdk_config;
use crate::config::AwsBaseConfig;
use crate::error::{AwsError, classify_sdk_error};

/// Configuration for the SNS deliverer.
#[derive(Clone, Serialize, Deserialize)]
pub struct SnsConfig {
    /// Shared AWS configuration (region, role ARN, endpoint URL).
    #[serde(flatten)]
    pub aws: AwsBaseConfig,

    /// Default SNS topic ARN, used when a message names no destination.
    pub topic_arn: Option<String>,
}

impl std::fmt::Debug for SnsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnsConfig")
            .field("aws", &self.aws)
            .field("topic_arn", &self.topic_arn)
            .finish()
    }
}

impl SnsConfig {
    /// Create a new `SnsConfig` with the given AWS region.
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            aws: AwsBaseConfig::new(region),
            topic_arn: None,
        }
    }

    /// Set the default topic ARN.
    #[must_use]
    pub fn with_topic_arn(mut self, topic_arn: impl Into<String>) -> Self {
        self.topic_arn = Some(topic_arn.into());
        self
    }

    /// Set the endpoint URL override (for `LocalStack`).
    #[must_use]
    pub fn with_endpoint_url(mut self, endpoint_url: impl Into<String>) -> Self {
        self.aws.endpoint_url = Some(endpoint_url.into());
        self
    }

    /// Set the IAM role ARN to assume.
    #[must_use]
    pub fn with_role_arn(mut self, role_arn: impl Into<String>) -> Self {
        self.aws.role_arn = Some(role_arn.into());
        self
    }
}

/// SNS transport for the extended client.
///
/// Only `Publish` goes through [`Deliverer`]. Topic, subscription and endpoint
/// management are reached unchanged through [`client`](Self::client).
pub struct SnsDeliverer {
    config: SnsConfig,
    client: aws_sdk_sns::Client,
}

impl std::fmt::Debug for SnsDeliverer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnsDeliverer")
            .field("config", &self.config)
            .field("client", &"<SnsClient>")
            .finish()
    }
}

impl SnsDeliverer {
    /// Create a new `SnsDeliverer` by building an AWS SDK client.
    pub async fn new(config: SnsConfig) -> Self {
        let sdk_config = build_sdk_config(&config.aws).await;
        let client = aws_sdk_sns::Client::new(&sdk_config);
        Self { config, client }
    }

    /// Create an `SnsDeliverer` with a pre-built client.
    pub fn with_client(config: SnsConfig, client: aws_sdk_sns::Client) -> Self {
        Self { config, client }
    }

    /// The underlying SNS client, for every operation other than publish.
    pub fn client(&self) -> &aws_sdk_sns::Client {
        &self.client
    }

    /// Verify connectivity by listing topics.
    #[instrument(skip(self), fields(provider = "aws-sns"))]
    pub async fn health_check(&self) -> Result<(), AwsError> {
        debug!("performing SNS health check");
        self.client.list_topics().send().await.map_err(|e| {
            let err_str = DisplayErrorContext(&e).to_string();
            error!(error = %err_str, "SNS health check failed");
            classify_sdk_error(&err_str)
        })?;
        info!("SNS health check passed");
        Ok(())
    }
}

impl Deliverer for SnsDeliverer {
    type Response = PublishOutput;
    type Error = AwsError;

    #[instrument(skip(self, message), fields(provider = "aws-sns", body_bytes = message.body.len()))]
    async fn publish(&self, message: Message) -> Result<PublishOutput, AwsError> {
        let attributes = to_sns_attributes(&message.attributes)?;
        let topic_arn = resolve_topic_arn(&message, self.config.topic_arn.as_deref());

        debug!(topic_arn = ?topic_arn, "publishing to SNS");

        let result = self
            .client
            .publish()
            .message(message.body)
            .set_topic_arn(topic_arn)
            .set_target_arn(message.target_arn)
            .set_phone_number(message.phone_number)
            .set_subject(message.subject)
            .set_message_structure(message.structure)
            .set_message_group_id(message.message_group_id)
            .set_message_deduplication_id(message.message_deduplication_id)
            .set_message_attributes(attributes)
            .send()
            .await
            .map_err(|e| {
                let err_str = DisplayErrorContext(&e).to_string();
                error!(error = %err_str, "SNS publish failed");
                classify_sdk_error(&err_str)
            })?;

        info!(message_id = ?result.message_id(), "SNS message published");
        Ok(result)
    }
}

/// The message's own topic, or the default topic when the message names no
/// destination at all.
fn resolve_topic_arn(message: &Message, default: Option<&str>) -> Option<String> {
    if message.topic_arn.is_some() {
        return message.topic_arn.clone();
    }
    if message.target_arn.is_some() || message.phone_number.is_some() {
        return None;
    }
    default.map(ToOwned::to_owned)
}

/// Convert message attributes to the SDK's attribute type.
///
/// Returns `None` for an empty map so the request carries no attribute block.
pub fn to_sns_attributes(
    attributes: &HashMap<String, AttributeValue>,
) -> Result<Option<HashMap<String, MessageAttributeValue>>, AwsError> {
    if attributes.is_empty() {
        return Ok(None);
    }

    attributes
        .iter()
        .map(|(name, value)| {
            let data_type = value.data_type.clone().ok_or_else(|| {
                AwsError::InvalidMessage(format!("attribute '{name}' has no data type"))
            })?;
            let converted = MessageAttributeValue::builder()
                .data_type(data_type)
                .set_string_value(value.string_value.clone())
                .set_binary_value(value.binary_value.as_ref().map(|b| Blob::new(b.to_vec())))
                .build()
                .map_err(|e| AwsError::InvalidMessage(e.to_string()))?;
            Ok((name.clone(), converted))
        })
        .collect::<Result<HashMap<_, _>, _>>()
        .map(Some)
}
