use serde::{Deserialize, Serialize};

/// Default application name appended to the SDK user agent, so offloading
/// publishers can be told apart in request logs.
pub const DEFAULT_APP_NAME: &str = "offload-extended-client";

/// Shared base configuration for the SNS and S3 adapters.
///
/// Contains common settings like region, optional STS assume-role ARN for
/// cross-account access, and an endpoint URL override for local development
/// (e.g. `LocalStack`).
#[derive(Clone, Serialize, Deserialize)]
pub struct AwsBaseConfig {
    /// AWS region (e.g. `"us-east-1"`).
    pub region: String,

    /// Optional IAM role ARN to assume via STS for cross-account access.
    pub role_arn: Option<String>,

    /// Optional endpoint URL override for local development (e.g. `LocalStack`).
    pub endpoint_url: Option<String>,

    /// Optional STS session name (defaults to `"offload-aws"`).
    #[serde(default)]
    pub session_name: Option<String>,

    /// Optional external ID for cross-account trust policies.
    #[serde(default)]
    pub external_id: Option<String>,

    /// Application name reported in the user agent.
    #[serde(default = "default_app_name")]
    pub app_name: String,
}

fn default_app_name() -> String {
    DEFAULT_APP_NAME.to_owned()
}

impl std::fmt::Debug for AwsBaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AwsBaseConfig")
            .field("region", &self.region)
            .field("role_arn", &self.role_arn.as_ref().map(|_| "[REDACTED]"))
            .field("endpoint_url", &self.endpoint_url)
            .field("session_name", &self.session_name)
            .field("external_id", &self.external_id.as_ref().map(|_| "[REDACTED]"))
            .field("app_name", &self.app_name)
            .finish()
    }
}

impl AwsBaseConfig {
    /// Create a new `AwsBaseConfig` with the given region.
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            ..Self::default()
        }
    }

    /// Set an IAM role ARN to assume via STS.
    #[must_use]
    pub fn with_role_arn(mut self, role_arn: impl Into<String>) -> Self {
        self.role_arn = Some(role_arn.into());
        self
    }

    /// Set an endpoint URL override for local development.
    #[must_use]
    pub fn with_endpoint_url(mut self, endpoint_url: impl Into<String>) -> Self {
        self.endpoint_url = Some(endpoint_url.into());
        self
    }

    /// Set the STS session name for assume-role.
    #[must_use]
    pub fn with_session_name(mut self, session_name: impl Into<String>) -> Self {
        self.session_name = Some(session_name.into());
        self
    }

    /// Set the external ID for cross-account trust policies.
    #[must_use]
    pub fn with_external_id(mut self, external_id: impl Into<String>) -> Self {
        self.external_id = Some(external_id.into());
        self
    }

    /// Set the application name reported in the user agent.
    #[must_use]
    pub fn with_app_name(mut self, app_name: impl Into<String>) -> Self {
        self.app_name = app_name.into();
        self
    }
}

impl Default for AwsBaseConfig {
    fn default() -> Self {
        Self {
            region: "us-east-1".to_owned(),
            role_arn: None,
            endpoint_url: None,
            session_name: None,
            external_id: None,
            app_name: default_app_name(),
        }
    }
}
