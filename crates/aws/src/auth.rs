use aws_config::AppName;
use tracing::{debug, info, warn};

use crate::config::AwsBaseConfig;

/// Build an AWS SDK configuration from the given [`AwsBaseConfig`].
///
/// Uses the standard AWS SDK environment credential chain and optionally:
/// - Overrides the endpoint URL for local development (e.g. `LocalStack`)
/// - Assumes an IAM role via STS if `role_arn` is configured, with automatic
///   credential refresh before expiry
/// - Tags the user agent with the configured application name
///
/// # Examples
///
/// ```no_run
/// use offload_aws::config::AwsBaseConfig;
/// use offload_aws::auth::build_sdk_config;
///
/// # async fn example() {
/// let config = AwsBaseConfig::new("us-east-1")
///     .with_endpoint_url("http://localhost:4566");
/// let sdk_config = build_sdk_config(&config).await;
/// # }
/// ```
pub async fn build_sdk_config(config: &AwsBaseConfig) -> aws_config::SdkConfig {
    let region = aws_config::Region::new(config.region.clone());
    let app_name = app_name(config);

    let mut loader = aws_config::from_env().region(region.clone());
    if let Some(endpoint) = &config.endpoint_url {
        debug!(endpoint = %endpoint, "using custom AWS endpoint");
        loader = loader.endpoint_url(endpoint);
    }
    if let Some(name) = app_name.clone() {
        loader = loader.app_name(name);
    }

    let Some(role_arn) = &config.role_arn else {
        return loader.load().await;
    };

    let session_name = config.session_name.as_deref().unwrap_or("offload-aws");
    info!(role_arn = %role_arn, session_name = %session_name, "assuming IAM role via STS (auto-refresh)");

    // The assume-role provider inherits the endpoint override and base
    // credentials from this config for its own STS calls.
    let base_config = loader.load().await;

    let mut provider_builder = aws_config::sts::AssumeRoleProvider::builder(role_arn)
        .session_name(session_name)
        .region(region.clone());
    if let Some(ref external_id) = config.external_id {
        provider_builder = provider_builder.external_id(external_id);
    }
    let assume_role_provider = provider_builder.configure(&base_config).build().await;

    let mut final_loader = aws_config::from_env()
        .region(region)
        .credentials_provider(assume_role_provider);
    if let Some(endpoint) = &config.endpoint_url {
        final_loader = final_loader.endpoint_url(endpoint);
    }
    if let Some(name) = app_name {
        final_loader = final_loader.app_name(name);
    }

    final_loader.load().await
}

fn app_name(config: &AwsBaseConfig) -> Option<AppName> {
    match AppName::new(config.app_name.clone()) {
        Ok(name) => Some(name),
        Err(e) => {
            warn!(app_name = %config.app_name, error = %e, "ignoring invalid app name");
            None
        }
    }
}
