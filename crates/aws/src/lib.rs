//! AWS adapters for large-payload publishing.
//!
//! This crate provides feature-gated implementations of the two capabilities
//! the extended client consumes:
//!
//! - **SNS** (`sns` feature) — [`SnsDeliverer`](sns::SnsDeliverer), the
//!   transport, with the full SNS client reachable for everything but publish
//! - **S3** (`s3` feature) — [`S3PayloadStore`](s3::S3PayloadStore), where
//!   offloaded bodies are written
//!
//! Both share a common [`AwsBaseConfig`](config::AwsBaseConfig) for region,
//! endpoint override, and optional STS assume-role credentials.

pub mod auth;
pub mod config;
pub mod error;

#[cfg(feature = "sns")]
pub mod sns;

#[cfg(feature = "s3")]
pub mod s3;

// Re-exports for convenience.
pub use config::AwsBaseConfig;
pub use error::AwsError;

#[cfg(feature = "sns")]
pub use sns::{SnsConfig, SnsDeliverer};

#[cfg(feature = "s3")]
pub use s3::{S3PayloadStore, S3StoreConfig};
