/// S3 utilities for the blog media bucket
///
/// Provides the S3 client construction (AWS or any S3-compatible endpoint such
/// as MinIO), configuration, and the object operations the services need.
use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_s3::Client;
use std::sync::Arc;

pub mod config;
pub mod operations;

pub use config::S3Config;
pub use operations::S3Operations;

/// Errors raised by S3 operations
#[derive(Debug, thiserror::Error)]
pub enum S3Error {
    #[error("S3 request failed: {0}")]
    Request(String),
}

/// Shared S3 client wrapper
#[derive(Clone)]
pub struct S3Client {
    client: Arc<Client>,
    config: S3Config,
}

impl S3Client {
    /// Create new S3 client with custom configuration
    pub async fn with_config(config: S3Config) -> Self {
        let mut builder = if config.access_key.is_empty() {
            let sdk_config = aws_config::load_defaults(BehaviorVersion::latest()).await;
            aws_sdk_s3::config::Builder::from(&sdk_config)
        } else {
            aws_sdk_s3::config::Builder::new()
                .behavior_version(BehaviorVersion::latest())
                .credentials_provider(Credentials::new(
                    config.access_key.clone(),
                    config.secret_key.clone(),
                    None,
                    None,
                    "s3-utils-static",
                ))
        };

        builder = builder
            .region(Region::new(config.region.clone()))
            .force_path_style(config.path_style);

        if let Some(endpoint) = &config.endpoint {
            builder = builder.endpoint_url(endpoint);
        }

        let client = Client::from_conf(builder.build());

        Self {
            client: Arc::new(client),
            config,
        }
    }

    /// Object operations bound to the configured bucket
    pub fn operations(&self) -> S3Operations {
        S3Operations::new(self.client.clone(), self.config.clone())
    }
}
