/// S3 operations for media upload and bucket management
use crate::config::S3Config;
use crate::S3Error;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use std::sync::Arc;

#[derive(Clone)]
pub struct S3Operations {
    client: Arc<Client>,
    config: S3Config,
}

impl S3Operations {
    pub fn new(client: Arc<Client>, config: S3Config) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &S3Config {
        &self.config
    }

    /// Upload a fully buffered object to the bucket
    pub async fn upload_file(
        &self,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<(), S3Error> {
        self.client
            .put_object()
            .bucket(&self.config.bucket)
            .key(key)
            .content_type(content_type)
            .content_length(body.len() as i64)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|e| S3Error::Request(DisplayErrorContext(&e).to_string()))?;

        Ok(())
    }

    /// Create the bucket if it does not exist yet
    pub async fn ensure_bucket(&self) -> Result<(), S3Error> {
        if self.bucket_exists().await {
            return Ok(());
        }

        tracing::info!(bucket = %self.config.bucket, "Creating S3 bucket");
        self.client
            .create_bucket()
            .bucket(&self.config.bucket)
            .send()
            .await
            .map_err(|e| S3Error::Request(DisplayErrorContext(&e).to_string()))?;

        Ok(())
    }

    /// Health check for S3 connectivity
    pub async fn bucket_exists(&self) -> bool {
        self.client
            .head_bucket()
            .bucket(&self.config.bucket)
            .send()
            .await
            .is_ok()
    }
}
