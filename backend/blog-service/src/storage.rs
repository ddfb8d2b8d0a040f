/// Object storage for uploaded media
use async_trait::async_trait;
use s3_utils::{S3Error, S3Operations};

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error(transparent)]
    S3(#[from] S3Error),
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Create the bucket if it does not exist
    async fn ensure_bucket(&self) -> Result<(), StorageError>;

    /// Store a fully buffered object under `key`
    async fn put_object(
        &self,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError>;

    /// Public URL of an object
    fn public_url(&self, key: &str) -> String;
}

#[async_trait]
impl ObjectStore for S3Operations {
    async fn ensure_bucket(&self) -> Result<(), StorageError> {
        S3Operations::ensure_bucket(self).await?;
        Ok(())
    }

    async fn put_object(
        &self,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError> {
        self.upload_file(key, body, content_type).await?;
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        self.config().object_url(key)
    }
}
