/// S3 configuration for the media bucket
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Serialize, Deserialize)]
pub struct S3Config {
    /// Endpoint of the S3-compatible service (e.g. MinIO). `None` uses AWS defaults.
    pub endpoint: Option<String>,
    /// S3 bucket name
    pub bucket: String,
    /// Region passed to the SDK
    pub region: String,
    /// Static access key; when empty the default AWS credential chain is used
    pub access_key: String,
    /// Static secret key
    pub secret_key: String,
    /// Base URL for public access to stored objects
    pub base_url: String,
    /// Whether to use path-style URLs (false = virtual-hosted-style)
    pub path_style: bool,
}

impl fmt::Debug for S3Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("S3Config")
            .field("endpoint", &self.endpoint)
            .field("bucket", &self.bucket)
            .field("region", &self.region)
            .field("access_key", &self.access_key)
            .field("secret_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .field("path_style", &self.path_style)
            .finish()
    }
}

impl S3Config {
    /// Load S3 configuration from environment variables.
    ///
    /// Defaults target a local MinIO instance.
    pub fn from_env() -> Self {
        let endpoint = std::env::var("S3_ENDPOINT")
            .ok()
            .or_else(|| Some("http://localhost:9000".to_string()))
            .filter(|e| !e.trim().is_empty());

        Self {
            base_url: std::env::var("S3_BASE_URL").unwrap_or_else(|_| {
                endpoint
                    .clone()
                    .unwrap_or_else(|| "https://s3.amazonaws.com".to_string())
            }),
            endpoint,
            bucket: std::env::var("S3_BUCKET").unwrap_or_else(|_| "blog-media".to_string()),
            region: std::env::var("S3_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
            access_key: std::env::var("S3_ACCESS_KEY")
                .unwrap_or_else(|_| "minio_access_key".to_string()),
            secret_key: std::env::var("S3_SECRET_KEY")
                .unwrap_or_else(|_| "minio_secret_key".to_string()),
            path_style: std::env::var("S3_PATH_STYLE")
                .unwrap_or_else(|_| "true".to_string())
                .parse()
                .unwrap_or(true),
        }
    }

    /// Build the public URL of an object
    pub fn object_url(&self, key: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        if self.path_style {
            format!("{}/{}/{}", base, self.bucket, key)
        } else {
            format!("https://{}.s3.amazonaws.com/{}", self.bucket, key)
        }
    }
}
