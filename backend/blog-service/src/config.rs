/// Configuration management for Blog Service
///
/// This module handles loading and managing configuration from environment
/// variables (optionally seeded from a `.env` file by the binaries).
use db_pool::DbConfig;
use s3_utils::S3Config;
use serde::{Deserialize, Serialize};

/// Main application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Application settings
    pub app: AppConfig,
    /// Database pool configuration
    pub database: DbConfig,
    /// Search index configuration
    pub search: SearchConfig,
    /// Object store configuration
    pub storage: S3Config,
    /// Keyword queue configuration
    pub queue: QueueConfig,
    /// Identity verification configuration
    pub auth: AuthConfig,
    /// Upload limits
    pub media: MediaConfig,
}

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application environment (development, staging, production)
    pub env: String,
    /// Server host to bind to
    pub host: String,
    /// Server port to bind to
    pub port: u16,
}

impl AppConfig {
    pub fn is_production(&self) -> bool {
        self.env.eq_ignore_ascii_case("production")
    }
}

/// Elasticsearch configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    pub url: String,
    /// Name of the posts index
    pub index: String,
    /// Analyzer applied to title, description and content
    pub analyzer: String,
    /// Startup wait: number of ping attempts
    pub wait_attempts: u32,
    /// Startup wait: seconds between ping attempts
    pub wait_interval_secs: u64,
}

/// Redis work queue configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueConfig {
    pub redis_url: String,
    /// Redis list holding pending keyword jobs
    pub keyword_queue: String,
    /// BRPOP timeout used by the worker so it can observe shutdown
    pub poll_timeout_secs: u64,
}

/// JWT verification configuration
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    /// PEM encoded RSA public key used to verify RS256 bearer tokens
    pub jwt_public_key_pem: Option<String>,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field(
                "jwt_public_key_pem",
                &self.jwt_public_key_pem.as_ref().map(|_| "[PEM]"),
            )
            .finish()
    }
}

/// Media upload configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaConfig {
    /// Maximum accepted upload size in bytes
    pub max_upload_bytes: usize,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            max_upload_bytes: 20 * 1024 * 1024,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, String> {
        let app_env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        let app = AppConfig {
            env: app_env,
            host: std::env::var("BLOG_SERVICE_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env_or("BLOG_SERVICE_PORT", 8000),
        };

        let auth = AuthConfig {
            jwt_public_key_pem: load_public_key()?,
        };

        if app.is_production() && auth.jwt_public_key_pem.is_none() {
            return Err(
                "JWT_PUBLIC_KEY_PEM or JWT_PUBLIC_KEY_FILE must be set in production".to_string(),
            );
        }

        Ok(Config {
            app,
            database: DbConfig::from_env("blog-service"),
            search: SearchConfig {
                url: std::env::var("ELASTICSEARCH_URL")
                    .unwrap_or_else(|_| "http://localhost:9200".to_string()),
                index: std::env::var("ELASTICSEARCH_INDEX").unwrap_or_else(|_| "posts".to_string()),
                analyzer: std::env::var("ELASTICSEARCH_ANALYZER")
                    .unwrap_or_else(|_| "polish".to_string()),
                wait_attempts: env_or("ELASTICSEARCH_WAIT_ATTEMPTS", 30),
                wait_interval_secs: env_or("ELASTICSEARCH_WAIT_INTERVAL_SECS", 2),
            },
            storage: S3Config::from_env(),
            queue: QueueConfig {
                redis_url: std::env::var("REDIS_URL")
                    .unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string()),
                keyword_queue: std::env::var("KEYWORD_QUEUE")
                    .unwrap_or_else(|_| "blog:keyword_jobs".to_string()),
                poll_timeout_secs: env_or("KEYWORD_QUEUE_POLL_TIMEOUT_SECS", 5),
            },
            auth,
            media: MediaConfig {
                max_upload_bytes: env_or(
                    "MEDIA_MAX_UPLOAD_BYTES",
                    MediaConfig::default().max_upload_bytes,
                ),
            },
        })
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn load_public_key() -> Result<Option<String>, String> {
    if let Ok(pem) = std::env::var("JWT_PUBLIC_KEY_PEM") {
        if !pem.trim().is_empty() {
            return Ok(Some(pem));
        }
    }

    match std::env::var("JWT_PUBLIC_KEY_FILE") {
        Ok(path) if !path.trim().is_empty() => std::fs::read_to_string(&path)
            .map(Some)
            .map_err(|e| format!("failed to read JWT public key from {}: {}", path, e)),
        _ => Ok(None),
    }
}
