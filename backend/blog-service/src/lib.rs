/// Blog Service Library
///
/// Posts, comments, favorites, media upload and full-text search for the
/// blog backend. Post visibility is enforced in one place (`access`) and
/// every read and write goes through it.
///
/// # Modules
///
/// - `access`: visibility and ownership predicates over posts
/// - `handlers`: HTTP request handlers and route table
/// - `models`: persisted records and request payloads
/// - `services`: business logic layer
/// - `db`: repositories and migrations
/// - `search`: Elasticsearch mirror of posts
/// - `storage`: object store for uploaded media
/// - `jobs`: keyword extraction queue and worker
/// - `middleware`: JWT authentication and request metrics
/// - `error`: error types and HTTP mapping
/// - `config`: configuration management
/// - `metrics`: Prometheus collectors
pub mod access;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod jobs;
pub mod metrics;
pub mod middleware;
pub mod models;
pub mod search;
pub mod services;
pub mod storage;

pub use config::Config;
pub use error::{AppError, Result};

use config::MediaConfig;
use jobs::keywords::KeywordQueue;
use search::SearchIndex;
use sqlx::PgPool;
use std::sync::Arc;
use storage::ObjectStore;

/// Shared handles injected into every request
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub search: Arc<dyn SearchIndex>,
    pub objects: Arc<dyn ObjectStore>,
    pub keywords: Arc<dyn KeywordQueue>,
    pub media: MediaConfig,
}
