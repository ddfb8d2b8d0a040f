//! Full-text search over posts backed by Elasticsearch.
//!
//! The store stays the source of truth; the index is a mirror written after
//! each post commit and read only by the public search endpoint.

use crate::models::Post;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use elasticsearch::{
    http::transport::{BuildError, SingleNodeConnectionPool, TransportBuilder},
    indices::{IndicesCreateParts, IndicesExistsParts},
    DeleteParts, Elasticsearch, IndexParts, SearchParts,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("invalid Elasticsearch URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("failed to build transport: {0}")]
    TransportBuild(#[from] BuildError),
    #[error("transport error: {0}")]
    Transport(#[from] elasticsearch::Error),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("index {0} not found")]
    IndexNotFound(String),
    #[error("Elasticsearch returned {status}: {body}")]
    Status { status: u16, body: String },
}

/// Document stored in the posts index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostDocument {
    pub id: i32,
    pub author_id: String,
    pub title: String,
    pub short_description: Option<String>,
    pub content: String,
    pub published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub published_at: Option<DateTime<Utc>>,
    pub keywords: Option<String>,
}

impl From<&Post> for PostDocument {
    fn from(post: &Post) -> Self {
        Self {
            id: post.id,
            author_id: post.author_id.clone(),
            title: post.title.clone(),
            short_description: post.short_description.clone(),
            content: post.content.clone(),
            published: post.published,
            created_at: post.created_at,
            updated_at: post.updated_at,
            published_at: post.published_at,
            keywords: post.keywords.clone(),
        }
    }
}

/// Search index operations used by the service
#[async_trait]
pub trait SearchIndex: Send + Sync {
    /// Check that the cluster answers
    async fn ping(&self) -> Result<(), SearchError>;

    /// Create the posts index with its mapping if it does not exist
    async fn ensure_index(&self) -> Result<(), SearchError>;

    /// Insert or replace the document for a post
    async fn index_post(&self, doc: &PostDocument) -> Result<(), SearchError>;

    /// Remove the document for a post; a missing document is not an error
    async fn delete_post(&self, post_id: i32) -> Result<(), SearchError>;

    /// Free-text search over published posts
    async fn search_posts(&self, query: &str, size: i64) -> Result<Vec<PostDocument>, SearchError>;
}

#[derive(Clone)]
pub struct ElasticsearchIndex {
    client: Elasticsearch,
    post_index: String,
    analyzer: String,
}

impl ElasticsearchIndex {
    pub fn new(url: &str, post_index: &str, analyzer: &str) -> Result<Self, SearchError> {
        let parsed = Url::parse(url)?;
        let pool = SingleNodeConnectionPool::new(parsed);
        let transport = TransportBuilder::new(pool).build()?;
        let client = Elasticsearch::new(transport);

        Ok(Self {
            client,
            post_index: post_index.to_string(),
            analyzer: analyzer.to_string(),
        })
    }
}

/// Index settings and mapping for posts
pub fn post_index_body(analyzer: &str) -> serde_json::Value {
    json!({
        "settings": {
            "number_of_shards": 1,
            "number_of_replicas": 0
        },
        "mappings": {
            "properties": {
                "id": { "type": "integer" },
                "author_id": { "type": "keyword" },
                "title": {
                    "type": "text",
                    "analyzer": analyzer,
                    "fields": { "raw": { "type": "keyword" } }
                },
                "short_description": {
                    "type": "text",
                    "analyzer": analyzer,
                    "fields": { "raw": { "type": "keyword" } }
                },
                "content": { "type": "text", "analyzer": analyzer },
                "published": { "type": "boolean" },
                "created_at": { "type": "date" },
                "updated_at": { "type": "date" },
                "published_at": { "type": "date" },
                "keywords": {
                    "type": "text",
                    "analyzer": "standard",
                    "fields": { "raw": { "type": "keyword" } }
                }
            }
        }
    })
}

/// Query body for a free-text search. Title matches weigh three times more
/// than description or content matches; drafts are never returned.
pub fn search_body(query: &str, size: i64) -> serde_json::Value {
    json!({
        "size": size,
        "query": {
            "bool": {
                "must": {
                    "multi_match": {
                        "query": query,
                        "fields": ["title^3", "short_description", "content"]
                    }
                },
                "filter": { "term": { "published": true } }
            }
        }
    })
}

#[async_trait]
impl SearchIndex for ElasticsearchIndex {
    async fn ping(&self) -> Result<(), SearchError> {
        let response = self.client.ping().send().await?;
        let status = response.status_code();
        if status.is_success() {
            Ok(())
        } else {
            Err(SearchError::Status {
                status: status.as_u16(),
                body: String::new(),
            })
        }
    }

    async fn ensure_index(&self) -> Result<(), SearchError> {
        let exists_response = self
            .client
            .indices()
            .exists(IndicesExistsParts::Index(&[self.post_index.as_str()]))
            .send()
            .await?;

        if exists_response.status_code().is_success() {
            return Ok(());
        }

        tracing::info!(index = %self.post_index, analyzer = %self.analyzer, "Creating search index");

        let response = self
            .client
            .indices()
            .create(IndicesCreateParts::Index(&self.post_index))
            .body(post_index_body(&self.analyzer))
            .send()
            .await?;

        error_for_status(response).await
    }

    async fn index_post(&self, doc: &PostDocument) -> Result<(), SearchError> {
        let response = self
            .client
            .index(IndexParts::IndexId(
                &self.post_index,
                doc.id.to_string().as_str(),
            ))
            .body(doc)
            .send()
            .await?;

        error_for_status(response).await
    }

    async fn delete_post(&self, post_id: i32) -> Result<(), SearchError> {
        let response = self
            .client
            .delete(DeleteParts::IndexId(
                &self.post_index,
                post_id.to_string().as_str(),
            ))
            .send()
            .await?;

        if response.status_code().as_u16() == 404 {
            return Ok(());
        }
        error_for_status(response).await
    }

    async fn search_posts(&self, query: &str, size: i64) -> Result<Vec<PostDocument>, SearchError> {
        let response = self
            .client
            .search(SearchParts::Index(&[self.post_index.as_str()]))
            .body(search_body(query, size))
            .send()
            .await?;

        let status = response.status_code();
        if status.as_u16() == 404 {
            return Err(SearchError::IndexNotFound(self.post_index.clone()));
        }
        if !status.is_success() {
            return Err(SearchError::Status {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        let search_response: SearchResponse = response.json().await?;
        Ok(search_response
            .hits
            .hits
            .into_iter()
            .filter_map(|hit| hit.source)
            .collect())
    }
}

async fn error_for_status(response: elasticsearch::http::response::Response) -> Result<(), SearchError> {
    let status = response.status_code();
    if status.is_success() {
        Ok(())
    } else {
        Err(SearchError::Status {
            status: status.as_u16(),
            body: response.text().await.unwrap_or_default(),
        })
    }
}

/// Poll the index until it answers, at most `max_attempts` times.
///
/// Returns the last error once attempts are exhausted.
pub async fn wait_until_available(
    index: &dyn SearchIndex,
    interval: Duration,
    max_attempts: u32,
) -> Result<(), SearchError> {
    let mut attempt = 0;
    loop {
        attempt += 1;
        match index.ping().await {
            Ok(()) => {
                tracing::info!(attempt, "Elasticsearch is available");
                return Ok(());
            }
            Err(e) if attempt >= max_attempts => {
                tracing::error!(attempt, error = %e, "Elasticsearch still unavailable, giving up");
                return Err(e);
            }
            Err(e) => {
                tracing::warn!(attempt, max_attempts, error = %e, "Elasticsearch not ready yet");
                tokio::time::sleep(interval).await;
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    hits: InnerHits,
}

#[derive(Debug, Deserialize)]
struct InnerHits {
    hits: Vec<PostHit>,
}

#[derive(Debug, Deserialize)]
struct PostHit {
    #[serde(rename = "_source")]
    source: Option<PostDocument>,
}
