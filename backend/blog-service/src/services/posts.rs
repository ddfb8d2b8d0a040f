/// Post service - handles post creation, retrieval, and management
///
/// Every store write runs in its own transaction. After commit the post is
/// mirrored into the search index and, when its content changed, queued for
/// keyword extraction.
use crate::access::{self, ListFilter};
use crate::db::post_repo;
use crate::error::{AppError, Result};
use crate::jobs::keywords::{KeywordJob, KeywordQueue};
use crate::metrics;
use crate::models::{Post, PostInput, PostPatch, PostSummary};
use crate::search::{PostDocument, SearchIndex};
use crate::AppState;
use sqlx::PgPool;
use std::sync::Arc;

pub struct PostService {
    pool: PgPool,
    search: Arc<dyn SearchIndex>,
    keywords: Arc<dyn KeywordQueue>,
}

impl PostService {
    pub fn new(pool: PgPool, search: Arc<dyn SearchIndex>, keywords: Arc<dyn KeywordQueue>) -> Self {
        Self {
            pool,
            search,
            keywords,
        }
    }

    pub fn from_state(state: &AppState) -> Self {
        Self::new(
            state.db.clone(),
            state.search.clone(),
            state.keywords.clone(),
        )
    }

    /// Create a post owned by `author_id`
    pub async fn create_post(&self, author_id: &str, input: &PostInput) -> Result<Post> {
        let mut tx = self.pool.begin().await?;
        let post = post_repo::create_post(&mut *tx, author_id, input).await?;
        tx.commit().await?;

        tracing::info!(post_id = post.id, author_id = %author_id, published = post.published, "Post created");

        self.dispatch_keywords(&post).await;
        self.mirror(&post).await?;

        Ok(post)
    }

    /// List summaries of posts visible to `requester`
    pub async fn list_posts(&self, requester: &str, filter: &ListFilter) -> Result<Vec<PostSummary>> {
        let predicate = access::list_predicate(requester, filter);
        let mut conn = self.pool.acquire().await?;
        let posts = post_repo::list_posts(&mut *conn, &predicate).await?;
        Ok(posts)
    }

    /// Fetch a post if it is visible to `requester`
    pub async fn get_post(&self, requester: &str, post_id: i32) -> Result<Post> {
        let predicate = access::visibility_predicate(requester);
        let mut conn = self.pool.acquire().await?;

        post_repo::find_post(&mut *conn, post_id, &predicate)
            .await?
            .ok_or_else(|| post_not_found(post_id))
    }

    /// Overwrite every mutable field of a post owned by `requester`
    pub async fn update_post(&self, requester: &str, post_id: i32, input: &PostInput) -> Result<Post> {
        let predicate = access::ownership_predicate(requester);

        let mut tx = self.pool.begin().await?;
        let post = post_repo::replace_post(&mut *tx, post_id, &predicate, input)
            .await?
            .ok_or_else(|| post_not_found(post_id))?;
        tx.commit().await?;

        tracing::info!(post_id, "Post updated");

        self.dispatch_keywords(&post).await;
        self.mirror(&post).await?;

        Ok(post)
    }

    /// Overwrite the fields present in `patch` on a post owned by `requester`
    pub async fn patch_post(&self, requester: &str, post_id: i32, patch: &PostPatch) -> Result<Post> {
        let predicate = access::ownership_predicate(requester);

        let mut tx = self.pool.begin().await?;
        let post = post_repo::patch_post(&mut *tx, post_id, &predicate, patch)
            .await?
            .ok_or_else(|| post_not_found(post_id))?;
        tx.commit().await?;

        tracing::info!(post_id, "Post patched");

        if patch.content.is_some() {
            self.dispatch_keywords(&post).await;
        }
        self.mirror(&post).await?;

        Ok(post)
    }

    /// Delete a post owned by `requester` together with its comments,
    /// media records and favorites.
    ///
    /// Removing the search document is best effort: a failure is logged and
    /// the deletion still succeeds.
    pub async fn delete_post(&self, requester: &str, post_id: i32) -> Result<()> {
        let predicate = access::ownership_predicate(requester);

        let mut tx = self.pool.begin().await?;
        let deleted = post_repo::delete_post(&mut *tx, post_id, &predicate).await?;
        if !deleted {
            return Err(post_not_found(post_id));
        }
        tx.commit().await?;

        tracing::info!(post_id, "Post deleted");

        match self.search.delete_post(post_id).await {
            Ok(()) => metrics::record_search_mirror("delete", true),
            Err(e) => {
                metrics::record_search_mirror("delete", false);
                tracing::warn!(post_id, error = %e, "Failed to remove post from search index");
            }
        }

        Ok(())
    }

    /// Queue keyword extraction. Failures are logged, never surfaced.
    async fn dispatch_keywords(&self, post: &Post) {
        if post.content.trim().is_empty() {
            return;
        }

        let job = KeywordJob {
            post_id: post.id,
            content: post.content.clone(),
        };

        match self.keywords.enqueue(&job).await {
            Ok(()) => metrics::record_keyword_job("queued"),
            Err(e) => {
                metrics::record_keyword_job("dispatch_failed");
                tracing::warn!(post_id = post.id, error = %e, "Failed to queue keyword extraction");
            }
        }
    }

    /// Write the post into the search index. The store write is already
    /// committed; a failure is reported to the caller as upstream unavailable.
    async fn mirror(&self, post: &Post) -> Result<()> {
        let doc = PostDocument::from(post);
        match self.search.index_post(&doc).await {
            Ok(()) => {
                metrics::record_search_mirror("index", true);
                Ok(())
            }
            Err(e) => {
                metrics::record_search_mirror("index", false);
                tracing::error!(post_id = post.id, error = %e, "Failed to index post");
                Err(AppError::from(e))
            }
        }
    }
}

fn post_not_found(post_id: i32) -> AppError {
    AppError::NotFound(format!("post {}", post_id))
}
