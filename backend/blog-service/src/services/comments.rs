/// Comment service - comments on posts
use crate::access;
use crate::db::{comment_repo, post_repo};
use crate::error::{AppError, Result};
use crate::models::Comment;
use crate::AppState;
use sqlx::PgPool;

pub struct CommentService {
    pool: PgPool,
}

impl CommentService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn from_state(state: &AppState) -> Self {
        Self::new(state.db.clone())
    }

    /// Comment on an existing post
    pub async fn create_comment(&self, author_id: &str, post_id: i32, content: &str) -> Result<Comment> {
        let mut tx = self.pool.begin().await?;

        if !post_repo::post_exists(&mut *tx, post_id).await? {
            return Err(AppError::NotFound(format!("post {}", post_id)));
        }

        let comment = comment_repo::create_comment(&mut *tx, post_id, author_id, content).await?;
        tx.commit().await?;

        tracing::debug!(comment_id = comment.id, post_id, "Comment created");
        Ok(comment)
    }

    /// Comments of a post visible to `requester`
    pub async fn list_comments(&self, requester: &str, post_id: i32) -> Result<Vec<Comment>> {
        let mut conn = self.pool.acquire().await?;

        let visible = access::visibility_predicate(requester);
        if post_repo::find_post(&mut *conn, post_id, &visible).await?.is_none() {
            return Err(AppError::NotFound(format!("post {}", post_id)));
        }

        let comments = comment_repo::get_comments_by_post(&mut *conn, post_id).await?;
        Ok(comments)
    }

    pub async fn update_comment(&self, requester: &str, comment_id: i32, content: &str) -> Result<Comment> {
        let mut tx = self.pool.begin().await?;
        let comment = comment_repo::update_comment(&mut *tx, comment_id, requester, content)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("comment {}", comment_id)))?;
        tx.commit().await?;

        Ok(comment)
    }

    pub async fn delete_comment(&self, requester: &str, comment_id: i32) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        if !comment_repo::delete_comment(&mut *tx, comment_id, requester).await? {
            return Err(AppError::NotFound(format!("comment {}", comment_id)));
        }
        tx.commit().await?;

        tracing::debug!(comment_id, "Comment deleted");
        Ok(())
    }
}
