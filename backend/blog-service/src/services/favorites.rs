/// Favorite service - per-user bookmarks of posts
use crate::access;
use crate::db::{favorite_repo, post_repo};
use crate::error::{AppError, Result};
use crate::models::PostSummary;
use crate::AppState;
use sqlx::PgPool;

/// Result of adding a favorite
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FavoriteOutcome {
    Added,
    AlreadyExists,
}

pub struct FavoriteService {
    pool: PgPool,
}

impl FavoriteService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn from_state(state: &AppState) -> Self {
        Self::new(state.db.clone())
    }

    /// Add a post the user can see to their favorites. Adding the same post
    /// twice is not an error and writes nothing.
    pub async fn add_favorite(&self, user_id: &str, post_id: i32) -> Result<FavoriteOutcome> {
        let mut tx = self.pool.begin().await?;

        let visible = access::visibility_predicate(user_id);
        if post_repo::find_post(&mut *tx, post_id, &visible).await?.is_none() {
            return Err(AppError::NotFound(format!("post {}", post_id)));
        }

        let outcome = match favorite_repo::create_favorite(&mut *tx, user_id, post_id).await? {
            Some(_) => FavoriteOutcome::Added,
            None => FavoriteOutcome::AlreadyExists,
        };
        tx.commit().await?;

        Ok(outcome)
    }

    pub async fn remove_favorite(&self, user_id: &str, post_id: i32) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        if !favorite_repo::delete_favorite(&mut *tx, user_id, post_id).await? {
            return Err(AppError::NotFound(format!(
                "post {} is not in favorites",
                post_id
            )));
        }
        tx.commit().await?;

        Ok(())
    }

    /// Favorited posts that are still visible to the user
    pub async fn list_favorites(&self, user_id: &str) -> Result<Vec<PostSummary>> {
        let mut conn = self.pool.acquire().await?;
        let visible = access::visibility_predicate(user_id);
        let posts = favorite_repo::list_favorite_posts(&mut *conn, user_id, &visible).await?;
        Ok(posts)
    }
}
