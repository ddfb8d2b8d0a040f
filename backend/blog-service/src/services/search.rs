/// Search service - public full-text search over published posts
use crate::error::{AppError, Result};
use crate::search::{PostDocument, SearchError, SearchIndex};

pub const DEFAULT_SIZE: i64 = 10;
pub const MAX_SIZE: i64 = 100;

/// Run a search. A missing or blank query is a bad request; a missing index
/// is reported as not found and any other index failure as an internal error.
pub async fn search_posts(
    index: &dyn SearchIndex,
    query: Option<&str>,
    size: Option<i64>,
) -> Result<Vec<PostDocument>> {
    let query = query
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .ok_or_else(|| AppError::BadRequest("query parameter is required".to_string()))?;

    let size = size.unwrap_or(DEFAULT_SIZE).clamp(1, MAX_SIZE);

    index.search_posts(query, size).await.map_err(|e| match e {
        SearchError::IndexNotFound(name) => AppError::NotFound(format!("search index {}", name)),
        other => AppError::Internal(format!("search failed: {}", other)),
    })
}
