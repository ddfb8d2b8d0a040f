/// Data models for blog-service
///
/// This module defines structures for:
/// - Post: Blog posts with publication state and extracted keywords
/// - Comment: Comments on posts
/// - FavoritePost: Per-user bookmarks of posts
/// - Media: Uploaded images stored in the object store
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A blog post as stored in the `posts` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Post {
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

/// Listing projection of a post
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct PostSummary {
    pub id: i32,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Body of a create or full (PUT) update.
///
/// On a full update every mutable field is overwritten: omitted nullable
/// fields become NULL and an omitted `published` becomes `false`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostInput {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub short_description: Option<String>,
    #[serde(default)]
    pub published: Option<bool>,
    #[serde(default)]
    pub keywords: Option<String>,
}

impl PostInput {
    pub fn is_published(&self) -> bool {
        self.published.unwrap_or(false)
    }
}

/// Body of a partial (PATCH) update. Only present, non-null fields are written.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostPatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub short_description: Option<String>,
    pub keywords: Option<String>,
    pub published: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Comment {
    pub id: i32,
    pub post_id: i32,
    pub author_id: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommentInput {
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct FavoritePost {
    pub id: i32,
    pub user_id: String,
    pub post_id: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Media {
    pub id: i32,
    pub post_id: Option<i32>,
    pub file_path: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_input_defaults_to_draft() {
        let input: PostInput =
            serde_json::from_str(r#"{"title": "Hello", "content": "World"}"#).unwrap();
        assert!(!input.is_published());
        assert!(input.short_description.is_none());
        assert!(input.keywords.is_none());
    }

    #[test]
    fn test_post_patch_null_fields_are_absent() {
        let patch: PostPatch =
            serde_json::from_str(r#"{"title": "New", "content": null}"#).unwrap();
        assert_eq!(patch.title.as_deref(), Some("New"));
        assert!(patch.content.is_none());
        assert!(patch.published.is_none());
    }
}
