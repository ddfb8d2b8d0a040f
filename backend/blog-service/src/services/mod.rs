/// Business logic layer for blog-service
///
/// This module provides high-level operations:
/// - Post service: visibility-checked reads, owner-only writes, search mirroring
/// - Comment service: comments on posts
/// - Favorite service: per-user favorites
/// - Media service: image upload to object storage
/// - Search: public full-text search
pub mod comments;
pub mod favorites;
pub mod media;
pub mod posts;
pub mod search;

// Re-export commonly used services
pub use comments::CommentService;
pub use favorites::{FavoriteOutcome, FavoriteService};
pub use media::{MediaService, UploadedFile, UploadedMedia};
pub use posts::PostService;
