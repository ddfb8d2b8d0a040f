/// Database access layer
///
/// This module provides:
/// - Repository functions for posts, comments, favorites and media
/// - Embedded schema migrations
///
/// Repository functions take a `&mut PgConnection` so callers can run several
/// of them inside one transaction.
pub mod comment_repo;
pub mod favorite_repo;
pub mod media_repo;
pub mod post_repo;

use sqlx::migrate::Migrator;

pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");
