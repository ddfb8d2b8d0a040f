/// HTTP handlers for blog endpoints
///
/// This module contains handlers for:
/// - Posts: CRUD with visibility and ownership checks
/// - Comments: comments on posts
/// - Favorites: per-user favorite posts
/// - Media: image upload
/// - Search: public full-text search
/// - Health: liveness and readiness probes
pub mod comments;
pub mod favorites;
pub mod health;
pub mod media;
pub mod posts;
pub mod search;

use crate::error::AppError;
use crate::middleware::{JwtAuthMiddleware, MetricsMiddleware};
use actix_web::web;

pub const API_BASE_PATH: &str = "/api/blog";

/// Register every blog route under [`API_BASE_PATH`].
///
/// Search and health checks are public; everything else requires a bearer
/// token.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        AppError::BadRequest(err.to_string()).into()
    }))
    .app_data(web::QueryConfig::default().error_handler(|err, _req| {
        AppError::BadRequest(err.to_string()).into()
    }))
    .route("/metrics", web::get().to(crate::metrics::serve_metrics))
    .service(
        web::scope(API_BASE_PATH)
            .wrap(MetricsMiddleware)
            .route("/health", web::get().to(health::health_summary))
            .route("/health/ready", web::get().to(health::readiness_summary))
            .route("/health/live", web::get().to(health::liveness_check))
            .route("/search", web::get().to(search::search_posts))
            .service(
                web::scope("")
                    .wrap(JwtAuthMiddleware)
                    .service(
                        web::resource("/posts")
                            .route(web::post().to(posts::create_post))
                            .route(web::get().to(posts::list_posts)),
                    )
                    .service(
                        web::resource("/posts/{post_id}")
                            .route(web::get().to(posts::get_post))
                            .route(web::put().to(posts::update_post))
                            .route(web::patch().to(posts::patch_post))
                            .route(web::delete().to(posts::delete_post)),
                    )
                    .service(
                        web::resource("/posts/{post_id}/comments")
                            .route(web::post().to(comments::create_comment))
                            .route(web::get().to(comments::list_comments)),
                    )
                    .service(
                        web::resource("/comments/{comment_id}")
                            .route(web::put().to(comments::update_comment))
                            .route(web::delete().to(comments::delete_comment)),
                    )
                    .service(web::resource("/favorites").route(web::get().to(favorites::list_favorites)))
                    .service(
                        web::resource("/favorites/{post_id}")
                            .route(web::post().to(favorites::add_favorite))
                            .route(web::delete().to(favorites::remove_favorite)),
                    )
                    .service(web::resource("/upload").route(web::post().to(media::upload_media))),
            ),
    );
}
