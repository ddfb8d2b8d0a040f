/// Favorite handlers
use crate::error::Result;
use crate::middleware::UserId;
use crate::services::{FavoriteOutcome, FavoriteService};
use crate::AppState;
use actix_web::{web, HttpResponse};

pub async fn add_favorite(
    state: web::Data<AppState>,
    user_id: UserId,
    post_id: web::Path<i32>,
) -> Result<HttpResponse> {
    let outcome = FavoriteService::from_state(&state)
        .add_favorite(&user_id.0, *post_id)
        .await?;

    let body = match outcome {
        FavoriteOutcome::Added => serde_json::json!({
            "message": "Post added to favorites",
            "already_exists": false,
        }),
        FavoriteOutcome::AlreadyExists => serde_json::json!({
            "message": "Post is already in favorites",
            "already_exists": true,
        }),
    };

    Ok(HttpResponse::Ok().json(body))
}

pub async fn remove_favorite(
    state: web::Data<AppState>,
    user_id: UserId,
    post_id: web::Path<i32>,
) -> Result<HttpResponse> {
    FavoriteService::from_state(&state)
        .remove_favorite(&user_id.0, *post_id)
        .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Post removed from favorites",
    })))
}

pub async fn list_favorites(state: web::Data<AppState>, user_id: UserId) -> Result<HttpResponse> {
    let posts = FavoriteService::from_state(&state)
        .list_favorites(&user_id.0)
        .await?;

    Ok(HttpResponse::Ok().json(posts))
}
