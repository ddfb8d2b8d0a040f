/// Comment handlers - HTTP endpoints for comment operations
use crate::error::Result;
use crate::middleware::UserId;
use crate::models::CommentInput;
use crate::services::CommentService;
use crate::AppState;
use actix_web::{web, HttpResponse};

/// Create a new comment
pub async fn create_comment(
    state: web::Data<AppState>,
    user_id: UserId,
    post_id: web::Path<i32>,
    req: web::Json<CommentInput>,
) -> Result<HttpResponse> {
    let comment = CommentService::from_state(&state)
        .create_comment(&user_id.0, *post_id, &req.content)
        .await?;

    Ok(HttpResponse::Created().json(comment))
}

/// Get comments for a post
pub async fn list_comments(
    state: web::Data<AppState>,
    user_id: UserId,
    post_id: web::Path<i32>,
) -> Result<HttpResponse> {
    let comments = CommentService::from_state(&state)
        .list_comments(&user_id.0, *post_id)
        .await?;

    Ok(HttpResponse::Ok().json(comments))
}

/// Update a comment
pub async fn update_comment(
    state: web::Data<AppState>,
    user_id: UserId,
    comment_id: web::Path<i32>,
    req: web::Json<CommentInput>,
) -> Result<HttpResponse> {
    let comment = CommentService::from_state(&state)
        .update_comment(&user_id.0, *comment_id, &req.content)
        .await?;

    Ok(HttpResponse::Ok().json(comment))
}

/// Delete a comment
pub async fn delete_comment(
    state: web::Data<AppState>,
    user_id: UserId,
    comment_id: web::Path<i32>,
) -> Result<HttpResponse> {
    CommentService::from_state(&state)
        .delete_comment(&user_id.0, *comment_id)
        .await?;

    Ok(HttpResponse::NoContent().finish())
}
