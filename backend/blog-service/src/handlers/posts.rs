/// Post handlers - HTTP endpoints for post operations
use crate::access::ListFilter;
use crate::error::Result;
use crate::middleware::UserId;
use crate::models::{PostInput, PostPatch};
use crate::services::PostService;
use crate::AppState;
use actix_web::{web, HttpResponse};

/// Create a new post
pub async fn create_post(
    state: web::Data<AppState>,
    user_id: UserId,
    req: web::Json<PostInput>,
) -> Result<HttpResponse> {
    let post = PostService::from_state(&state)
        .create_post(&user_id.0, &req)
        .await?;

    Ok(HttpResponse::Created().json(post))
}

/// List posts visible to the caller (`?published=&author_id=`)
pub async fn list_posts(
    state: web::Data<AppState>,
    user_id: UserId,
    query: web::Query<ListFilter>,
) -> Result<HttpResponse> {
    let posts = PostService::from_state(&state)
        .list_posts(&user_id.0, &query)
        .await?;

    Ok(HttpResponse::Ok().json(posts))
}

/// Get a post by ID
pub async fn get_post(
    state: web::Data<AppState>,
    user_id: UserId,
    post_id: web::Path<i32>,
) -> Result<HttpResponse> {
    let post = PostService::from_state(&state)
        .get_post(&user_id.0, *post_id)
        .await?;

    Ok(HttpResponse::Ok().json(post))
}

/// Replace a post (PUT)
pub async fn update_post(
    state: web::Data<AppState>,
    user_id: UserId,
    post_id: web::Path<i32>,
    req: web::Json<PostInput>,
) -> Result<HttpResponse> {
    let post = PostService::from_state(&state)
        .update_post(&user_id.0, *post_id, &req)
        .await?;

    Ok(HttpResponse::Ok().json(post))
}

/// Partially update a post (PATCH)
pub async fn patch_post(
    state: web::Data<AppState>,
    user_id: UserId,
    post_id: web::Path<i32>,
    req: web::Json<PostPatch>,
) -> Result<HttpResponse> {
    let post = PostService::from_state(&state)
        .patch_post(&user_id.0, *post_id, &req)
        .await?;

    Ok(HttpResponse::Ok().json(post))
}

/// Delete a post
pub async fn delete_post(
    state: web::Data<AppState>,
    user_id: UserId,
    post_id: web::Path<i32>,
) -> Result<HttpResponse> {
    PostService::from_state(&state)
        .delete_post(&user_id.0, *post_id)
        .await?;

    Ok(HttpResponse::NoContent().finish())
}
