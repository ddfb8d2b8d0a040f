/// Search handler (public)
use crate::error::Result;
use crate::services::search;
use crate::AppState;
use actix_web::{web, HttpResponse};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub query: Option<String>,
    pub size: Option<i64>,
}

pub async fn search_posts(
    state: web::Data<AppState>,
    params: web::Query<SearchParams>,
) -> Result<HttpResponse> {
    let results =
        search::search_posts(state.search.as_ref(), params.query.as_deref(), params.size).await?;

    Ok(HttpResponse::Ok().json(results))
}
