use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;

use crate::infrastructure::AppState;
use crate::services::site_service;

#[utoipa::path(
    get,
    path = "/api/site/home",
    responses((status = 200, description = "Latest posts, featured media and counts"))
)]
pub async fn home(State(state): State<AppState>) -> impl IntoResponse {
    match site_service::home(&state).await {
        Ok(page) => (StatusCode::OK, Json(json!(page))).into_response(),
        Err(e) => e.into_response(),
    }
}
