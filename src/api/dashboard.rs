use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;

use crate::infrastructure::AppState;
use crate::services::dashboard_service;

#[utoipa::path(
    get,
    path = "/api/admin/dashboard",
    responses(
        (status = 200, description = "Admin dashboard counters", body = crate::services::dashboard_service::DashboardStats)
    ),
    security(("bearer_auth" = []))
)]
pub async fn stats(State(state): State<AppState>) -> impl IntoResponse {
    match dashboard_service::stats(&state).await {
        Ok(stats) => (StatusCode::OK, Json(json!(stats))).into_response(),
        Err(e) => e.into_response(),
    }
}
