use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;

use crate::infrastructure::AppState;
use crate::services::ai_service::{self, GenerateRequest, IntegrationInput};

pub async fn list_integrations(State(state): State<AppState>) -> impl IntoResponse {
    match ai_service::list(&state).await {
        Ok(integrations) => {
            (StatusCode::OK, Json(json!({ "integrations": integrations }))).into_response()
        }
        Err(e) => e.into_response(),
    }
}

pub async fn create_integration(
    State(state): State<AppState>,
    Json(input): Json<IntegrationInput>,
) -> impl IntoResponse {
    match ai_service::create(&state, input).await {
        Ok(view) => (StatusCode::CREATED, Json(json!({ "integration": view }))).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn update_integration(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(input): Json<IntegrationInput>,
) -> impl IntoResponse {
    match ai_service::update(&state, id, input).await {
        Ok(view) => (StatusCode::OK, Json(json!({ "integration": view }))).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn set_default(State(state): State<AppState>, Path(id): Path<i32>) -> impl IntoResponse {
    match ai_service::set_default(&state, id).await {
        Ok(view) => (StatusCode::OK, Json(json!({ "integration": view }))).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn delete_integration(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> impl IntoResponse {
    match ai_service::delete(state.db(), id).await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "message": "Integration deleted" })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/api/admin/ai/generate",
    request_body = GenerateRequest,
    responses(
        (status = 200, description = "Generated content", body = crate::services::ai_service::GenerateResponse),
        (status = 503, description = "No AI integration configured")
    ),
    security(("bearer_auth" = []))
)]
pub async fn generate(
    State(state): State<AppState>,
    Json(request): Json<GenerateRequest>,
) -> impl IntoResponse {
    match ai_service::generate(&state, request).await {
        Ok(response) => (StatusCode::OK, Json(json!(response))).into_response(),
        Err(e) => e.into_response(),
    }
}
