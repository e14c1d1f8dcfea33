use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use serde_json::json;

use crate::services::podcast_service::{self, ApplicationRequest, ReviewRequest};

#[derive(Debug, Deserialize)]
pub struct ApplicationQuery {
    pub status: Option<String>,
}

#[utoipa::path(
    post,
    path = "/api/podcast/apply",
    request_body = ApplicationRequest,
    responses(
        (status = 201, description = "Application received"),
        (status = 400, description = "Invalid application")
    )
)]
pub async fn apply(
    State(db): State<DatabaseConnection>,
    Json(request): Json<ApplicationRequest>,
) -> impl IntoResponse {
    match podcast_service::apply(&db, request).await {
        Ok(application) => (
            StatusCode::CREATED,
            Json(json!({ "message": "Application received", "id": application.id })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn list_applications(
    State(db): State<DatabaseConnection>,
    Query(params): Query<ApplicationQuery>,
) -> impl IntoResponse {
    match podcast_service::list(&db, params.status).await {
        Ok(applications) => (
            StatusCode::OK,
            Json(json!({ "total": applications.len(), "applications": applications })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn review_application(
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
    Json(request): Json<ReviewRequest>,
) -> impl IntoResponse {
    match podcast_service::review(&db, id, request).await {
        Ok(application) => {
            (StatusCode::OK, Json(json!({ "application": application }))).into_response()
        }
        Err(e) => e.into_response(),
    }
}

pub async fn delete_application(
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
) -> impl IntoResponse {
    match podcast_service::delete(&db, id).await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "message": "Application deleted" })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}
