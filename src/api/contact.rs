use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use serde_json::json;

use crate::infrastructure::AppState;
use crate::services::contact_service::{self, ContactRequest};

#[derive(Debug, Deserialize)]
pub struct ContactQuery {
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct ReplyRequest {
    pub body: String,
}

#[utoipa::path(
    post,
    path = "/api/contact",
    request_body = ContactRequest,
    responses(
        (status = 201, description = "Message received"),
        (status = 400, description = "Invalid name, email or message")
    )
)]
pub async fn submit(
    State(db): State<DatabaseConnection>,
    Json(payload): Json<ContactRequest>,
) -> impl IntoResponse {
    match contact_service::submit(&db, payload).await {
        Ok(msg) => (
            StatusCode::CREATED,
            Json(json!({ "message": "Thanks, your message was received", "id": msg.id })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn list_messages(
    State(db): State<DatabaseConnection>,
    Query(params): Query<ContactQuery>,
) -> impl IntoResponse {
    match contact_service::list(&db, params.status).await {
        Ok(messages) => (
            StatusCode::OK,
            Json(json!({ "total": messages.len(), "messages": messages })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn update_status(
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
    Json(payload): Json<StatusUpdate>,
) -> impl IntoResponse {
    match contact_service::set_status(&db, id, &payload.status).await {
        Ok(msg) => (StatusCode::OK, Json(json!({ "message": msg }))).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn delete_message(
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
) -> impl IntoResponse {
    match contact_service::delete(&db, id).await {
        Ok(()) => (StatusCode::OK, Json(json!({ "message": "Message deleted" }))).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn reply(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<ReplyRequest>,
) -> impl IntoResponse {
    match contact_service::reply(&state, id, &payload.body).await {
        Ok(msg) => (StatusCode::OK, Json(json!({ "message": msg }))).into_response(),
        Err(e) => e.into_response(),
    }
}
