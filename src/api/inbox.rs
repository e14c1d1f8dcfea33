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
use crate::services::inbox_service::{self, DEFAULT_SYNC_SIZE};

#[derive(Debug, Deserialize)]
pub struct InboxQuery {
    #[serde(default)]
    pub unread: bool,
}

#[derive(Debug, Deserialize)]
pub struct SyncQuery {
    pub max: Option<u32>,
}

pub async fn sync_inbox(
    State(state): State<AppState>,
    Query(params): Query<SyncQuery>,
) -> impl IntoResponse {
    let max = params.max.unwrap_or(DEFAULT_SYNC_SIZE);
    match inbox_service::sync(&state, max).await {
        Ok(summary) => (StatusCode::OK, Json(json!(summary))).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn list_emails(
    State(db): State<DatabaseConnection>,
    Query(params): Query<InboxQuery>,
) -> impl IntoResponse {
    match inbox_service::list(&db, params.unread).await {
        Ok(emails) => (
            StatusCode::OK,
            Json(json!({ "total": emails.len(), "emails": emails })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn get_email(
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
) -> impl IntoResponse {
    match inbox_service::get(&db, id).await {
        Ok(email) => (StatusCode::OK, Json(json!(email))).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn mark_read(State(state): State<AppState>, Path(id): Path<i32>) -> impl IntoResponse {
    match inbox_service::mark_read(&state, id).await {
        Ok(email) => (StatusCode::OK, Json(json!({ "email": email }))).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn create_task(
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
) -> impl IntoResponse {
    match inbox_service::create_task(&db, id).await {
        Ok(task) => (StatusCode::CREATED, Json(json!({ "task": task }))).into_response(),
        Err(e) => e.into_response(),
    }
}
