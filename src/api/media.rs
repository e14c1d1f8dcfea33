use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use serde_json::json;

use crate::services::media_service::{self, MediaInput};

#[derive(Debug, Deserialize)]
pub struct MediaQuery {
    pub kind: Option<String>,
}

pub async fn list_media(
    State(db): State<DatabaseConnection>,
    Query(params): Query<MediaQuery>,
) -> impl IntoResponse {
    match media_service::list(&db, params.kind).await {
        Ok(items) => (
            StatusCode::OK,
            Json(json!({ "total": items.len(), "media": items })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn create_media(
    State(db): State<DatabaseConnection>,
    Json(input): Json<MediaInput>,
) -> impl IntoResponse {
    match media_service::create(&db, input).await {
        Ok(item) => (StatusCode::CREATED, Json(json!({ "media": item }))).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn update_media(
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
    Json(input): Json<MediaInput>,
) -> impl IntoResponse {
    match media_service::update(&db, id, input).await {
        Ok(item) => (StatusCode::OK, Json(json!({ "media": item }))).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn delete_media(
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
) -> impl IntoResponse {
    match media_service::delete(&db, id).await {
        Ok(()) => (StatusCode::OK, Json(json!({ "message": "Media item deleted" }))).into_response(),
        Err(e) => e.into_response(),
    }
}
