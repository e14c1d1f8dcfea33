use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use serde_json::json;

use crate::services::task_service::{self, TaskInput};

#[derive(Debug, Deserialize)]
pub struct TaskQuery {
    pub status: Option<String>,
}

pub async fn list_tasks(
    State(db): State<DatabaseConnection>,
    Query(params): Query<TaskQuery>,
) -> impl IntoResponse {
    match task_service::list(&db, params.status).await {
        Ok(tasks) => (
            StatusCode::OK,
            Json(json!({ "total": tasks.len(), "tasks": tasks })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn create_task(
    State(db): State<DatabaseConnection>,
    Json(input): Json<TaskInput>,
) -> impl IntoResponse {
    match task_service::create(&db, input).await {
        Ok(task) => (StatusCode::CREATED, Json(json!({ "task": task }))).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn update_task(
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
    Json(input): Json<TaskInput>,
) -> impl IntoResponse {
    match task_service::update(&db, id, input).await {
        Ok(task) => (StatusCode::OK, Json(json!({ "task": task }))).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn delete_task(
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
) -> impl IntoResponse {
    match task_service::delete(&db, id).await {
        Ok(()) => (StatusCode::OK, Json(json!({ "message": "Task deleted" }))).into_response(),
        Err(e) => e.into_response(),
    }
}
