use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use sea_orm::DatabaseConnection;
use serde_json::json;

use crate::infrastructure::AppState;
use crate::scheduler::{self, JobUpdate, processor};

pub async fn list_jobs(State(db): State<DatabaseConnection>) -> impl IntoResponse {
    match scheduler::list_jobs(&db).await {
        Ok(jobs) => (StatusCode::OK, Json(json!({ "jobs": jobs }))).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn update_job(
    State(db): State<DatabaseConnection>,
    Path(name): Path<String>,
    Json(update): Json<JobUpdate>,
) -> impl IntoResponse {
    match scheduler::update_job(&db, &name, update).await {
        Ok(job) => (StatusCode::OK, Json(json!({ "job": job }))).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn run_job(State(state): State<AppState>, Path(name): Path<String>) -> impl IntoResponse {
    match processor::run_now(&state, &name).await {
        Ok(job) => (StatusCode::OK, Json(json!({ "job": job }))).into_response(),
        Err(e) => e.into_response(),
    }
}
