use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;

use crate::api::blog::ScheduleRequest;
use crate::domain::{SocialPostFilter, SocialPostInput};
use crate::infrastructure::AppState;
use crate::services::social_service::{self, FromBlogRequest};

#[derive(Debug, Deserialize)]
pub struct SocialPostQuery {
    pub platform: Option<String>,
    pub status: Option<String>,
}

pub async fn list_posts(
    State(state): State<AppState>,
    Query(params): Query<SocialPostQuery>,
) -> impl IntoResponse {
    let filter = SocialPostFilter {
        platform: params.platform,
        status: params.status,
    };
    match social_service::list(&state, filter).await {
        Ok(posts) => (
            StatusCode::OK,
            Json(json!({ "total": posts.len(), "posts": posts })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn get_post(State(state): State<AppState>, Path(id): Path<i32>) -> impl IntoResponse {
    match social_service::get(&state, id).await {
        Ok(post) => (StatusCode::OK, Json(json!(post))).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn create_post(
    State(state): State<AppState>,
    Json(input): Json<SocialPostInput>,
) -> impl IntoResponse {
    match social_service::create(&state, input).await {
        Ok(post) => (StatusCode::CREATED, Json(json!({ "post": post }))).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn update_post(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(input): Json<SocialPostInput>,
) -> impl IntoResponse {
    match social_service::update(&state, id, input).await {
        Ok(post) => (StatusCode::OK, Json(json!({ "post": post }))).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn delete_post(State(state): State<AppState>, Path(id): Path<i32>) -> impl IntoResponse {
    match social_service::delete(&state, id).await {
        Ok(()) => (StatusCode::OK, Json(json!({ "message": "Post deleted" }))).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn schedule_post(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<ScheduleRequest>,
) -> impl IntoResponse {
    match social_service::schedule(&state, id, &payload.scheduled_at).await {
        Ok(post) => (StatusCode::OK, Json(json!({ "post": post }))).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Publish immediately; the post row carries the outcome
pub async fn publish_post(State(state): State<AppState>, Path(id): Path<i32>) -> impl IntoResponse {
    match social_service::publish_now(&state, id).await {
        Ok(post) => (StatusCode::OK, Json(json!({ "post": post }))).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn retry_post(State(state): State<AppState>, Path(id): Path<i32>) -> impl IntoResponse {
    match social_service::retry(&state, id).await {
        Ok(post) => (StatusCode::OK, Json(json!({ "post": post }))).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn from_blog(
    State(state): State<AppState>,
    Json(request): Json<FromBlogRequest>,
) -> impl IntoResponse {
    match social_service::from_blog(&state, request).await {
        Ok(posts) => (
            StatusCode::CREATED,
            Json(json!({ "total": posts.len(), "posts": posts })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}
