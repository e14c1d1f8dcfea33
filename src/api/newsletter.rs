use axum::{
    Json,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;

use crate::domain::{DomainError, SubscriberFilter};
use crate::infrastructure::AppState;
use crate::services::newsletter_service::{self, SubscribeRequest};

#[derive(Debug, Deserialize)]
pub struct UnsubscribeRequest {
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub struct SubscriberQuery {
    pub status: Option<String>,
    pub q: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

#[utoipa::path(
    post,
    path = "/api/newsletter/subscribe",
    request_body = SubscribeRequest,
    responses(
        (status = 201, description = "Subscribed"),
        (status = 400, description = "Invalid email")
    )
)]
pub async fn subscribe(
    State(state): State<AppState>,
    Json(payload): Json<SubscribeRequest>,
) -> impl IntoResponse {
    match newsletter_service::subscribe(&state, payload).await {
        Ok(sub) => (
            StatusCode::CREATED,
            Json(json!({ "message": "Subscribed", "email": sub.email })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

async fn unsubscribe_token(state: AppState, token: String) -> axum::response::Response {
    match newsletter_service::unsubscribe(&state, &token).await {
        Ok(sub) => (
            StatusCode::OK,
            Json(json!({ "message": "Unsubscribed", "email": sub.email })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn unsubscribe(
    State(state): State<AppState>,
    Json(payload): Json<UnsubscribeRequest>,
) -> impl IntoResponse {
    unsubscribe_token(state, payload.token).await
}

/// One-click link from emails
pub async fn unsubscribe_link(
    State(state): State<AppState>,
    Query(params): Query<UnsubscribeRequest>,
) -> impl IntoResponse {
    unsubscribe_token(state, params.token).await
}

// --- Admin ---

pub async fn list_subscribers(
    State(state): State<AppState>,
    Query(params): Query<SubscriberQuery>,
) -> impl IntoResponse {
    let filter = SubscriberFilter {
        status: params.status,
        query: params.q,
        page: params.page,
        limit: params.limit,
    };
    match newsletter_service::list(state.subscriber_repo.as_ref(), filter).await {
        Ok(page) => (
            StatusCode::OK,
            Json(json!({ "subscribers": page.subscribers, "total": page.total })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn delete_subscriber(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> impl IntoResponse {
    match newsletter_service::delete(&state, id).await {
        Ok(()) => (StatusCode::OK, Json(json!({ "message": "Subscriber deleted" }))).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn export_csv(State(state): State<AppState>) -> impl IntoResponse {
    match newsletter_service::export_csv(state.subscriber_repo.as_ref()).await {
        Ok(csv) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
                (
                    header::CONTENT_DISPOSITION,
                    "attachment; filename=\"subscribers.csv\"",
                ),
            ],
            csv,
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

/// Raw CSV in the request body
pub async fn import_csv(State(state): State<AppState>, body: String) -> impl IntoResponse {
    if body.trim().is_empty() {
        return DomainError::validation("CSV body is empty").into_response();
    }
    match newsletter_service::import_csv(state.subscriber_repo.as_ref(), &body).await {
        Ok(summary) => (StatusCode::OK, Json(json!(summary))).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn sync_all(State(state): State<AppState>) -> impl IntoResponse {
    match newsletter_service::sync_all(&state).await {
        Ok(summary) => (StatusCode::OK, Json(json!(summary))).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn list_groups(State(state): State<AppState>) -> impl IntoResponse {
    let Some(client) = newsletter_service::sender_client(&state) else {
        return DomainError::NotConfigured("Sender.net is not configured".to_string())
            .into_response();
    };
    match client.list_groups().await {
        Ok(groups) => (StatusCode::OK, Json(json!({ "groups": groups }))).into_response(),
        Err(e) => e.into_response(),
    }
}
