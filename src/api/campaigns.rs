use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use sea_orm::DatabaseConnection;
use serde_json::json;

use crate::api::blog::ScheduleRequest;
use crate::infrastructure::AppState;
use crate::services::campaign_service::{self, CampaignInput};

pub async fn list_campaigns(State(db): State<DatabaseConnection>) -> impl IntoResponse {
    match campaign_service::list(&db).await {
        Ok(campaigns) => (
            StatusCode::OK,
            Json(json!({ "total": campaigns.len(), "campaigns": campaigns })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn get_campaign(
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
) -> impl IntoResponse {
    match campaign_service::get(&db, id).await {
        Ok(campaign) => (StatusCode::OK, Json(json!(campaign))).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn create_campaign(
    State(db): State<DatabaseConnection>,
    Json(input): Json<CampaignInput>,
) -> impl IntoResponse {
    match campaign_service::create(&db, input).await {
        Ok(campaign) => (StatusCode::CREATED, Json(json!({ "campaign": campaign }))).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn update_campaign(
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
    Json(input): Json<CampaignInput>,
) -> impl IntoResponse {
    match campaign_service::update(&db, id, input).await {
        Ok(campaign) => (StatusCode::OK, Json(json!({ "campaign": campaign }))).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn delete_campaign(
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
) -> impl IntoResponse {
    match campaign_service::delete(&db, id).await {
        Ok(()) => (StatusCode::OK, Json(json!({ "message": "Campaign deleted" }))).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn schedule_campaign(
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
    Json(payload): Json<ScheduleRequest>,
) -> impl IntoResponse {
    match campaign_service::schedule(&db, id, &payload.scheduled_at).await {
        Ok(campaign) => (StatusCode::OK, Json(json!({ "campaign": campaign }))).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn send_campaign(State(state): State<AppState>, Path(id): Path<i32>) -> impl IntoResponse {
    match campaign_service::send_now(&state, id).await {
        Ok(campaign) => (StatusCode::OK, Json(json!({ "campaign": campaign }))).into_response(),
        Err(e) => e.into_response(),
    }
}
