use axum::{
    Json,
    extract::State,
    http::{StatusCode, header},
    response::IntoResponse,
};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use serde_json::json;

use crate::infrastructure::auth::{Claims, clear_session_cookie, session_cookie};
use crate::services::auth_service;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct Credentials {
    username: String,
    password: String,
}

#[utoipa::path(
    post,
    path = "/api/auth/setup",
    request_body = Credentials,
    responses(
        (status = 201, description = "Admin created"),
        (status = 409, description = "An admin already exists")
    )
)]
pub async fn setup(
    State(db): State<DatabaseConnection>,
    Json(payload): Json<Credentials>,
) -> impl IntoResponse {
    match auth_service::setup_admin(&db, &payload.username, &payload.password).await {
        Ok(user) => (
            StatusCode::CREATED,
            Json(json!({ "message": "Admin created", "user": user })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = Credentials,
    responses(
        (status = 200, description = "Session token, also set as cookie"),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(db): State<DatabaseConnection>,
    Json(payload): Json<Credentials>,
) -> impl IntoResponse {
    tracing::info!("Login attempt for user: {}", payload.username);

    match auth_service::login(&db, &payload.username, &payload.password).await {
        Ok(token) => (
            StatusCode::OK,
            [(header::SET_COOKIE, session_cookie(&token))],
            Json(json!({ "token": token })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn logout() -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::SET_COOKIE, clear_session_cookie())],
        Json(json!({ "message": "Logged out" })),
    )
}

pub async fn me(claims: Claims) -> impl IntoResponse {
    Json(json!({ "username": claims.sub, "role": claims.role, "exp": claims.exp }))
}
