use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect},
};
use serde::Deserialize;
use serde_json::json;

use crate::infrastructure::AppState;
use crate::modules::integrations::oauth::Provider;
use crate::services::oauth_service;

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

fn settings_url(state: &AppState, query: &str) -> String {
    format!(
        "{}/settings?{}",
        state.config.admin_app_url.trim_end_matches('/'),
        query
    )
}

pub async fn begin_authorization(
    State(state): State<AppState>,
    Path(provider): Path<String>,
) -> impl IntoResponse {
    let provider: Provider = match provider.parse() {
        Ok(p) => p,
        Err(e) => return e.into_response(),
    };
    match oauth_service::begin(&state, provider) {
        Ok(url) => (StatusCode::OK, Json(json!({ "authorize_url": url }))).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Provider redirect target; ends on the admin settings page
pub async fn callback(
    State(state): State<AppState>,
    Path(provider): Path<String>,
    Query(params): Query<CallbackQuery>,
) -> impl IntoResponse {
    let provider: Provider = match provider.parse() {
        Ok(p) => p,
        Err(e) => return e.into_response(),
    };

    let Some(csrf) = params.state.as_deref() else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "missing OAuth state" })),
        )
            .into_response();
    };
    let pending = match oauth_service::take_pending(&state, provider, csrf) {
        Ok(p) => p,
        Err(e) => return e.into_response(),
    };

    if let Some(error) = params.error {
        let reason = params.error_description.unwrap_or(error);
        tracing::warn!("{} authorization denied: {}", provider, reason);
        let query = format!("error={}", urlencoding::encode(&reason));
        return Redirect::to(&settings_url(&state, &query)).into_response();
    }

    let Some(code) = params.code.as_deref() else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "missing authorization code" })),
        )
            .into_response();
    };

    match oauth_service::complete(&state, provider, pending, code).await {
        Ok(account) => {
            tracing::info!("Connected {} account {}", provider, account.external_id);
            let query = format!("connected={}", provider.as_str());
            Redirect::to(&settings_url(&state, &query)).into_response()
        }
        Err(e) => {
            tracing::error!("{} authorization failed: {}", provider, e);
            let query = format!("error={}", urlencoding::encode(&e.to_string()));
            Redirect::to(&settings_url(&state, &query)).into_response()
        }
    }
}

pub async fn list_accounts(State(state): State<AppState>) -> impl IntoResponse {
    match oauth_service::list_accounts(state.db()).await {
        Ok(accounts) => {
            let configured: Vec<&str> = Provider::ALL
                .into_iter()
                .filter(|p| p.credentials(&state.config.oauth).is_some())
                .map(|p| p.as_str())
                .collect();
            (
                StatusCode::OK,
                Json(json!({ "accounts": accounts, "configured_providers": configured })),
            )
                .into_response()
        }
        Err(e) => e.into_response(),
    }
}

pub async fn disconnect(
    State(state): State<AppState>,
    Path(provider): Path<String>,
) -> impl IntoResponse {
    let provider: Provider = match provider.parse() {
        Ok(p) => p,
        Err(e) => return e.into_response(),
    };
    match oauth_service::disconnect(state.db(), provider).await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "message": format!("{} disconnected", provider) })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn refresh(
    State(state): State<AppState>,
    Path(provider): Path<String>,
) -> impl IntoResponse {
    let provider: Provider = match provider.parse() {
        Ok(p) => p,
        Err(e) => return e.into_response(),
    };
    let account = match oauth_service::find_account(state.db(), provider).await {
        Ok(Some(account)) => account,
        Ok(None) => return crate::domain::DomainError::NotFound.into_response(),
        Err(e) => return e.into_response(),
    };
    match oauth_service::refresh_account(&state, account).await {
        Ok(account) => (StatusCode::OK, Json(json!({ "account": account }))).into_response(),
        Err(e) => e.into_response(),
    }
}
