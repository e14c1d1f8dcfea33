//! Third-party API clients.
//!
//! Each client takes the shared `reqwest::Client` and the configured
//! `Endpoints`, so tests can point them at a mock server.

pub mod google;
pub mod instagram;
pub mod linkedin;
pub mod llm;
pub mod oauth;
pub mod sender;
pub mod threads;
pub mod twitter;

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use crate::domain::DomainError;
use crate::infrastructure::config::Endpoints;
use oauth::Provider;

/// Identity of the account that granted access
#[derive(Debug, Clone, PartialEq)]
pub struct AccountProfile {
    pub external_id: String,
    pub display_name: Option<String>,
}

/// Everything a platform needs to publish one post
#[derive(Debug, Clone)]
pub struct PublishRequest<'a> {
    pub account_id: &'a str,
    pub access_token: &'a str,
    pub text: &'a str,
    pub media_urls: &'a [String],
}

#[derive(Debug, Clone, PartialEq)]
pub struct PublishedPost {
    pub external_id: String,
    pub url: Option<String>,
}

#[async_trait]
pub trait SocialPublisher: Send + Sync {
    fn platform(&self) -> Provider;

    async fn publish(&self, request: &PublishRequest<'_>) -> Result<PublishedPost, DomainError>;
}

/// Publisher for a platform, `None` for providers that only grant API access
pub fn publisher_for(
    provider: Provider,
    http: &reqwest::Client,
    endpoints: &Endpoints,
) -> Option<Box<dyn SocialPublisher>> {
    match provider {
        Provider::LinkedIn => Some(Box::new(linkedin::LinkedInPublisher::new(
            http.clone(),
            endpoints.linkedin_api.clone(),
        ))),
        Provider::Twitter => Some(Box::new(twitter::TwitterPublisher::new(
            http.clone(),
            endpoints.twitter_api.clone(),
        ))),
        Provider::Instagram => Some(Box::new(instagram::InstagramPublisher::new(
            http.clone(),
            endpoints.instagram_graph.clone(),
        ))),
        Provider::Threads => Some(Box::new(threads::ThreadsPublisher::new(
            http.clone(),
            endpoints.threads_graph.clone(),
        ))),
        Provider::Google => None,
    }
}

/// Identity lookup right after the OAuth code exchange
pub async fn fetch_profile(
    provider: Provider,
    http: &reqwest::Client,
    endpoints: &Endpoints,
    access_token: &str,
) -> Result<AccountProfile, DomainError> {
    match provider {
        Provider::Google => google::fetch_profile(http, &endpoints.google_api, access_token).await,
        Provider::LinkedIn => {
            linkedin::fetch_profile(http, &endpoints.linkedin_api, access_token).await
        }
        Provider::Twitter => twitter::fetch_profile(http, &endpoints.twitter_api, access_token).await,
        Provider::Instagram => {
            instagram::fetch_profile(http, &endpoints.instagram_graph, access_token).await
        }
        Provider::Threads => {
            threads::fetch_profile(http, &endpoints.threads_graph, access_token).await
        }
    }
}

/// Decode a JSON body, turning non-2xx statuses into `DomainError::External`
pub(crate) async fn read_json<T: DeserializeOwned>(
    resp: reqwest::Response,
    what: &str,
) -> Result<T, DomainError> {
    let status = resp.status();
    let body = resp.text().await?;

    if !status.is_success() {
        tracing::warn!("{} returned {}: {}", what, status, body);
        return Err(DomainError::External(format!(
            "{} returned {}: {}",
            what,
            status,
            short(&body)
        )));
    }

    serde_json::from_str(&body)
        .map_err(|e| DomainError::External(format!("{} sent an unexpected response: {}", what, e)))
}

/// Like `read_json`, but a successful empty body yields `None`
pub(crate) async fn read_optional_json<T: DeserializeOwned>(
    resp: reqwest::Response,
    what: &str,
) -> Result<Option<T>, DomainError> {
    let status = resp.status();
    let body = resp.text().await?;

    if !status.is_success() {
        tracing::warn!("{} returned {}: {}", what, status, body);
        return Err(DomainError::External(format!(
            "{} returned {}: {}",
            what,
            status,
            short(&body)
        )));
    }
    if body.trim().is_empty() {
        return Ok(None);
    }

    serde_json::from_str(&body)
        .map(Some)
        .map_err(|e| DomainError::External(format!("{} sent an unexpected response: {}", what, e)))
}

/// Same as `read_json` for endpoints whose body we ignore
pub(crate) async fn expect_success(resp: reqwest::Response, what: &str) -> Result<(), DomainError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(());
    }
    let body = resp.text().await.unwrap_or_default();
    tracing::warn!("{} returned {}: {}", what, status, body);
    Err(DomainError::External(format!(
        "{} returned {}: {}",
        what,
        status,
        short(&body)
    )))
}

fn short(body: &str) -> String {
    body.chars().take(300).collect()
}

/// Provider ids come back as numbers on some APIs and strings on others
pub(crate) fn id_to_string(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
