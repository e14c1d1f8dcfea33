use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use super::oauth::Provider;
use super::{AccountProfile, PublishRequest, PublishedPost, SocialPublisher, read_json};
use crate::domain::DomainError;

#[derive(Debug, Deserialize)]
struct DataEnvelope<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
struct TwitterUser {
    id: String,
    username: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CreatedTweet {
    id: String,
}

pub async fn fetch_profile(
    http: &reqwest::Client,
    api_base: &str,
    access_token: &str,
) -> Result<AccountProfile, DomainError> {
    let resp = http
        .get(format!("{}/2/users/me", api_base))
        .bearer_auth(access_token)
        .send()
        .await?;
    let user: DataEnvelope<TwitterUser> = read_json(resp, "Twitter users/me").await?;
    Ok(AccountProfile {
        external_id: user.data.id,
        display_name: user.data.username.map(|u| format!("@{}", u)),
    })
}

/// Text-only tweets; media URLs are not uploaded
pub struct TwitterPublisher {
    http: reqwest::Client,
    base_url: String,
}

impl TwitterPublisher {
    pub fn new(http: reqwest::Client, base_url: String) -> Self {
        Self { http, base_url }
    }
}

#[async_trait]
impl SocialPublisher for TwitterPublisher {
    fn platform(&self) -> Provider {
        Provider::Twitter
    }

    async fn publish(&self, request: &PublishRequest<'_>) -> Result<PublishedPost, DomainError> {
        let resp = self
            .http
            .post(format!("{}/2/tweets", self.base_url))
            .bearer_auth(request.access_token)
            .json(&json!({ "text": request.text }))
            .send()
            .await?;
        let created: DataEnvelope<CreatedTweet> = read_json(resp, "Twitter create tweet").await?;

        Ok(PublishedPost {
            url: Some(format!("https://x.com/i/web/status/{}", created.data.id)),
            external_id: created.data.id,
        })
    }
}
