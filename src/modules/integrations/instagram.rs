use async_trait::async_trait;
use serde::Deserialize;

use super::oauth::Provider;
use super::{AccountProfile, PublishRequest, PublishedPost, SocialPublisher, id_to_string, read_json};
use crate::domain::DomainError;

const GRAPH_VERSION: &str = "v21.0";

#[derive(Debug, Deserialize)]
struct Me {
    user_id: Option<serde_json::Value>,
    id: Option<serde_json::Value>,
    username: Option<String>,
}

#[derive(Debug, Deserialize)]
struct IdResponse {
    id: serde_json::Value,
}

pub async fn fetch_profile(
    http: &reqwest::Client,
    graph_base: &str,
    access_token: &str,
) -> Result<AccountProfile, DomainError> {
    let resp = http
        .get(format!("{}/{}/me", graph_base, GRAPH_VERSION))
        .query(&[("fields", "user_id,username"), ("access_token", access_token)])
        .send()
        .await?;
    let me: Me = read_json(resp, "Instagram me").await?;

    let external_id = me
        .user_id
        .as_ref()
        .or(me.id.as_ref())
        .and_then(id_to_string)
        .ok_or_else(|| DomainError::external("Instagram did not return a user id"))?;

    Ok(AccountProfile {
        external_id,
        display_name: me.username.map(|u| format!("@{}", u)),
    })
}

/// Single-image posts via the two-step container flow
pub struct InstagramPublisher {
    http: reqwest::Client,
    base_url: String,
}

impl InstagramPublisher {
    pub fn new(http: reqwest::Client, base_url: String) -> Self {
        Self { http, base_url }
    }
}

#[async_trait]
impl SocialPublisher for InstagramPublisher {
    fn platform(&self) -> Provider {
        Provider::Instagram
    }

    async fn publish(&self, request: &PublishRequest<'_>) -> Result<PublishedPost, DomainError> {
        let image_url = request
            .media_urls
            .first()
            .ok_or_else(|| DomainError::validation("Instagram posts need an image"))?;

        let container_resp = self
            .http
            .post(format!(
                "{}/{}/{}/media",
                self.base_url, GRAPH_VERSION, request.account_id
            ))
            .form(&[
                ("image_url", image_url.as_str()),
                ("caption", request.text),
                ("access_token", request.access_token),
            ])
            .send()
            .await?;
        let container: IdResponse = read_json(container_resp, "Instagram media container").await?;
        let creation_id = id_to_string(&container.id)
            .ok_or_else(|| DomainError::external("Instagram returned no container id"))?;

        let publish_resp = self
            .http
            .post(format!(
                "{}/{}/{}/media_publish",
                self.base_url, GRAPH_VERSION, request.account_id
            ))
            .form(&[
                ("creation_id", creation_id.as_str()),
                ("access_token", request.access_token),
            ])
            .send()
            .await?;
        let published: IdResponse = read_json(publish_resp, "Instagram media_publish").await?;

        Ok(PublishedPost {
            external_id: id_to_string(&published.id)
                .ok_or_else(|| DomainError::external("Instagram returned no media id"))?,
            url: None,
        })
    }
}
