use async_trait::async_trait;
use serde::Deserialize;

use super::oauth::Provider;
use super::{AccountProfile, PublishRequest, PublishedPost, SocialPublisher, id_to_string, read_json};
use crate::domain::DomainError;

const GRAPH_VERSION: &str = "v1.0";

#[derive(Debug, Deserialize)]
struct Me {
    id: serde_json::Value,
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
        .query(&[("fields", "id,username"), ("access_token", access_token)])
        .send()
        .await?;
    let me: Me = read_json(resp, "Threads me").await?;
    Ok(AccountProfile {
        external_id: id_to_string(&me.id)
            .ok_or_else(|| DomainError::external("Threads did not return a user id"))?,
        display_name: me.username.map(|u| format!("@{}", u)),
    })
}

/// Text or single-image threads via create-then-publish
pub struct ThreadsPublisher {
    http: reqwest::Client,
    base_url: String,
}

impl ThreadsPublisher {
    pub fn new(http: reqwest::Client, base_url: String) -> Self {
        Self { http, base_url }
    }
}

#[async_trait]
impl SocialPublisher for ThreadsPublisher {
    fn platform(&self) -> Provider {
        Provider::Threads
    }

    async fn publish(&self, request: &PublishRequest<'_>) -> Result<PublishedPost, DomainError> {
        let mut form: Vec<(&str, &str)> = vec![
            ("text", request.text),
            ("access_token", request.access_token),
        ];
        match request.media_urls.first() {
            Some(image) => {
                form.push(("media_type", "IMAGE"));
                form.push(("image_url", image.as_str()));
            }
            None => form.push(("media_type", "TEXT")),
        }

        let create_resp = self
            .http
            .post(format!(
                "{}/{}/{}/threads",
                self.base_url, GRAPH_VERSION, request.account_id
            ))
            .form(&form)
            .send()
            .await?;
        let container: IdResponse = read_json(create_resp, "Threads create").await?;
        let creation_id = id_to_string(&container.id)
            .ok_or_else(|| DomainError::external("Threads returned no container id"))?;

        let publish_resp = self
            .http
            .post(format!(
                "{}/{}/{}/threads_publish",
                self.base_url, GRAPH_VERSION, request.account_id
            ))
            .form(&[
                ("creation_id", creation_id.as_str()),
                ("access_token", request.access_token),
            ])
            .send()
            .await?;
        let published: IdResponse = read_json(publish_resp, "Threads publish").await?;

        Ok(PublishedPost {
            external_id: id_to_string(&published.id)
                .ok_or_else(|| DomainError::external("Threads returned no post id"))?,
            url: None,
        })
    }
}
