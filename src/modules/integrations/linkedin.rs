use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use super::oauth::Provider;
use super::{
    AccountProfile, PublishRequest, PublishedPost, SocialPublisher, expect_success, read_json,
    read_optional_json,
};
use crate::domain::DomainError;

#[derive(Debug, Deserialize)]
struct UserInfo {
    sub: String,
    name: Option<String>,
}

pub async fn fetch_profile(
    http: &reqwest::Client,
    api_base: &str,
    access_token: &str,
) -> Result<AccountProfile, DomainError> {
    let resp = http
        .get(format!("{}/v2/userinfo", api_base))
        .bearer_auth(access_token)
        .send()
        .await?;
    let info: UserInfo = read_json(resp, "LinkedIn userinfo").await?;
    Ok(AccountProfile {
        external_id: info.sub,
        display_name: info.name,
    })
}

#[derive(Debug, Deserialize)]
struct UgcPostResponse {
    id: Option<String>,
}

pub struct LinkedInPublisher {
    http: reqwest::Client,
    base_url: String,
}

impl LinkedInPublisher {
    pub fn new(http: reqwest::Client, base_url: String) -> Self {
        Self { http, base_url }
    }
}

#[async_trait]
impl SocialPublisher for LinkedInPublisher {
    fn platform(&self) -> Provider {
        Provider::LinkedIn
    }

    async fn publish(&self, request: &PublishRequest<'_>) -> Result<PublishedPost, DomainError> {
        let body = json!({
            "author": format!("urn:li:person:{}", request.account_id),
            "lifecycleState": "PUBLISHED",
            "specificContent": {
                "com.linkedin.ugc.ShareContent": {
                    "shareCommentary": { "text": request.text },
                    "shareMediaCategory": "NONE"
                }
            },
            "visibility": {
                "com.linkedin.ugc.MemberNetworkVisibility": "PUBLIC"
            }
        });

        let resp = self
            .http
            .post(format!("{}/v2/ugcPosts", self.base_url))
            .bearer_auth(request.access_token)
            .header("X-Restli-Protocol-Version", "2.0.0")
            .json(&body)
            .send()
            .await?;

        // The post URN comes back in a header; the body is often empty
        let header_id = resp
            .headers()
            .get("x-restli-id")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());
        let urn = match header_id {
            Some(urn) => {
                expect_success(resp, "LinkedIn ugcPosts").await?;
                urn
            }
            None => read_optional_json::<UgcPostResponse>(resp, "LinkedIn ugcPosts")
                .await?
                .and_then(|p| p.id)
                .ok_or_else(|| DomainError::external("LinkedIn did not return a post id"))?,
        };

        Ok(PublishedPost {
            url: Some(format!("https://www.linkedin.com/feed/update/{}/", urn)),
            external_id: urn,
        })
    }
}
