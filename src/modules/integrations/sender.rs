//! Sender.net email-marketing API (v2).

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{expect_success, id_to_string, read_json};
use crate::domain::DomainError;
use crate::infrastructure::config::SenderConfig;

#[derive(Debug, Deserialize)]
struct DataEnvelope<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
struct CreatedCampaign {
    id: serde_json::Value,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SenderGroup {
    pub id: String,
    pub title: String,
}

/// Campaign content as handed to Sender.net
#[derive(Debug, Clone)]
pub struct CampaignDraft<'a> {
    pub subject: &'a str,
    pub preheader: Option<&'a str>,
    pub content_html: &'a str,
}

pub struct SenderClient {
    http: reqwest::Client,
    base_url: String,
    api_key: SecretString,
    group_id: Option<String>,
    from_email: String,
    from_name: String,
}

impl SenderClient {
    pub fn new(http: reqwest::Client, base_url: &str, config: &SenderConfig) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            group_id: config.group_id.clone(),
            from_email: config.from_email.clone(),
            from_name: config.from_name.clone(),
        }
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.http
            .request(method, format!("{}{}", self.base_url, path))
            .bearer_auth(self.api_key.expose_secret())
            .header("Accept", "application/json")
    }

    fn groups(&self) -> Vec<String> {
        self.group_id.iter().cloned().collect()
    }

    /// Create or update a subscriber and attach the configured group
    pub async fn upsert_subscriber(
        &self,
        email: &str,
        name: Option<&str>,
    ) -> Result<(), DomainError> {
        let mut body = json!({
            "email": email,
            "groups": self.groups(),
            "trigger_automation": false
        });
        if let Some(name) = name {
            body["firstname"] = json!(name);
        }

        let resp = self
            .request(reqwest::Method::POST, "/subscribers")
            .json(&body)
            .send()
            .await?;
        expect_success(resp, "Sender.net add subscriber").await
    }

    pub async fn delete_subscriber(&self, email: &str) -> Result<(), DomainError> {
        let resp = self
            .request(reqwest::Method::DELETE, "/subscribers")
            .json(&json!({ "subscribers": [email] }))
            .send()
            .await?;
        expect_success(resp, "Sender.net delete subscriber").await
    }

    pub async fn list_groups(&self) -> Result<Vec<SenderGroup>, DomainError> {
        let resp = self.request(reqwest::Method::GET, "/groups").send().await?;
        let groups: DataEnvelope<Vec<SenderGroup>> = read_json(resp, "Sender.net groups").await?;
        Ok(groups.data)
    }

    /// Create the campaign and return Sender.net's id for it
    pub async fn create_campaign(&self, draft: &CampaignDraft<'_>) -> Result<String, DomainError> {
        let body = json!({
            "title": draft.subject,
            "subject": draft.subject,
            "preheader": draft.preheader.unwrap_or_default(),
            "from": self.from_name,
            "reply_to": self.from_email,
            "content_type": "html",
            "content": draft.content_html,
            "groups": self.groups(),
        });

        let resp = self
            .request(reqwest::Method::POST, "/campaigns")
            .json(&body)
            .send()
            .await?;
        let created: DataEnvelope<CreatedCampaign> =
            read_json(resp, "Sender.net create campaign").await?;

        id_to_string(&created.data.id)
            .ok_or_else(|| DomainError::external("Sender.net returned no campaign id"))
    }

    pub async fn send_campaign(&self, campaign_id: &str) -> Result<(), DomainError> {
        let resp = self
            .request(
                reqwest::Method::POST,
                &format!("/campaigns/{}/send", urlencoding::encode(campaign_id)),
            )
            .send()
            .await?;
        expect_success(resp, "Sender.net send campaign").await
    }
}
