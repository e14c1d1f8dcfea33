//! Google account identity and the Gmail REST API.

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use serde::Deserialize;
use serde_json::json;

use super::{AccountProfile, expect_success, read_json};
use crate::domain::DomainError;

#[derive(Debug, Deserialize)]
struct UserInfo {
    id: String,
    email: Option<String>,
    name: Option<String>,
}

pub async fn fetch_profile(
    http: &reqwest::Client,
    api_base: &str,
    access_token: &str,
) -> Result<AccountProfile, DomainError> {
    let resp = http
        .get(format!("{}/oauth2/v2/userinfo", api_base))
        .bearer_auth(access_token)
        .send()
        .await?;
    let info: UserInfo = read_json(resp, "Google userinfo").await?;

    Ok(AccountProfile {
        external_id: info.id,
        display_name: info.email.or(info.name),
    })
}

#[derive(Debug, Deserialize)]
struct MessageList {
    #[serde(default)]
    messages: Vec<MessageRef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessageRef {
    pub id: String,
    #[serde(rename = "threadId")]
    pub thread_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawMessage {
    id: String,
    #[serde(rename = "threadId")]
    thread_id: Option<String>,
    #[serde(rename = "labelIds", default)]
    label_ids: Vec<String>,
    snippet: Option<String>,
    #[serde(rename = "internalDate")]
    internal_date: Option<String>,
    payload: Option<RawPayload>,
}

#[derive(Debug, Deserialize)]
struct RawPayload {
    #[serde(default)]
    headers: Vec<RawHeader>,
}

#[derive(Debug, Deserialize)]
struct RawHeader {
    name: String,
    value: String,
}

/// Message metadata as we store it
#[derive(Debug, Clone, PartialEq)]
pub struct GmailMessage {
    pub id: String,
    pub thread_id: Option<String>,
    pub from: String,
    pub subject: String,
    pub snippet: Option<String>,
    /// Milliseconds since the epoch
    pub internal_date_ms: Option<i64>,
    pub unread: bool,
}

impl From<RawMessage> for GmailMessage {
    fn from(raw: RawMessage) -> Self {
        let headers = raw.payload.map(|p| p.headers).unwrap_or_default();
        let header = |name: &str| {
            headers
                .iter()
                .find(|h| h.name.eq_ignore_ascii_case(name))
                .map(|h| h.value.clone())
        };

        Self {
            from: header("From").unwrap_or_else(|| "(unknown sender)".to_string()),
            subject: header("Subject").unwrap_or_else(|| "(no subject)".to_string()),
            id: raw.id,
            thread_id: raw.thread_id,
            snippet: raw.snippet,
            internal_date_ms: raw.internal_date.and_then(|d| d.parse().ok()),
            unread: raw.label_ids.iter().any(|l| l == "UNREAD"),
        }
    }
}

pub struct GmailClient {
    http: reqwest::Client,
    base_url: String,
    access_token: String,
}

impl GmailClient {
    pub fn new(http: reqwest::Client, base_url: &str, access_token: String) -> Self {
        Self {
            http,
            base_url: format!("{}/gmail/v1/users/me", base_url),
            access_token,
        }
    }

    pub async fn list_inbox(&self, max_results: u32) -> Result<Vec<MessageRef>, DomainError> {
        let resp = self
            .http
            .get(format!("{}/messages", self.base_url))
            .bearer_auth(&self.access_token)
            .query(&[
                ("labelIds", "INBOX".to_string()),
                ("maxResults", max_results.to_string()),
            ])
            .send()
            .await?;
        let list: MessageList = read_json(resp, "Gmail list").await?;
        Ok(list.messages)
    }

    pub async fn get_metadata(&self, id: &str) -> Result<GmailMessage, DomainError> {
        let resp = self
            .http
            .get(format!("{}/messages/{}", self.base_url, id))
            .bearer_auth(&self.access_token)
            .query(&[
                ("format", "metadata"),
                ("metadataHeaders", "From"),
                ("metadataHeaders", "Subject"),
                ("metadataHeaders", "Date"),
            ])
            .send()
            .await?;
        let raw: RawMessage = read_json(resp, "Gmail get").await?;
        Ok(raw.into())
    }

    pub async fn mark_read(&self, id: &str) -> Result<(), DomainError> {
        let resp = self
            .http
            .post(format!("{}/messages/{}/modify", self.base_url, id))
            .bearer_auth(&self.access_token)
            .json(&json!({ "removeLabelIds": ["UNREAD"] }))
            .send()
            .await?;
        expect_success(resp, "Gmail modify").await
    }

    /// Send a plain-text message, threaded when `thread_id` is given
    pub async fn send(
        &self,
        to: &str,
        subject: &str,
        body: &str,
        thread_id: Option<&str>,
    ) -> Result<String, DomainError> {
        let raw = URL_SAFE_NO_PAD.encode(build_rfc822(to, subject, body));
        let mut payload = json!({ "raw": raw });
        if let Some(thread) = thread_id {
            payload["threadId"] = json!(thread);
        }

        let resp = self
            .http
            .post(format!("{}/messages/send", self.base_url))
            .bearer_auth(&self.access_token)
            .json(&payload)
            .send()
            .await?;
        let sent: MessageRef = read_json(resp, "Gmail send").await?;
        Ok(sent.id)
    }
}

/// Minimal RFC 822 message; header values are stripped of line breaks
pub fn build_rfc822(to: &str, subject: &str, body: &str) -> String {
    let clean = |v: &str| v.replace(['\r', '\n'], " ");
    format!(
        "To: {}\r\nSubject: {}\r\nMIME-Version: 1.0\r\nContent-Type: text/plain; charset=\"UTF-8\"\r\n\r\n{}",
        clean(to),
        clean(subject),
        body
    )
}
