//! Text generation against hosted LLM providers (HTTP direct, no SDK).

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::fmt;
use std::str::FromStr;

use super::read_json;
use crate::domain::DomainError;
use crate::infrastructure::config::Endpoints;

const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmProvider {
    OpenAi,
    Anthropic,
}

impl LlmProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            LlmProvider::OpenAi => "openai",
            LlmProvider::Anthropic => "anthropic",
        }
    }
}

impl fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LlmProvider {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(LlmProvider::OpenAi),
            "anthropic" => Ok(LlmProvider::Anthropic),
            other => Err(DomainError::Validation(format!(
                "Unknown AI provider '{}' (expected openai or anthropic)",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub system: String,
    pub prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, DomainError>;
}

pub fn client_for(
    provider: LlmProvider,
    http: reqwest::Client,
    endpoints: &Endpoints,
    api_key: String,
    model: String,
) -> Box<dyn LlmClient> {
    match provider {
        LlmProvider::OpenAi => Box::new(OpenAiClient {
            http,
            base_url: endpoints.openai_api.clone(),
            api_key,
            model,
        }),
        LlmProvider::Anthropic => Box::new(AnthropicClient {
            http,
            base_url: endpoints.anthropic_api.clone(),
            api_key,
            model,
        }),
    }
}

pub struct OpenAiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, DomainError> {
        // o1/gpt-5 style models take max_completion_tokens and no temperature
        let is_reasoning_model = ["o1", "o3", "o4", "gpt-5"]
            .iter()
            .any(|prefix| self.model.starts_with(prefix));
        let mut body = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": request.system },
                { "role": "user", "content": request.prompt }
            ],
        });
        if is_reasoning_model {
            body["max_completion_tokens"] = json!(request.max_tokens);
        } else {
            body["max_tokens"] = json!(request.max_tokens);
            body["temperature"] = json!(request.temperature);
        }

        let resp = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;
        let completion: ChatCompletion = read_json(resp, "OpenAI chat completions").await?;

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .ok_or_else(|| DomainError::external("OpenAI returned an empty completion"))
    }
}

pub struct AnthropicClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    text: Option<String>,
}

#[async_trait]
impl LlmClient for AnthropicClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, DomainError> {
        let body = json!({
            "model": self.model,
            "max_tokens": request.max_tokens,
            "temperature": request.temperature,
            "system": request.system,
            "messages": [{ "role": "user", "content": request.prompt }],
        });

        let resp = self
            .http
            .post(format!("{}/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await?;
        let message: MessagesResponse = read_json(resp, "Anthropic messages").await?;

        let text: String = message
            .content
            .into_iter()
            .filter(|b| b.kind == "text")
            .filter_map(|b| b.text)
            .collect::<Vec<_>>()
            .join("");

        let text = text.trim().to_string();
        if text.is_empty() {
            return Err(DomainError::external("Anthropic returned an empty message"));
        }
        Ok(text)
    }
}
