//! AI integrations (stored provider keys) and content generation

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait, sea_query::Expr,
};
use serde::{Deserialize, Serialize};

use crate::domain::DomainError;
use crate::infrastructure::AppState;
use crate::infrastructure::vault::TokenVault;
use crate::models::ai_integration::{self, ActiveModel, Entity as AiIntegration};
use crate::modules::integrations::llm::{self, CompletionRequest, LlmProvider};
use crate::modules::integrations::oauth::Provider;
use crate::utils::text::{mask_secret, truncate_chars};
use crate::utils::time::now_ts;

#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
pub struct IntegrationInput {
    pub name: String,
    pub provider: String,
    /// Required on create; omitted on update keeps the stored key
    pub api_key: Option<String>,
    pub model_name: Option<String>,
    pub is_default: Option<bool>,
}

/// Integration as shown to the admin; the key is masked
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct IntegrationView {
    pub id: i32,
    pub name: String,
    pub provider: String,
    pub model_name: String,
    pub is_default: bool,
    pub api_key_hint: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum GenerateKind {
    BlogDraft,
    BlogIdeas,
    SocialCaption,
    Newsletter,
    SeoMeta,
}

#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
pub struct GenerateRequest {
    pub kind: GenerateKind,
    pub topic: String,
    pub tone: Option<String>,
    pub platform: Option<String>,
    pub integration_id: Option<i32>,
}

#[derive(Debug, Clone, Default, Serialize, utoipa::ToSchema)]
pub struct GenerateResponse {
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ideas: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta_description: Option<String>,
    pub integration: String,
    pub model_name: String,
}

fn default_model(provider: LlmProvider) -> &'static str {
    match provider {
        LlmProvider::OpenAi => "gpt-4o-mini",
        LlmProvider::Anthropic => "claude-3-5-haiku-latest",
    }
}

fn to_view(model: ai_integration::Model, vault: &TokenVault) -> IntegrationView {
    let api_key_hint = vault
        .decrypt(&model.api_key)
        .map(|k| mask_secret(&k))
        .unwrap_or_else(|_| "****".to_string());
    IntegrationView {
        id: model.id,
        name: model.name,
        provider: model.provider,
        model_name: model.model_name,
        is_default: model.is_default,
        api_key_hint,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

pub async fn list(state: &AppState) -> Result<Vec<IntegrationView>, DomainError> {
    let all = AiIntegration::find()
        .order_by_desc(ai_integration::Column::IsDefault)
        .order_by_asc(ai_integration::Column::Id)
        .all(state.db())
        .await?;
    Ok(all.into_iter().map(|m| to_view(m, &state.vault)).collect())
}

async fn get(db: &DatabaseConnection, id: i32) -> Result<ai_integration::Model, DomainError> {
    AiIntegration::find_by_id(id)
        .one(db)
        .await?
        .ok_or(DomainError::NotFound)
}

async fn clear_default<C: sea_orm::ConnectionTrait>(db: &C) -> Result<(), DomainError> {
    AiIntegration::update_many()
        .col_expr(ai_integration::Column::IsDefault, Expr::value(false))
        .filter(ai_integration::Column::IsDefault.eq(true))
        .exec(db)
        .await?;
    Ok(())
}

pub async fn create(
    state: &AppState,
    input: IntegrationInput,
) -> Result<IntegrationView, DomainError> {
    let provider: LlmProvider = input.provider.parse()?;
    let name = input.name.trim().to_string();
    if name.is_empty() {
        return Err(DomainError::validation("name is required"));
    }
    let api_key = input
        .api_key
        .as_deref()
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .ok_or_else(|| DomainError::validation("api_key is required"))?;
    let model_name = input
        .model_name
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| default_model(provider).to_string());

    let txn = state.db().begin().await?;
    let first = AiIntegration::find().one(&txn).await?.is_none();
    let is_default = first || input.is_default.unwrap_or(false);
    if is_default {
        clear_default(&txn).await?;
    }

    let now = now_ts();
    let model = ActiveModel {
        name: Set(name),
        provider: Set(provider.as_str().to_string()),
        api_key: Set(state.vault.encrypt(api_key)?),
        model_name: Set(model_name),
        is_default: Set(is_default),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;
    txn.commit().await?;

    tracing::info!("🤖 AI integration '{}' ({}) added", model.name, model.provider);
    Ok(to_view(model, &state.vault))
}

pub async fn update(
    state: &AppState,
    id: i32,
    input: IntegrationInput,
) -> Result<IntegrationView, DomainError> {
    let provider: LlmProvider = input.provider.parse()?;
    let existing = get(state.db(), id).await?;
    if input.name.trim().is_empty() {
        return Err(DomainError::validation("name is required"));
    }

    let txn = state.db().begin().await?;
    let mut active: ActiveModel = existing.into();
    active.name = Set(input.name.trim().to_string());
    active.provider = Set(provider.as_str().to_string());
    if let Some(key) = input.api_key.as_deref().map(str::trim).filter(|k| !k.is_empty()) {
        active.api_key = Set(state.vault.encrypt(key)?);
    }
    if let Some(model_name) = input.model_name.filter(|m| !m.trim().is_empty()) {
        active.model_name = Set(model_name);
    }
    if input.is_default == Some(true) {
        clear_default(&txn).await?;
        active.is_default = Set(true);
    }
    active.updated_at = Set(now_ts());
    let model = active.update(&txn).await?;
    txn.commit().await?;

    Ok(to_view(model, &state.vault))
}

pub async fn set_default(state: &AppState, id: i32) -> Result<IntegrationView, DomainError> {
    let existing = get(state.db(), id).await?;
    let txn = state.db().begin().await?;
    clear_default(&txn).await?;
    let mut active: ActiveModel = existing.into();
    active.is_default = Set(true);
    active.updated_at = Set(now_ts());
    let model = active.update(&txn).await?;
    txn.commit().await?;
    Ok(to_view(model, &state.vault))
}

/// Delete; when the default goes, the oldest remaining integration takes over
pub async fn delete(db: &DatabaseConnection, id: i32) -> Result<(), DomainError> {
    let existing = get(db, id).await?;
    let txn = db.begin().await?;
    AiIntegration::delete_by_id(id).exec(&txn).await?;

    if existing.is_default
        && let Some(next) = AiIntegration::find()
            .order_by_asc(ai_integration::Column::Id)
            .one(&txn)
            .await?
    {
        let mut active: ActiveModel = next.into();
        active.is_default = Set(true);
        active.update(&txn).await?;
    }
    txn.commit().await?;
    Ok(())
}

/// The requested integration, or the default one
async fn pick(
    db: &DatabaseConnection,
    id: Option<i32>,
) -> Result<ai_integration::Model, DomainError> {
    let found = match id {
        Some(id) => AiIntegration::find_by_id(id).one(db).await?,
        None => {
            AiIntegration::find()
                .order_by_desc(ai_integration::Column::IsDefault)
                .order_by_asc(ai_integration::Column::Id)
                .one(db)
                .await?
        }
    };
    found.ok_or_else(|| DomainError::NotConfigured("no AI integration configured".to_string()))
}

const SYSTEM_PROMPT: &str = "You are a writing assistant for a personal brand. \
Write in a clear, warm, first-person voice. Return only the requested text, without preamble.";

/// Prompt and token budget for a generation kind
pub fn build_prompt(request: &GenerateRequest) -> Result<CompletionRequest, DomainError> {
    let topic = request.topic.trim();
    if topic.is_empty() {
        return Err(DomainError::validation("topic is required"));
    }
    let tone = request
        .tone
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or("friendly and professional");

    let (prompt, max_tokens) = match request.kind {
        GenerateKind::BlogDraft => (
            format!(
                "Write a blog post about \"{}\" in a {} tone. Use Markdown with a title, \
                 short sections with headings and a closing call to action. 600 to 900 words.",
                topic, tone
            ),
            2000,
        ),
        GenerateKind::BlogIdeas => (
            format!(
                "Suggest 8 blog post titles about \"{}\" in a {} tone. \
                 One title per line, no numbering, no commentary.",
                topic, tone
            ),
            400,
        ),
        GenerateKind::SocialCaption => {
            let provider: Provider = request
                .platform
                .as_deref()
                .ok_or_else(|| DomainError::validation("platform is required for captions"))?
                .parse()?;
            let max = provider.max_chars().ok_or_else(|| {
                DomainError::validation(format!("{} is not a publishing platform", provider))
            })?;
            (
                format!(
                    "Write a {} post about \"{}\" in a {} tone. Stay under {} characters \
                     including hashtags. Plain text only.",
                    provider, topic, tone, max
                ),
                600,
            )
        }
        GenerateKind::Newsletter => (
            format!(
                "Write a newsletter issue about \"{}\" in a {} tone. Start with a one-line \
                 greeting, then three short sections and a sign-off. Plain HTML paragraphs.",
                topic, tone
            ),
            1500,
        ),
        GenerateKind::SeoMeta => (
            format!(
                "Write SEO metadata for a page about \"{}\". Answer with exactly two lines:\n\
                 Title: <at most 60 characters>\nDescription: <at most 155 characters>",
                topic
            ),
            200,
        ),
    };

    Ok(CompletionRequest {
        system: SYSTEM_PROMPT.to_string(),
        prompt,
        max_tokens,
        temperature: 0.7,
    })
}

/// One idea per non-empty line, list markers stripped
pub fn parse_ideas(text: &str) -> Vec<String> {
    text.lines()
        .map(|line| {
            let line = line.trim();
            // "1." / "2)" numbering, but keep titles like "10 ways to..."
            let digits = line.trim_start_matches(|c: char| c.is_ascii_digit());
            let line = match digits.strip_prefix(['.', ')']) {
                Some(rest) if digits.len() < line.len() => rest,
                _ => line,
            };
            let line = line.trim_start_matches(['-', '*', '•']);
            line.trim().trim_matches('"').trim().to_string()
        })
        .filter(|line| !line.is_empty())
        .collect()
}

/// Values of the `Title:` and `Description:` lines
pub fn parse_seo_meta(text: &str) -> (Option<String>, Option<String>) {
    let mut title = None;
    let mut description = None;
    for line in text.lines() {
        let line = line.replace('*', "");
        let line = line.trim().trim_start_matches('-').trim();
        let lower = line.to_lowercase();
        if lower.starts_with("title:") {
            title = Some(line["title:".len()..].trim().to_string());
        } else if lower.starts_with("description:") {
            description = Some(line["description:".len()..].trim().to_string());
        }
    }
    (
        title.filter(|t| !t.is_empty()),
        description.filter(|d| !d.is_empty()),
    )
}

pub async fn generate(
    state: &AppState,
    request: GenerateRequest,
) -> Result<GenerateResponse, DomainError> {
    let completion = build_prompt(&request)?;
    let integration = pick(state.db(), request.integration_id).await?;
    let provider: LlmProvider = integration.provider.parse()?;
    let api_key = state.vault.decrypt(&integration.api_key)?;

    let client = llm::client_for(
        provider,
        state.http.clone(),
        &state.config.endpoints,
        api_key,
        integration.model_name.clone(),
    );
    let text = client.complete(&completion).await?;
    tracing::info!(
        "🤖 Generated {:?} with '{}' ({} chars)",
        request.kind,
        integration.name,
        text.chars().count()
    );

    let mut response = GenerateResponse {
        integration: integration.name,
        model_name: integration.model_name,
        ..Default::default()
    };

    match request.kind {
        GenerateKind::BlogIdeas => {
            response.ideas = Some(parse_ideas(&text));
            response.content = text;
        }
        GenerateKind::SeoMeta => {
            let (title, description) = parse_seo_meta(&text);
            response.meta_title = title;
            response.meta_description = description;
            response.content = text;
        }
        GenerateKind::SocialCaption => {
            // build_prompt already checked the platform
            let max = request
                .platform
                .as_deref()
                .and_then(|p| p.parse::<Provider>().ok())
                .and_then(|p| p.max_chars())
                .unwrap_or(usize::MAX);
            response.content = truncate_chars(&text, max);
        }
        GenerateKind::BlogDraft | GenerateKind::Newsletter => response.content = text,
    }

    Ok(response)
}
