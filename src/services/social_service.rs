//! Social post scheduling and publishing

use serde::{Deserialize, Serialize};

use crate::domain::{DomainError, PublishOutcome, SocialPostFilter, SocialPostInput};
use crate::infrastructure::AppState;
use crate::models::SocialPost;
use crate::models::social_post::{
    STATUS_DRAFT, STATUS_FAILED, STATUS_PUBLISHED, STATUS_PUBLISHING, STATUS_SCHEDULED,
};
use crate::modules::integrations::oauth::Provider;
use crate::modules::integrations::{PublishRequest, publisher_for};
use crate::services::oauth_service;
use crate::utils::text::{is_http_url, truncate_chars};
use crate::utils::time::{normalize_ts, now_ts};

#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
pub struct FromBlogRequest {
    pub blog_id: i32,
    pub platforms: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct PublishSummary {
    pub published: usize,
    pub failed: usize,
}

/// Text actually sent: the content, plus the link when it is not already in it
pub fn compose_text(content: &str, link_url: Option<&str>) -> String {
    match link_url.map(str::trim).filter(|l| !l.is_empty()) {
        Some(link) if !content.contains(link) => format!("{}\n\n{}", content.trim_end(), link),
        _ => content.to_string(),
    }
}

/// Check a post against its platform's rules and normalize it
pub fn validate(mut input: SocialPostInput) -> Result<SocialPostInput, DomainError> {
    let provider: Provider = input.platform.trim().to_lowercase().parse()?;
    if !provider.can_publish() {
        return Err(DomainError::validation(format!(
            "{} is not a publishing platform",
            provider
        )));
    }
    input.platform = provider.as_str().to_string();

    if input.content.trim().is_empty() {
        return Err(DomainError::validation("content is required"));
    }

    input.link_url = input.link_url.filter(|l| !l.trim().is_empty());
    if let Some(link) = &input.link_url
        && !is_http_url(link)
    {
        return Err(DomainError::validation("link_url must be an http(s) URL"));
    }
    if let Some(bad) = input.media_urls.iter().find(|u| !is_http_url(u)) {
        return Err(DomainError::validation(format!(
            "media URL '{}' must be http(s)",
            bad
        )));
    }

    let text = compose_text(&input.content, input.link_url.as_deref());
    if let Some(max) = provider.max_chars() {
        let len = text.chars().count();
        if len > max {
            return Err(DomainError::validation(format!(
                "{} posts are limited to {} characters ({} given)",
                provider, max, len
            )));
        }
    }

    match input.status.as_str() {
        STATUS_DRAFT => {}
        STATUS_SCHEDULED => {
            let at = input
                .scheduled_at
                .as_deref()
                .ok_or_else(|| DomainError::validation("scheduled_at is required to schedule"))?;
            input.scheduled_at = Some(normalize_ts(at).ok_or_else(|| {
                DomainError::validation("scheduled_at must be an RFC 3339 timestamp")
            })?);
            require_media(provider, &input.media_urls)?;
        }
        other => {
            return Err(DomainError::validation(format!(
                "posts can be saved as draft or scheduled, not '{}'",
                other
            )));
        }
    }

    Ok(input)
}

fn require_media(provider: Provider, media_urls: &[String]) -> Result<(), DomainError> {
    if provider.requires_media() && media_urls.is_empty() {
        return Err(DomainError::validation(format!(
            "{} posts need at least one media URL",
            provider
        )));
    }
    Ok(())
}

fn editable(post: &SocialPost) -> Result<(), DomainError> {
    if post.status == STATUS_PUBLISHED || post.status == STATUS_PUBLISHING {
        return Err(DomainError::Conflict(format!(
            "post is {} and can no longer change",
            post.status
        )));
    }
    Ok(())
}

fn to_input(post: &SocialPost) -> SocialPostInput {
    SocialPostInput {
        platform: post.platform.clone(),
        content: post.content.clone(),
        media_urls: post.media_urls.clone(),
        link_url: post.link_url.clone(),
        status: post.status.clone(),
        scheduled_at: post.scheduled_at.clone(),
        blog_id: post.blog_id,
    }
}

pub async fn list(state: &AppState, filter: SocialPostFilter) -> Result<Vec<SocialPost>, DomainError> {
    state.social_post_repo.find_all(filter).await
}

pub async fn get(state: &AppState, id: i32) -> Result<SocialPost, DomainError> {
    state
        .social_post_repo
        .find_by_id(id)
        .await?
        .ok_or(DomainError::NotFound)
}

pub async fn create(state: &AppState, input: SocialPostInput) -> Result<SocialPost, DomainError> {
    let input = validate(input)?;
    state.social_post_repo.create(input).await
}

pub async fn update(
    state: &AppState,
    id: i32,
    input: SocialPostInput,
) -> Result<SocialPost, DomainError> {
    let existing = get(state, id).await?;
    editable(&existing)?;
    let input = validate(input)?;
    state.social_post_repo.update(id, input).await
}

pub async fn delete(state: &AppState, id: i32) -> Result<(), DomainError> {
    let existing = get(state, id).await?;
    if existing.status == STATUS_PUBLISHING {
        return Err(DomainError::Conflict("post is being published".to_string()));
    }
    state.social_post_repo.delete(id).await
}

pub async fn schedule(state: &AppState, id: i32, at: &str) -> Result<SocialPost, DomainError> {
    let existing = get(state, id).await?;
    editable(&existing)?;
    let mut input = to_input(&existing);
    input.status = STATUS_SCHEDULED.to_string();
    input.scheduled_at = Some(at.to_string());
    update(state, id, input).await
}

/// A failed post goes back in the queue, due immediately
pub async fn retry(state: &AppState, id: i32) -> Result<SocialPost, DomainError> {
    let existing = get(state, id).await?;
    if existing.status != STATUS_FAILED {
        return Err(DomainError::Conflict(format!(
            "only failed posts can be retried (post is {})",
            existing.status
        )));
    }
    let mut input = to_input(&existing);
    input.status = STATUS_SCHEDULED.to_string();
    input.scheduled_at = Some(now_ts());
    update(state, id, input).await
}

/// Send one post to its platform. Never errors: problems become a failed outcome.
async fn dispatch(state: &AppState, post: &SocialPost) -> PublishOutcome {
    let attempt = async {
        let provider: Provider = post.platform.parse()?;
        require_media(provider, &post.media_urls)?;
        let publisher = publisher_for(provider, &state.http, &state.config.endpoints)
            .ok_or_else(|| {
                DomainError::validation(format!("{} is not a publishing platform", provider))
            })?;
        let (account, token) = oauth_service::access_token(state, provider).await?;
        let text = compose_text(&post.content, post.link_url.as_deref());
        tracing::debug!("Sending post #{} through the {} publisher", post.id, publisher.platform());

        publisher
            .publish(&PublishRequest {
                account_id: &account.external_id,
                access_token: &token,
                text: &text,
                media_urls: &post.media_urls,
            })
            .await
    };

    match attempt.await {
        Ok(published) => PublishOutcome::Published {
            external_id: published.external_id,
            external_url: published.url,
        },
        Err(e) => PublishOutcome::Failed {
            error: e.to_string(),
        },
    }
}

/// Claim, dispatch and record one post
async fn publish_claimed(state: &AppState, post: SocialPost) -> Result<SocialPost, DomainError> {
    let outcome = dispatch(state, &post).await;
    match &outcome {
        PublishOutcome::Published { external_id, .. } => {
            tracing::info!("📣 Post #{} published on {} ({})", post.id, post.platform, external_id)
        }
        PublishOutcome::Failed { error } => {
            tracing::error!("❌ Post #{} on {} failed: {}", post.id, post.platform, error)
        }
    }
    state.social_post_repo.record_outcome(post.id, outcome).await
}

pub async fn publish_now(state: &AppState, id: i32) -> Result<SocialPost, DomainError> {
    let post = get(state, id).await?;
    if !state.social_post_repo.claim(id).await? {
        return Err(DomainError::Conflict(format!(
            "post is {} and cannot be published now",
            post.status
        )));
    }
    publish_claimed(state, post).await
}

/// Publish every due scheduled post, oldest first. One failure never stops the batch.
pub async fn publish_due(state: &AppState) -> Result<PublishSummary, DomainError> {
    let due = state.social_post_repo.find_due(&now_ts()).await?;
    let mut summary = PublishSummary::default();

    for post in due {
        if !state.social_post_repo.claim(post.id).await? {
            continue;
        }
        match publish_claimed(state, post).await {
            Ok(p) if p.status == STATUS_PUBLISHED => summary.published += 1,
            Ok(_) => summary.failed += 1,
            Err(e) => {
                tracing::error!("❌ Could not record publish outcome: {}", e);
                summary.failed += 1;
            }
        }
    }

    Ok(summary)
}

/// Draft one post per platform announcing a blog
pub async fn from_blog(
    state: &AppState,
    request: FromBlogRequest,
) -> Result<Vec<SocialPost>, DomainError> {
    let blog = state
        .blog_repo
        .find_by_id(request.blog_id)
        .await?
        .ok_or(DomainError::NotFound)?;
    if request.platforms.is_empty() {
        return Err(DomainError::validation("choose at least one platform"));
    }

    let link = state.config.blog_url(&blog.slug);
    let body = match blog.excerpt.as_deref().filter(|e| !e.trim().is_empty()) {
        Some(excerpt) => format!("{}\n\n{}", blog.title, excerpt.trim()),
        None => blog.title.clone(),
    };
    let media_urls: Vec<String> = blog.cover_image_url.iter().cloned().collect();

    let mut providers = Vec::new();
    for platform in &request.platforms {
        let provider: Provider = platform.trim().to_lowercase().parse()?;
        if !provider.can_publish() {
            return Err(DomainError::validation(format!(
                "{} is not a publishing platform",
                provider
            )));
        }
        if !providers.contains(&provider) {
            providers.push(provider);
        }
    }

    let mut created = Vec::new();
    for provider in providers {
        // Room for the blank line and the link
        let content = match provider.max_chars() {
            Some(max) => {
                let room = max.saturating_sub(link.chars().count() + 2);
                truncate_chars(&body, room)
            }
            None => body.clone(),
        };

        let input = validate(SocialPostInput {
            platform: provider.as_str().to_string(),
            content,
            media_urls: media_urls.clone(),
            link_url: Some(link.clone()),
            status: STATUS_DRAFT.to_string(),
            scheduled_at: None,
            blog_id: blog.id,
        })?;
        created.push(state.social_post_repo.create(input).await?);
    }

    Ok(created)
}
