//! Podcast guest applications

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::Deserialize;

use crate::domain::DomainError;
use crate::models::podcast_application::{self, ActiveModel, Entity as Application, STATUSES};
use crate::utils::text::{is_http_url, is_plausible_email, normalize_email};
use crate::utils::time::now_ts;

#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
pub struct ApplicationRequest {
    pub name: String,
    pub email: String,
    pub website: Option<String>,
    pub topic: String,
    pub pitch: String,
    pub social_links: Option<String>,
}

#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
pub struct ReviewRequest {
    pub status: String,
    pub admin_notes: Option<String>,
}

pub async fn apply(
    db: &DatabaseConnection,
    request: ApplicationRequest,
) -> Result<podcast_application::Model, DomainError> {
    let name = request.name.trim().to_string();
    let topic = request.topic.trim().to_string();
    let pitch = request.pitch.trim().to_string();
    let email = normalize_email(&request.email);

    if name.is_empty() || topic.is_empty() {
        return Err(DomainError::validation("name and topic are required"));
    }
    if !is_plausible_email(&email) {
        return Err(DomainError::validation("a valid email is required"));
    }
    if pitch.chars().count() < 20 || pitch.chars().count() > 5000 {
        return Err(DomainError::validation(
            "pitch must be between 20 and 5000 characters",
        ));
    }
    let website = request.website.filter(|w| !w.trim().is_empty());
    if let Some(site) = &website
        && !is_http_url(site)
    {
        return Err(DomainError::validation("website must be an http(s) URL"));
    }

    let now = now_ts();
    let saved = ActiveModel {
        name: Set(name),
        email: Set(email),
        website: Set(website),
        topic: Set(topic),
        pitch: Set(pitch),
        social_links: Set(request.social_links.filter(|s| !s.trim().is_empty())),
        status: Set("new".to_string()),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    tracing::info!("🎙️ Podcast application #{} from {}", saved.id, saved.name);
    Ok(saved)
}

pub async fn list(
    db: &DatabaseConnection,
    status: Option<String>,
) -> Result<Vec<podcast_application::Model>, DomainError> {
    let mut query = Application::find();
    if let Some(status) = status.filter(|s| !s.is_empty()) {
        query = query.filter(podcast_application::Column::Status.eq(status));
    }
    Ok(query
        .order_by_desc(podcast_application::Column::CreatedAt)
        .order_by_desc(podcast_application::Column::Id)
        .all(db)
        .await?)
}

pub async fn review(
    db: &DatabaseConnection,
    id: i32,
    request: ReviewRequest,
) -> Result<podcast_application::Model, DomainError> {
    if !STATUSES.contains(&request.status.as_str()) {
        return Err(DomainError::validation(format!(
            "unknown status '{}'",
            request.status
        )));
    }
    let existing = Application::find_by_id(id)
        .one(db)
        .await?
        .ok_or(DomainError::NotFound)?;

    let mut active: ActiveModel = existing.into();
    active.status = Set(request.status);
    if request.admin_notes.is_some() {
        active.admin_notes = Set(request.admin_notes);
    }
    active.updated_at = Set(now_ts());
    Ok(active.update(db).await?)
}

pub async fn delete(db: &DatabaseConnection, id: i32) -> Result<(), DomainError> {
    let result = Application::delete_by_id(id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(DomainError::NotFound);
    }
    Ok(())
}
