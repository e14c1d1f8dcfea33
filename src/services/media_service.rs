//! Media appearances (podcasts, videos, press, talks)

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::Deserialize;

use crate::domain::DomainError;
use crate::models::media_item::{self, ActiveModel, Entity as MediaItem, KINDS};
use crate::utils::text::is_http_url;
use crate::utils::time::now_ts;

#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
pub struct MediaInput {
    pub kind: String,
    pub title: String,
    pub outlet: Option<String>,
    pub url: String,
    pub thumbnail_url: Option<String>,
    pub description: Option<String>,
    /// `YYYY-MM-DD`
    pub published_on: Option<String>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub position: i32,
}

fn validate(input: &MediaInput) -> Result<(), DomainError> {
    if !KINDS.contains(&input.kind.as_str()) {
        return Err(DomainError::validation(format!(
            "kind must be one of {}",
            KINDS.join(", ")
        )));
    }
    if input.title.trim().is_empty() {
        return Err(DomainError::validation("title is required"));
    }
    if !is_http_url(&input.url) {
        return Err(DomainError::validation("url must be an http(s) URL"));
    }
    if let Some(thumb) = input.thumbnail_url.as_deref().filter(|t| !t.is_empty())
        && !is_http_url(thumb)
    {
        return Err(DomainError::validation("thumbnail_url must be an http(s) URL"));
    }
    if let Some(day) = input.published_on.as_deref().filter(|d| !d.is_empty()) {
        chrono::NaiveDate::parse_from_str(day, "%Y-%m-%d")
            .map_err(|_| DomainError::validation("published_on must be YYYY-MM-DD"))?;
    }
    Ok(())
}

fn apply(active: &mut ActiveModel, input: MediaInput) {
    active.kind = Set(input.kind);
    active.title = Set(input.title.trim().to_string());
    active.outlet = Set(input.outlet.filter(|o| !o.trim().is_empty()));
    active.url = Set(input.url);
    active.thumbnail_url = Set(input.thumbnail_url.filter(|t| !t.is_empty()));
    active.description = Set(input.description);
    active.published_on = Set(input.published_on.filter(|d| !d.is_empty()));
    active.featured = Set(input.featured);
    active.position = Set(input.position);
}

/// Ordered by `position`, then newest first
pub async fn list(
    db: &DatabaseConnection,
    kind: Option<String>,
) -> Result<Vec<media_item::Model>, DomainError> {
    let mut query = MediaItem::find();
    if let Some(kind) = kind.filter(|k| !k.is_empty()) {
        query = query.filter(media_item::Column::Kind.eq(kind));
    }
    Ok(query
        .order_by_asc(media_item::Column::Position)
        .order_by_desc(media_item::Column::PublishedOn)
        .order_by_desc(media_item::Column::Id)
        .all(db)
        .await?)
}

pub async fn featured(db: &DatabaseConnection) -> Result<Vec<media_item::Model>, DomainError> {
    Ok(MediaItem::find()
        .filter(media_item::Column::Featured.eq(true))
        .order_by_asc(media_item::Column::Position)
        .order_by_desc(media_item::Column::PublishedOn)
        .all(db)
        .await?)
}

pub async fn count(db: &DatabaseConnection) -> Result<u64, DomainError> {
    Ok(MediaItem::find().count(db).await?)
}

pub async fn create(
    db: &DatabaseConnection,
    input: MediaInput,
) -> Result<media_item::Model, DomainError> {
    validate(&input)?;
    let now = now_ts();
    let mut active = ActiveModel {
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    };
    apply(&mut active, input);
    Ok(active.insert(db).await?)
}

pub async fn update(
    db: &DatabaseConnection,
    id: i32,
    input: MediaInput,
) -> Result<media_item::Model, DomainError> {
    validate(&input)?;
    let existing = MediaItem::find_by_id(id)
        .one(db)
        .await?
        .ok_or(DomainError::NotFound)?;
    let mut active: ActiveModel = existing.into();
    apply(&mut active, input);
    active.updated_at = Set(now_ts());
    Ok(active.update(db).await?)
}

pub async fn delete(db: &DatabaseConnection, id: i32) -> Result<(), DomainError> {
    let result = MediaItem::delete_by_id(id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(DomainError::NotFound);
    }
    Ok(())
}
