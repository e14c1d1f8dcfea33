//! Contact form messages

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::Deserialize;

use crate::domain::DomainError;
use crate::infrastructure::AppState;
use crate::models::contact_message::{self, ActiveModel, Entity as ContactMessage, STATUSES};
use crate::services::inbox_service;
use crate::utils::text::{is_plausible_email, normalize_email};
use crate::utils::time::now_ts;

pub const MESSAGE_MIN_CHARS: usize = 10;
pub const MESSAGE_MAX_CHARS: usize = 5000;

#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
pub struct ContactRequest {
    pub name: String,
    pub email: String,
    pub subject: Option<String>,
    pub message: String,
}

pub async fn submit(
    db: &DatabaseConnection,
    request: ContactRequest,
) -> Result<contact_message::Model, DomainError> {
    let name = request.name.trim().to_string();
    if name.is_empty() {
        return Err(DomainError::validation("name is required"));
    }
    let email = normalize_email(&request.email);
    if !is_plausible_email(&email) {
        return Err(DomainError::validation("a valid email is required"));
    }
    let message = request.message.trim().to_string();
    let len = message.chars().count();
    if !(MESSAGE_MIN_CHARS..=MESSAGE_MAX_CHARS).contains(&len) {
        return Err(DomainError::validation(format!(
            "message must be between {} and {} characters",
            MESSAGE_MIN_CHARS, MESSAGE_MAX_CHARS
        )));
    }

    let now = now_ts();
    let saved = ActiveModel {
        name: Set(name),
        email: Set(email),
        subject: Set(request.subject.filter(|s| !s.trim().is_empty())),
        message: Set(message),
        status: Set("new".to_string()),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    tracing::info!("✉️ Contact message #{} received", saved.id);
    Ok(saved)
}

pub async fn list(
    db: &DatabaseConnection,
    status: Option<String>,
) -> Result<Vec<contact_message::Model>, DomainError> {
    let mut query = ContactMessage::find();
    if let Some(status) = status.filter(|s| !s.is_empty()) {
        query = query.filter(contact_message::Column::Status.eq(status));
    }
    Ok(query
        .order_by_desc(contact_message::Column::CreatedAt)
        .order_by_desc(contact_message::Column::Id)
        .all(db)
        .await?)
}

async fn get(db: &DatabaseConnection, id: i32) -> Result<contact_message::Model, DomainError> {
    ContactMessage::find_by_id(id)
        .one(db)
        .await?
        .ok_or(DomainError::NotFound)
}

pub async fn set_status(
    db: &DatabaseConnection,
    id: i32,
    status: &str,
) -> Result<contact_message::Model, DomainError> {
    if !STATUSES.contains(&status) {
        return Err(DomainError::validation(format!("unknown status '{}'", status)));
    }
    let mut active: ActiveModel = get(db, id).await?.into();
    active.status = Set(status.to_string());
    active.updated_at = Set(now_ts());
    Ok(active.update(db).await?)
}

pub async fn delete(db: &DatabaseConnection, id: i32) -> Result<(), DomainError> {
    let result = ContactMessage::delete_by_id(id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(DomainError::NotFound);
    }
    Ok(())
}

/// Answer through the connected Gmail account, then mark `replied`
pub async fn reply(
    state: &AppState,
    id: i32,
    body: &str,
) -> Result<contact_message::Model, DomainError> {
    if body.trim().is_empty() {
        return Err(DomainError::validation("reply body is required"));
    }
    let message = get(state.db(), id).await?;
    let client = inbox_service::gmail_client(state).await?;

    let subject = format!(
        "Re: {}",
        message.subject.as_deref().unwrap_or("your message")
    );
    client.send(&message.email, &subject, body, None).await?;
    tracing::info!("↩️ Replied to contact message #{}", id);

    set_status(state.db(), id, "replied").await
}
