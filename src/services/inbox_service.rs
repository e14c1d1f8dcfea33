//! Gmail-backed inbox

use chrono::{TimeZone, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::Serialize;

use crate::domain::DomainError;
use crate::infrastructure::AppState;
use crate::models::email::{self, Entity as Email};
use crate::models::email_task;
use crate::modules::integrations::google::{GmailClient, GmailMessage};
use crate::modules::integrations::oauth::Provider;
use crate::services::{oauth_service, task_service};
use crate::utils::time::{format_ts, now_ts};

pub const DEFAULT_SYNC_SIZE: u32 = 25;

#[derive(Debug, Clone, Default, Serialize, PartialEq, utoipa::ToSchema)]
pub struct InboxSyncSummary {
    pub fetched: usize,
    pub stored: usize,
}

/// Gmail client for the connected Google account
pub async fn gmail_client(state: &AppState) -> Result<GmailClient, DomainError> {
    let account = oauth_service::find_account(state.db(), Provider::Google)
        .await?
        .ok_or_else(|| DomainError::NotConfigured("Gmail is not connected".to_string()))?;
    let token = state.vault.decrypt(&account.access_token)?;
    Ok(GmailClient::new(
        state.http.clone(),
        &state.config.endpoints.gmail_api,
        token,
    ))
}

fn received_at(message: &GmailMessage) -> String {
    message
        .internal_date_ms
        .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
        .map(format_ts)
        .unwrap_or_else(now_ts)
}

/// Pull recent inbox messages we have not stored yet
pub async fn sync(state: &AppState, max: u32) -> Result<InboxSyncSummary, DomainError> {
    let client = gmail_client(state).await?;
    let refs = client.list_inbox(max.clamp(1, 100)).await?;

    let mut summary = InboxSyncSummary {
        fetched: refs.len(),
        stored: 0,
    };

    for message_ref in refs {
        let known = Email::find()
            .filter(email::Column::GmailMessageId.eq(message_ref.id.as_str()))
            .one(state.db())
            .await?;
        if known.is_some() {
            continue;
        }

        let message = match client.get_metadata(&message_ref.id).await {
            Ok(m) => m,
            Err(e) => {
                tracing::warn!("Gmail message {} skipped: {}", message_ref.id, e);
                continue;
            }
        };

        email::ActiveModel {
            received_at: Set(received_at(&message)),
            gmail_message_id: Set(message.id),
            thread_id: Set(message.thread_id.or(message_ref.thread_id)),
            from_address: Set(message.from),
            subject: Set(message.subject),
            snippet: Set(message.snippet),
            is_read: Set(!message.unread),
            created_at: Set(now_ts()),
            ..Default::default()
        }
        .insert(state.db())
        .await?;
        summary.stored += 1;
    }

    tracing::info!(
        "📥 Inbox sync: {} fetched, {} new",
        summary.fetched,
        summary.stored
    );
    Ok(summary)
}

pub async fn list(
    db: &DatabaseConnection,
    unread_only: bool,
) -> Result<Vec<email::Model>, DomainError> {
    let mut query = Email::find();
    if unread_only {
        query = query.filter(email::Column::IsRead.eq(false));
    }
    Ok(query
        .order_by_desc(email::Column::ReceivedAt)
        .order_by_desc(email::Column::Id)
        .all(db)
        .await?)
}

pub async fn get(db: &DatabaseConnection, id: i32) -> Result<email::Model, DomainError> {
    Email::find_by_id(id).one(db).await?.ok_or(DomainError::NotFound)
}

/// Mark read locally, and in Gmail when it is reachable
pub async fn mark_read(state: &AppState, id: i32) -> Result<email::Model, DomainError> {
    let message = get(state.db(), id).await?;

    match gmail_client(state).await {
        Ok(client) => {
            if let Err(e) = client.mark_read(&message.gmail_message_id).await {
                tracing::warn!("Gmail mark-read failed for {}: {}", message.gmail_message_id, e);
            }
        }
        Err(_) => tracing::debug!("Gmail not connected; marking #{} read locally", id),
    }

    let mut active: email::ActiveModel = message.into();
    active.is_read = Set(true);
    Ok(active.update(state.db()).await?)
}

/// Follow-up task for an email
pub async fn create_task(
    db: &DatabaseConnection,
    email_id: i32,
) -> Result<email_task::Model, DomainError> {
    let message = get(db, email_id).await?;

    let title = if message.subject.trim().is_empty() {
        format!("Reply to {}", message.from_address)
    } else {
        message.subject.clone()
    };
    let notes = match &message.snippet {
        Some(snippet) => format!("From: {}\n\n{}", message.from_address, snippet),
        None => format!("From: {}", message.from_address),
    };

    task_service::create(
        db,
        task_service::TaskInput {
            email_id: Some(message.id),
            title,
            notes: Some(notes),
            status: None,
            priority: None,
            due_date: None,
        },
    )
    .await
}
