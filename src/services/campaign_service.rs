//! Newsletter campaigns: drafts stored locally, delivered through Sender.net

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    sea_query::Expr,
};
use serde::Deserialize;

use crate::domain::DomainError;
use crate::infrastructure::AppState;
use crate::models::campaign::{
    self, ActiveModel, Entity as Campaign, STATUS_DRAFT, STATUS_FAILED, STATUS_SCHEDULED,
    STATUS_SENDING, STATUS_SENT,
};
use crate::modules::integrations::sender::CampaignDraft;
use crate::services::newsletter_service::sender_client;
use crate::utils::time::{normalize_ts, now_ts, parse_ts};

#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
pub struct CampaignInput {
    pub subject: String,
    pub preheader: Option<String>,
    pub content_html: String,
    pub scheduled_at: Option<String>,
}

fn validate(input: &CampaignInput) -> Result<Option<String>, DomainError> {
    if input.subject.trim().is_empty() {
        return Err(DomainError::validation("subject is required"));
    }
    if input.content_html.trim().is_empty() {
        return Err(DomainError::validation("content_html is required"));
    }
    input
        .scheduled_at
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .map(future_ts)
        .transpose()
}

fn future_ts(value: &str) -> Result<String, DomainError> {
    match parse_ts(value) {
        Some(at) if at > Utc::now() => {
            normalize_ts(value).ok_or_else(|| DomainError::validation("invalid scheduled_at"))
        }
        Some(_) => Err(DomainError::validation("scheduled_at must be in the future")),
        None => Err(DomainError::validation(
            "scheduled_at must be an RFC 3339 timestamp",
        )),
    }
}

fn locked(model: &campaign::Model) -> Result<(), DomainError> {
    if model.is_locked() {
        return Err(DomainError::Conflict(format!(
            "campaign is {} and can no longer change",
            model.status
        )));
    }
    Ok(())
}

pub async fn list(db: &DatabaseConnection) -> Result<Vec<campaign::Model>, DomainError> {
    Ok(Campaign::find()
        .order_by_desc(campaign::Column::CreatedAt)
        .order_by_desc(campaign::Column::Id)
        .all(db)
        .await?)
}

pub async fn get(db: &DatabaseConnection, id: i32) -> Result<campaign::Model, DomainError> {
    Campaign::find_by_id(id)
        .one(db)
        .await?
        .ok_or(DomainError::NotFound)
}

pub async fn create(
    db: &DatabaseConnection,
    input: CampaignInput,
) -> Result<campaign::Model, DomainError> {
    let scheduled_at = validate(&input)?;
    let now = now_ts();

    let model = ActiveModel {
        subject: Set(input.subject.trim().to_string()),
        preheader: Set(input.preheader),
        content_html: Set(input.content_html),
        status: Set(if scheduled_at.is_some() {
            STATUS_SCHEDULED
        } else {
            STATUS_DRAFT
        }
        .to_string()),
        scheduled_at: Set(scheduled_at),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    Ok(model)
}

pub async fn update(
    db: &DatabaseConnection,
    id: i32,
    input: CampaignInput,
) -> Result<campaign::Model, DomainError> {
    let existing = get(db, id).await?;
    locked(&existing)?;
    let scheduled_at = validate(&input)?;

    let mut active: ActiveModel = existing.into();
    active.subject = Set(input.subject.trim().to_string());
    active.preheader = Set(input.preheader);
    active.content_html = Set(input.content_html);
    active.status = Set(if scheduled_at.is_some() {
        STATUS_SCHEDULED
    } else {
        STATUS_DRAFT
    }
    .to_string());
    active.scheduled_at = Set(scheduled_at);
    active.error_message = Set(None);
    active.updated_at = Set(now_ts());
    Ok(active.update(db).await?)
}

pub async fn delete(db: &DatabaseConnection, id: i32) -> Result<(), DomainError> {
    let existing = get(db, id).await?;
    locked(&existing)?;
    Campaign::delete_by_id(id).exec(db).await?;
    Ok(())
}

pub async fn schedule(
    db: &DatabaseConnection,
    id: i32,
    at: &str,
) -> Result<campaign::Model, DomainError> {
    let existing = get(db, id).await?;
    locked(&existing)?;
    let at = future_ts(at)?;

    let mut active: ActiveModel = existing.into();
    active.status = Set(STATUS_SCHEDULED.to_string());
    active.scheduled_at = Set(Some(at));
    active.updated_at = Set(now_ts());
    Ok(active.update(db).await?)
}

/// Move a sendable campaign to `sending`. False when another sender got there first.
async fn claim(db: &DatabaseConnection, id: i32) -> Result<bool, DomainError> {
    let result = Campaign::update_many()
        .col_expr(campaign::Column::Status, Expr::value(STATUS_SENDING))
        .col_expr(campaign::Column::UpdatedAt, Expr::value(now_ts()))
        .filter(campaign::Column::Id.eq(id))
        .filter(campaign::Column::Status.is_in([STATUS_DRAFT, STATUS_SCHEDULED, STATUS_FAILED]))
        .exec(db)
        .await?;
    Ok(result.rows_affected == 1)
}

/// Create the campaign on Sender.net and trigger delivery.
/// Ends in `sent`, or `failed` with the provider's message.
pub async fn send_now(state: &AppState, id: i32) -> Result<campaign::Model, DomainError> {
    let db = state.db();
    let client = sender_client(state)
        .ok_or_else(|| DomainError::NotConfigured("Sender.net is not configured".to_string()))?;

    let existing = get(db, id).await?;
    if !claim(db, id).await? {
        return Err(DomainError::Conflict(format!(
            "campaign is {} and cannot be sent",
            existing.status
        )));
    }

    let draft = CampaignDraft {
        subject: &existing.subject,
        preheader: existing.preheader.as_deref(),
        content_html: &existing.content_html,
    };

    // Reuse the remote campaign when a previous attempt got that far
    let result: Result<(String, Result<(), DomainError>), DomainError> = async {
        let remote_id = match &existing.sender_campaign_id {
            Some(id) => id.clone(),
            None => client.create_campaign(&draft).await?,
        };
        let sent = client.send_campaign(&remote_id).await;
        Ok((remote_id, sent))
    }
    .await;

    let mut active: ActiveModel = get(db, id).await?.into();
    let now = now_ts();
    match result {
        Ok((remote_id, Ok(()))) => {
            tracing::info!("📨 Campaign #{} sent (Sender.net {})", id, remote_id);
            active.status = Set(STATUS_SENT.to_string());
            active.sent_at = Set(Some(now.clone()));
            active.sender_campaign_id = Set(Some(remote_id));
            active.error_message = Set(None);
        }
        Ok((remote_id, Err(e))) => {
            tracing::error!("❌ Campaign #{} send failed: {}", id, e);
            active.status = Set(STATUS_FAILED.to_string());
            active.sender_campaign_id = Set(Some(remote_id));
            active.error_message = Set(Some(e.to_string()));
        }
        Err(e) => {
            tracing::error!("❌ Campaign #{} could not be created: {}", id, e);
            active.status = Set(STATUS_FAILED.to_string());
            active.error_message = Set(Some(e.to_string()));
        }
    }
    active.updated_at = Set(now);
    Ok(active.update(db).await?)
}

/// Send scheduled campaigns whose time has come. Returns (sent, failed).
pub async fn send_due(state: &AppState) -> Result<(usize, usize), DomainError> {
    if sender_client(state).is_none() {
        return Ok((0, 0));
    }

    let due = Campaign::find()
        .filter(campaign::Column::Status.eq(STATUS_SCHEDULED))
        .filter(campaign::Column::ScheduledAt.lte(now_ts()))
        .order_by_asc(campaign::Column::ScheduledAt)
        .all(state.db())
        .await?;

    let (mut sent, mut failed) = (0, 0);
    for item in due {
        match send_now(state, item.id).await {
            Ok(c) if c.status == STATUS_SENT => sent += 1,
            Ok(_) => failed += 1,
            Err(e) => {
                tracing::error!("❌ Campaign #{}: {}", item.id, e);
                failed += 1;
            }
        }
    }
    Ok((sent, failed))
}
