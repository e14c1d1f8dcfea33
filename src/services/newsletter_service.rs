//! Newsletter subscribers and their Sender.net mirror

use serde::{Deserialize, Serialize};

use crate::domain::{DomainError, PaginatedSubscribers, SubscriberFilter, SubscriberRepository};
use crate::infrastructure::AppState;
use crate::models::subscriber::{self, STATUS_ACTIVE, STATUS_UNSUBSCRIBED};
use crate::modules::integrations::sender::SenderClient;
use crate::utils::text::{is_plausible_email, normalize_email};

#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
pub struct SubscribeRequest {
    pub email: String,
    pub name: Option<String>,
    pub source: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, utoipa::ToSchema)]
pub struct ImportSummary {
    pub imported: usize,
    pub skipped: usize,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, utoipa::ToSchema)]
pub struct SyncSummary {
    pub synced: usize,
    pub failed: usize,
}

/// Sender.net client when an API key is configured
pub fn sender_client(state: &AppState) -> Option<SenderClient> {
    state
        .config
        .sender
        .as_ref()
        .map(|cfg| SenderClient::new(state.http.clone(), &state.config.endpoints.sender_api, cfg))
}

fn clean_name(name: Option<String>) -> Option<String> {
    name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty())
}

/// Push one subscriber to Sender.net and record whether it landed
async fn push_to_sender(
    state: &AppState,
    client: &SenderClient,
    sub: &subscriber::Model,
) -> Result<(), DomainError> {
    client.upsert_subscriber(&sub.email, sub.name.as_deref()).await?;
    state.subscriber_repo.set_synced(sub.id, true).await?;
    Ok(())
}

pub async fn subscribe(
    state: &AppState,
    request: SubscribeRequest,
) -> Result<subscriber::Model, DomainError> {
    let email = normalize_email(&request.email);
    if !is_plausible_email(&email) {
        return Err(DomainError::validation("a valid email is required"));
    }

    let (mut sub, is_new) = state
        .subscriber_repo
        .upsert_active(&email, clean_name(request.name), clean_name(request.source))
        .await?;
    tracing::info!(
        "📬 Subscriber #{} {}",
        sub.id,
        if is_new { "added" } else { "reactivated" }
    );

    if let Some(client) = sender_client(state) {
        match push_to_sender(state, &client, &sub).await {
            Ok(()) => sub.sender_synced = true,
            Err(e) => tracing::warn!("Sender.net sync failed for subscriber #{}: {}", sub.id, e),
        }
    }

    Ok(sub)
}

pub async fn unsubscribe(state: &AppState, token: &str) -> Result<subscriber::Model, DomainError> {
    let sub = state
        .subscriber_repo
        .find_by_token(token)
        .await?
        .ok_or(DomainError::NotFound)?;

    let updated = state
        .subscriber_repo
        .set_status(sub.id, STATUS_UNSUBSCRIBED)
        .await?;

    if let Some(client) = sender_client(state)
        && let Err(e) = client.delete_subscriber(&updated.email).await
    {
        tracing::warn!("Sender.net removal failed for subscriber #{}: {}", updated.id, e);
    }

    Ok(updated)
}

pub async fn list(
    repo: &dyn SubscriberRepository,
    filter: SubscriberFilter,
) -> Result<PaginatedSubscribers, DomainError> {
    repo.find_all(filter).await
}

pub async fn delete(state: &AppState, id: i32) -> Result<(), DomainError> {
    let sub = state
        .subscriber_repo
        .find_by_id(id)
        .await?
        .ok_or(DomainError::NotFound)?;
    state.subscriber_repo.delete(id).await?;

    if sub.sender_synced
        && let Some(client) = sender_client(state)
        && let Err(e) = client.delete_subscriber(&sub.email).await
    {
        tracing::warn!("Sender.net removal failed for {}: {}", sub.email, e);
    }
    Ok(())
}

/// All subscribers as CSV (`email,name,status,source,created_at`)
pub async fn export_csv(repo: &dyn SubscriberRepository) -> Result<String, DomainError> {
    let all = repo.find_all(SubscriberFilter::default()).await?;

    let mut writer = csv::Writer::from_writer(Vec::new());
    let csv_err = |e: csv::Error| DomainError::Internal(format!("CSV write failed: {}", e));

    writer
        .write_record(["email", "name", "status", "source", "created_at"])
        .map_err(csv_err)?;
    for sub in all.subscribers {
        writer
            .write_record([
                sub.email.as_str(),
                sub.name.as_deref().unwrap_or(""),
                sub.status.as_str(),
                sub.source.as_deref().unwrap_or(""),
                sub.created_at.as_str(),
            ])
            .map_err(csv_err)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| DomainError::Internal(format!("CSV flush failed: {}", e)))?;
    String::from_utf8(bytes).map_err(|e| DomainError::Internal(e.to_string()))
}

/// Import `email[,name]` rows. Invalid addresses and already-active
/// subscribers count as skipped; imported rows wait for `sync_all`.
pub async fn import_csv(
    repo: &dyn SubscriberRepository,
    data: &str,
) -> Result<ImportSummary, DomainError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(data.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| DomainError::validation(format!("invalid CSV: {}", e)))?
        .clone();
    let column = |name: &str| headers.iter().position(|h| h.eq_ignore_ascii_case(name));
    let email_col = column("email")
        .ok_or_else(|| DomainError::validation("CSV needs an 'email' column"))?;
    let name_col = column("name");

    let mut summary = ImportSummary::default();
    for record in reader.records() {
        let Ok(record) = record else {
            summary.skipped += 1;
            continue;
        };

        let email = normalize_email(record.get(email_col).unwrap_or(""));
        if !is_plausible_email(&email) {
            summary.skipped += 1;
            continue;
        }
        if let Some(existing) = repo.find_by_email(&email).await?
            && existing.status == STATUS_ACTIVE
        {
            summary.skipped += 1;
            continue;
        }

        let name = name_col
            .and_then(|i| record.get(i))
            .map(str::to_string);
        repo.upsert_active(&email, clean_name(name), Some("import".to_string()))
            .await?;
        summary.imported += 1;
    }

    tracing::info!(
        "📥 Subscriber import: {} imported, {} skipped",
        summary.imported,
        summary.skipped
    );
    Ok(summary)
}

/// Push every active subscriber Sender.net has not confirmed yet
pub async fn sync_all(state: &AppState) -> Result<SyncSummary, DomainError> {
    let client = sender_client(state)
        .ok_or_else(|| DomainError::NotConfigured("Sender.net is not configured".to_string()))?;

    let mut summary = SyncSummary::default();
    for sub in state.subscriber_repo.find_unsynced_active().await? {
        match push_to_sender(state, &client, &sub).await {
            Ok(()) => summary.synced += 1,
            Err(e) => {
                tracing::warn!("Sender.net sync failed for subscriber #{}: {}", sub.id, e);
                summary.failed += 1;
            }
        }
    }
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::SeaOrmSubscriberRepository;
    use crate::infrastructure::db::init_db;

    #[tokio::test]
    async fn test_import_then_export() {
        let db = init_db("sqlite::memory:").await.unwrap();
        let repo = SeaOrmSubscriberRepository::new(db);
        repo.upsert_active("already@example.com", None, None).await.unwrap();

        let csv = "Email,Name\nAda@Example.com , Ada\nnot-an-email,Bob\nalready@example.com,\n";
        let summary = import_csv(&repo, csv).await.unwrap();
        assert_eq!(summary, ImportSummary { imported: 1, skipped: 2 });

        let ada = repo.find_by_email("ada@example.com").await.unwrap().unwrap();
        assert_eq!(ada.name.as_deref(), Some("Ada"));
        assert_eq!(ada.source.as_deref(), Some("import"));
        assert!(!ada.sender_synced);

        let out = export_csv(&repo).await.unwrap();
        let mut lines = out.lines();
        assert_eq!(lines.next(), Some("email,name,status,source,created_at"));
        assert!(out.contains("ada@example.com,Ada,active,import,"));
    }

    #[tokio::test]
    async fn test_import_requires_email_column() {
        let db = init_db("sqlite::memory:").await.unwrap();
        let repo = SeaOrmSubscriberRepository::new(db);
        let err = import_csv(&repo, "name\nAda\n").await.unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }
}
