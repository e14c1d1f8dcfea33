use chrono::Utc;
use sea_orm::{ActiveModelTrait, Set};
use std::time::Duration;

use super::{Job, get_job, is_due, list_jobs};
use crate::domain::DomainError;
use crate::infrastructure::AppState;
use crate::models::scheduler_job;
use crate::services::{
    blog_service, campaign_service, inbox_service, newsletter_service, oauth_service,
    social_service,
};
use crate::utils::time::now_ts;

/// Runs forever: every tick, each due job runs once, one after the other
pub async fn run_scheduler(state: AppState) {
    let tick = Duration::from_secs(state.config.scheduler_tick_secs.max(1));
    tracing::info!("⏰ Scheduler started (tick {}s)", tick.as_secs());

    loop {
        if let Err(e) = run_due_jobs(&state).await {
            tracing::error!("❌ Scheduler tick failed: {}", e);
        }
        tokio::time::sleep(tick).await;
    }
}

/// One tick. Returns the names of the jobs that ran.
pub async fn run_due_jobs(state: &AppState) -> Result<Vec<String>, DomainError> {
    let now = Utc::now();
    let rows = list_jobs(state.db()).await?;
    let mut ran = Vec::new();

    for job in Job::ALL {
        let Some(row) = rows.iter().find(|r| r.name == job.as_str()) else {
            continue;
        };
        if !is_due(row, now) {
            continue;
        }
        // A failing job is recorded and the next one still runs
        if let Err(e) = run_and_record(state, job).await {
            tracing::error!("❌ Could not record run of {}: {}", job, e);
        }
        ran.push(job.to_string());
    }

    Ok(ran)
}

/// Run a job immediately, whatever its schedule says
pub async fn run_now(state: &AppState, name: &str) -> Result<scheduler_job::Model, DomainError> {
    let job: Job = name.parse()?;
    run_and_record(state, job).await
}

async fn run_and_record(state: &AppState, job: Job) -> Result<scheduler_job::Model, DomainError> {
    tracing::info!("⚙️ Running job {}", job);
    let started = now_ts();

    let (status, message) = match execute(state, job).await {
        Ok(summary) => {
            tracing::info!("✅ {}: {}", job, summary);
            ("ok", summary)
        }
        Err(DomainError::NotConfigured(reason)) => {
            tracing::debug!("⏭️ {} skipped: {}", job, reason);
            ("ok", format!("skipped: {}", reason))
        }
        Err(e) => {
            tracing::error!("❌ {} failed: {}", job, e);
            ("error", e.to_string())
        }
    };

    let row = get_job(state.db(), job.as_str()).await?;
    let mut active: scheduler_job::ActiveModel = row.into();
    active.last_run_at = Set(Some(started));
    active.last_status = Set(Some(status.to_string()));
    active.last_message = Set(Some(message));
    Ok(active.update(state.db()).await?)
}

async fn execute(state: &AppState, job: Job) -> Result<String, DomainError> {
    match job {
        Job::PublishSocial => {
            let summary = social_service::publish_due(state).await?;
            Ok(format!(
                "{} published, {} failed",
                summary.published, summary.failed
            ))
        }
        Job::PublishBlogs => {
            let published = blog_service::publish_due(state.blog_repo.as_ref()).await?;
            Ok(format!("{} published", published))
        }
        Job::SendCampaigns => {
            if newsletter_service::sender_client(state).is_none() {
                return Err(DomainError::NotConfigured(
                    "Sender.net is not configured".to_string(),
                ));
            }
            let (sent, failed) = campaign_service::send_due(state).await?;
            Ok(format!("{} sent, {} failed", sent, failed))
        }
        Job::SyncInbox => {
            let summary = inbox_service::sync(state, inbox_service::DEFAULT_SYNC_SIZE).await?;
            Ok(format!("{} fetched, {} new", summary.fetched, summary.stored))
        }
        Job::RefreshTokens => {
            let (refreshed, failed) = oauth_service::refresh_expiring(state).await?;
            Ok(format!("{} refreshed, {} failed", refreshed, failed))
        }
    }
}
