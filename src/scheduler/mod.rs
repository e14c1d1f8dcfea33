//! Poll-and-dispatch scheduler.
//!
//! Each job row in `scheduler_jobs` says whether it is enabled and how often
//! it runs; the processor loop checks them every tick.

pub mod processor;

use chrono::{Duration, Utc};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, Set};
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

use crate::domain::DomainError;
use crate::models::scheduler_job::{self, Entity as SchedulerJob};
use crate::utils::time::parse_ts;

pub const MIN_INTERVAL_SECS: i32 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Job {
    PublishSocial,
    PublishBlogs,
    SendCampaigns,
    SyncInbox,
    RefreshTokens,
}

impl Job {
    /// Order jobs run in within one tick
    pub const ALL: [Job; 5] = [
        Job::RefreshTokens,
        Job::PublishBlogs,
        Job::PublishSocial,
        Job::SendCampaigns,
        Job::SyncInbox,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Job::PublishSocial => "publish_social",
            Job::PublishBlogs => "publish_blogs",
            Job::SendCampaigns => "send_campaigns",
            Job::SyncInbox => "sync_inbox",
            Job::RefreshTokens => "refresh_tokens",
        }
    }
}

impl fmt::Display for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Job {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Job::ALL
            .into_iter()
            .find(|j| j.as_str() == s)
            .ok_or(DomainError::NotFound)
    }
}

#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
pub struct JobUpdate {
    pub enabled: Option<bool>,
    pub interval_secs: Option<i32>,
}

/// Enabled, and never run or its interval has elapsed
pub fn is_due(job: &scheduler_job::Model, now: chrono::DateTime<Utc>) -> bool {
    if !job.enabled {
        return false;
    }
    match job.last_run_at.as_deref().and_then(parse_ts) {
        Some(last) => last + Duration::seconds(job.interval_secs as i64) <= now,
        None => true,
    }
}

pub async fn list_jobs(db: &DatabaseConnection) -> Result<Vec<scheduler_job::Model>, DomainError> {
    Ok(SchedulerJob::find()
        .order_by_asc(scheduler_job::Column::Name)
        .all(db)
        .await?)
}

pub async fn get_job(
    db: &DatabaseConnection,
    name: &str,
) -> Result<scheduler_job::Model, DomainError> {
    SchedulerJob::find_by_id(name.to_string())
        .one(db)
        .await?
        .ok_or(DomainError::NotFound)
}

pub async fn update_job(
    db: &DatabaseConnection,
    name: &str,
    update: JobUpdate,
) -> Result<scheduler_job::Model, DomainError> {
    let job = get_job(db, name).await?;

    if let Some(secs) = update.interval_secs
        && secs < MIN_INTERVAL_SECS
    {
        return Err(DomainError::validation(format!(
            "interval_secs must be at least {}",
            MIN_INTERVAL_SECS
        )));
    }

    let mut active: scheduler_job::ActiveModel = job.into();
    if let Some(enabled) = update.enabled {
        active.enabled = Set(enabled);
    }
    if let Some(secs) = update.interval_secs {
        active.interval_secs = Set(secs);
    }
    Ok(active.update(db).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::db::init_db;

    fn job(enabled: bool, last_run_at: Option<&str>) -> scheduler_job::Model {
        scheduler_job::Model {
            name: "publish_social".into(),
            enabled,
            interval_secs: 60,
            last_run_at: last_run_at.map(str::to_string),
            last_status: None,
            last_message: None,
        }
    }

    #[test]
    fn test_is_due() {
        let now = parse_ts("2026-10-18T10:00:00Z").unwrap();
        assert!(is_due(&job(true, None), now));
        assert!(is_due(&job(true, Some("2026-10-18T09:59:00Z")), now));
        assert!(!is_due(&job(true, Some("2026-10-18T09:59:30Z")), now));
        assert!(!is_due(&job(false, None), now));
    }

    #[tokio::test]
    async fn test_update_enforces_minimum_interval() {
        let db = init_db("sqlite::memory:").await.unwrap();
        let err = update_job(
            &db,
            "sync_inbox",
            JobUpdate {
                enabled: None,
                interval_secs: Some(10),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        let job = update_job(
            &db,
            "sync_inbox",
            JobUpdate {
                enabled: Some(false),
                interval_secs: Some(300),
            },
        )
        .await
        .unwrap();
        assert!(!job.enabled);
        assert_eq!(job.interval_secs, 300);

        assert!(matches!(
            update_job(&db, "nope", JobUpdate { enabled: None, interval_secs: None }).await,
            Err(DomainError::NotFound)
        ));
    }
}
