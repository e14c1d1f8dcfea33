//! Admin dashboard counters

use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use serde::Serialize;

use crate::domain::{BlogFilter, DomainError};
use crate::infrastructure::AppState;
use crate::models::blog::{STATUS_DRAFT, STATUS_PUBLISHED, STATUS_SCHEDULED};
use crate::models::{contact_message, email, email_task, podcast_application, social_post, subscriber};

#[derive(Debug, Default, Serialize, PartialEq, utoipa::ToSchema)]
pub struct BlogCounts {
    pub draft: u64,
    pub scheduled: u64,
    pub published: u64,
}

#[derive(Debug, Default, Serialize, PartialEq, utoipa::ToSchema)]
pub struct DashboardStats {
    pub blogs: BlogCounts,
    pub active_subscribers: u64,
    pub scheduled_posts: u64,
    pub failed_posts: u64,
    pub unread_emails: u64,
    pub open_tasks: u64,
    pub new_podcast_applications: u64,
    pub new_contact_messages: u64,
}

async fn blogs_with_status(state: &AppState, status: &str) -> Result<u64, DomainError> {
    let page = state
        .blog_repo
        .find_all(BlogFilter {
            status: Some(status.to_string()),
            limit: Some(1),
            ..Default::default()
        })
        .await?;
    Ok(page.total)
}

pub async fn stats(state: &AppState) -> Result<DashboardStats, DomainError> {
    let db = state.db();

    Ok(DashboardStats {
        blogs: BlogCounts {
            draft: blogs_with_status(state, STATUS_DRAFT).await?,
            scheduled: blogs_with_status(state, STATUS_SCHEDULED).await?,
            published: blogs_with_status(state, STATUS_PUBLISHED).await?,
        },
        active_subscribers: state
            .subscriber_repo
            .count_by_status(subscriber::STATUS_ACTIVE)
            .await?,
        scheduled_posts: state
            .social_post_repo
            .count_by_status(social_post::STATUS_SCHEDULED)
            .await?,
        failed_posts: state
            .social_post_repo
            .count_by_status(social_post::STATUS_FAILED)
            .await?,
        unread_emails: email::Entity::find()
            .filter(email::Column::IsRead.eq(false))
            .count(db)
            .await?,
        open_tasks: email_task::Entity::find()
            .filter(email_task::Column::Status.eq("open"))
            .count(db)
            .await?,
        new_podcast_applications: podcast_application::Entity::find()
            .filter(podcast_application::Column::Status.eq("new"))
            .count(db)
            .await?,
        new_contact_messages: contact_message::Entity::find()
            .filter(contact_message::Column::Status.eq("new"))
            .count(db)
            .await?,
    })
}
