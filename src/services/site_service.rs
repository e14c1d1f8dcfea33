//! Data for the public home page

use serde::Serialize;

use crate::domain::{BlogFilter, DomainError};
use crate::infrastructure::AppState;
use crate::models::BlogSummary;
use crate::models::blog::STATUS_PUBLISHED;
use crate::models::media_item;
use crate::services::{blog_service, media_service};

pub const HOME_LATEST_BLOGS: u64 = 3;

#[derive(Debug, Serialize)]
pub struct HomePage {
    pub site_name: String,
    pub latest_blogs: Vec<BlogSummary>,
    pub featured_media: Vec<media_item::Model>,
    pub published_blog_count: u64,
    pub media_count: u64,
}

pub async fn home(state: &AppState) -> Result<HomePage, DomainError> {
    let latest = blog_service::latest_published(state.blog_repo.as_ref(), HOME_LATEST_BLOGS).await?;
    let published = state
        .blog_repo
        .find_all(BlogFilter {
            status: Some(STATUS_PUBLISHED.to_string()),
            limit: Some(1),
            ..Default::default()
        })
        .await?;

    Ok(HomePage {
        site_name: state.config.site_name.clone(),
        latest_blogs: latest.into_iter().map(BlogSummary::from).collect(),
        featured_media: media_service::featured(state.db()).await?,
        published_blog_count: published.total,
        media_count: media_service::count(state.db()).await?,
    })
}
