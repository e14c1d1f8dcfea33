//! Repository trait definitions
//!
//! These traits define the contract for data access.
//! Implementations live in the infrastructure layer.

use async_trait::async_trait;

use super::DomainError;
use crate::models::subscriber;
use crate::models::{Blog, SocialPost};

/// Filter criteria for blog queries
#[derive(Debug, Default, Clone)]
pub struct BlogFilter {
    pub status: Option<String>,
    pub tag: Option<String>,
    pub query: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

/// Paginated result with total count
#[derive(Debug)]
pub struct PaginatedBlogs {
    pub blogs: Vec<Blog>,
    pub total: u64,
}

/// Repository trait for Blog entity
#[async_trait]
pub trait BlogRepository: Send + Sync {
    /// Find all blogs matching the filter, newest first
    async fn find_all(&self, filter: BlogFilter) -> Result<PaginatedBlogs, DomainError>;

    async fn find_by_id(&self, id: i32) -> Result<Option<Blog>, DomainError>;

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Blog>, DomainError>;

    /// Whether a slug is taken by a blog other than `except_id`
    async fn slug_exists(&self, slug: &str, except_id: Option<i32>) -> Result<bool, DomainError>;

    async fn create(&self, blog: Blog) -> Result<Blog, DomainError>;

    async fn update(&self, id: i32, blog: Blog) -> Result<Blog, DomainError>;

    async fn delete(&self, id: i32) -> Result<(), DomainError>;

    async fn increment_views(&self, id: i32) -> Result<(), DomainError>;

    /// Scheduled blogs whose `scheduled_at` is at or before `now`
    async fn find_due(&self, now: &str) -> Result<Vec<Blog>, DomainError>;
}

#[derive(Debug, Default, Clone)]
pub struct SubscriberFilter {
    pub status: Option<String>,
    pub query: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

#[derive(Debug)]
pub struct PaginatedSubscribers {
    pub subscribers: Vec<subscriber::Model>,
    pub total: u64,
}

/// Repository trait for newsletter subscribers
#[async_trait]
pub trait SubscriberRepository: Send + Sync {
    async fn find_all(&self, filter: SubscriberFilter) -> Result<PaginatedSubscribers, DomainError>;

    async fn find_by_id(&self, id: i32) -> Result<Option<subscriber::Model>, DomainError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<subscriber::Model>, DomainError>;

    async fn find_by_token(&self, token: &str) -> Result<Option<subscriber::Model>, DomainError>;

    /// Insert, or reactivate an existing address. Returns the row and whether it is new.
    async fn upsert_active(
        &self,
        email: &str,
        name: Option<String>,
        source: Option<String>,
    ) -> Result<(subscriber::Model, bool), DomainError>;

    async fn set_status(&self, id: i32, status: &str) -> Result<subscriber::Model, DomainError>;

    async fn set_synced(&self, id: i32, synced: bool) -> Result<(), DomainError>;

    async fn find_unsynced_active(&self) -> Result<Vec<subscriber::Model>, DomainError>;

    async fn delete(&self, id: i32) -> Result<(), DomainError>;

    async fn count_by_status(&self, status: &str) -> Result<u64, DomainError>;
}

#[derive(Debug, Default, Clone)]
pub struct SocialPostFilter {
    pub platform: Option<String>,
    pub status: Option<String>,
}

/// Editable fields of a social post
#[derive(Debug, Clone, serde::Deserialize)]
pub struct SocialPostInput {
    pub platform: String,
    pub content: String,
    #[serde(default)]
    pub media_urls: Vec<String>,
    pub link_url: Option<String>,
    #[serde(default = "default_post_status")]
    pub status: String,
    pub scheduled_at: Option<String>,
    pub blog_id: Option<i32>,
}

fn default_post_status() -> String {
    "draft".to_string()
}

/// Fields written when a publish attempt finishes
#[derive(Debug, Clone)]
pub enum PublishOutcome {
    Published {
        external_id: String,
        external_url: Option<String>,
    },
    Failed {
        error: String,
    },
}

/// Repository trait for scheduled social posts
#[async_trait]
pub trait SocialPostRepository: Send + Sync {
    async fn find_all(&self, filter: SocialPostFilter) -> Result<Vec<SocialPost>, DomainError>;

    async fn find_by_id(&self, id: i32) -> Result<Option<SocialPost>, DomainError>;

    async fn create(&self, input: SocialPostInput) -> Result<SocialPost, DomainError>;

    async fn update(&self, id: i32, input: SocialPostInput) -> Result<SocialPost, DomainError>;

    async fn delete(&self, id: i32) -> Result<(), DomainError>;

    /// Scheduled posts due at `now`, oldest first
    async fn find_due(&self, now: &str) -> Result<Vec<SocialPost>, DomainError>;

    /// Move a post from `scheduled`/`draft`/`failed` to `publishing`.
    /// Returns false when another caller already claimed it.
    async fn claim(&self, id: i32) -> Result<bool, DomainError>;

    async fn record_outcome(&self, id: i32, outcome: PublishOutcome) -> Result<SocialPost, DomainError>;

    async fn count_by_status(&self, status: &str) -> Result<u64, DomainError>;
}
