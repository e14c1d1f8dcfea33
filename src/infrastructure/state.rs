//! Application state containing repositories and shared resources

use dashmap::DashMap;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use std::time::Duration;

use crate::domain::{BlogRepository, SocialPostRepository, SubscriberRepository};
use crate::infrastructure::config::Config;
use crate::infrastructure::vault::TokenVault;
use crate::infrastructure::{
    SeaOrmBlogRepository, SeaOrmSocialPostRepository, SeaOrmSubscriberRepository,
};
use crate::services::oauth_service::PendingAuthorization;

/// Application state shared across all handlers and the scheduler
#[derive(Clone)]
pub struct AppState {
    db: DatabaseConnection,
    pub config: Arc<Config>,
    /// Shared HTTP client for every third-party API
    pub http: reqwest::Client,
    pub vault: Arc<TokenVault>,
    /// OAuth `state` values waiting for their callback
    pub oauth_states: Arc<DashMap<String, PendingAuthorization>>,
    pub blog_repo: Arc<dyn BlogRepository>,
    pub subscriber_repo: Arc<dyn SubscriberRepository>,
    pub social_post_repo: Arc<dyn SocialPostRepository>,
}

impl AppState {
    /// Create a new AppState with all repositories initialized
    pub fn new(db: DatabaseConnection, config: Config) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("brandhub/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("Falling back to default HTTP client: {}", e);
                reqwest::Client::new()
            });

        Self {
            blog_repo: Arc::new(SeaOrmBlogRepository::new(db.clone())),
            subscriber_repo: Arc::new(SeaOrmSubscriberRepository::new(db.clone())),
            social_post_repo: Arc::new(SeaOrmSocialPostRepository::new(db.clone())),
            vault: Arc::new(TokenVault::new(&config.encryption_key)),
            oauth_states: Arc::new(DashMap::new()),
            config: Arc::new(config),
            http,
            db,
        }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}

impl AsRef<DatabaseConnection> for AppState {
    fn as_ref(&self) -> &DatabaseConnection {
        &self.db
    }
}

// Lets plain CRUD handlers take `State<DatabaseConnection>`
impl axum::extract::FromRef<AppState> for DatabaseConnection {
    fn from_ref(state: &AppState) -> Self {
        state.db.clone()
    }
}
