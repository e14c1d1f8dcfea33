//! Services layer - business logic without the HTTP layer
//!
//! Handlers and the scheduler both call into these modules.

pub mod ai_service;
pub mod auth_service;
pub mod blog_service;
pub mod campaign_service;
pub mod contact_service;
pub mod dashboard_service;
pub mod inbox_service;
pub mod media_service;
pub mod newsletter_service;
pub mod oauth_service;
pub mod podcast_service;
pub mod site_service;
pub mod social_service;
pub mod task_service;
