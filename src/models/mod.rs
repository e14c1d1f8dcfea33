pub mod ai_integration;
pub mod blog;
pub mod campaign;
pub mod contact_message;
pub mod email;
pub mod email_task;
pub mod media_item;
pub mod podcast_application;
pub mod scheduler_job;
pub mod social_account;
pub mod social_post;
pub mod subscriber;
pub mod user;

pub use blog::{Blog, BlogSummary};
pub use social_post::SocialPost;
