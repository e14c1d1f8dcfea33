use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::utils::text::json_list;

pub const STATUS_DRAFT: &str = "draft";
pub const STATUS_SCHEDULED: &str = "scheduled";
pub const STATUS_PUBLISHING: &str = "publishing";
pub const STATUS_PUBLISHED: &str = "published";
pub const STATUS_FAILED: &str = "failed";

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "social_posts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub platform: String,
    pub content: String,
    pub media_urls: String, // JSON array
    pub link_url: Option<String>,
    #[sea_orm(default_value = "draft")]
    pub status: String,
    pub scheduled_at: Option<String>,
    pub published_at: Option<String>,
    pub external_post_id: Option<String>,
    pub external_url: Option<String>,
    pub error_message: Option<String>,
    pub attempts: i32,
    pub blog_id: Option<i32>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::blog::Entity",
        from = "Column::BlogId",
        to = "super::blog::Column::Id"
    )]
    Blog,
}

impl Related<super::blog::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Blog.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct SocialPost {
    pub id: i32,
    pub platform: String,
    pub content: String,
    pub media_urls: Vec<String>,
    pub link_url: Option<String>,
    pub status: String,
    pub scheduled_at: Option<String>,
    pub published_at: Option<String>,
    pub external_post_id: Option<String>,
    pub external_url: Option<String>,
    pub error_message: Option<String>,
    pub attempts: i32,
    pub blog_id: Option<i32>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Model> for SocialPost {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            platform: model.platform,
            content: model.content,
            media_urls: json_list(&model.media_urls),
            link_url: model.link_url,
            status: model.status,
            scheduled_at: model.scheduled_at,
            published_at: model.published_at,
            external_post_id: model.external_post_id,
            external_url: model.external_url,
            error_message: model.error_message,
            attempts: model.attempts,
            blog_id: model.blog_id,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
