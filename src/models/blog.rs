use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::utils::text::json_list;

pub const STATUS_DRAFT: &str = "draft";
pub const STATUS_SCHEDULED: &str = "scheduled";
pub const STATUS_PUBLISHED: &str = "published";

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "blogs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    #[sea_orm(unique)]
    pub slug: String,
    pub excerpt: Option<String>,
    pub content: String,
    pub cover_image_url: Option<String>,
    pub tags: String, // JSON array
    #[sea_orm(default_value = "draft")]
    pub status: String,
    pub scheduled_at: Option<String>,
    pub published_at: Option<String>,
    pub reading_minutes: i32,
    pub view_count: i32,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::social_post::Entity")]
    SocialPosts,
}

impl Related<super::social_post::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SocialPosts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Blog post as exposed by the API (tags decoded)
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Blog {
    pub id: Option<i32>,
    pub title: String,
    pub slug: String,
    pub excerpt: Option<String>,
    pub content: String,
    pub cover_image_url: Option<String>,
    pub tags: Vec<String>,
    pub status: String,
    pub scheduled_at: Option<String>,
    pub published_at: Option<String>,
    pub reading_minutes: i32,
    pub view_count: i32,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl From<Model> for Blog {
    fn from(model: Model) -> Self {
        Self {
            id: Some(model.id),
            title: model.title,
            slug: model.slug,
            excerpt: model.excerpt,
            content: model.content,
            cover_image_url: model.cover_image_url,
            tags: json_list(&model.tags),
            status: model.status,
            scheduled_at: model.scheduled_at,
            published_at: model.published_at,
            reading_minutes: model.reading_minutes,
            view_count: model.view_count,
            meta_title: model.meta_title,
            meta_description: model.meta_description,
            created_at: Some(model.created_at),
            updated_at: Some(model.updated_at),
        }
    }
}

/// Listing card without the body
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct BlogSummary {
    pub id: i32,
    pub title: String,
    pub slug: String,
    pub excerpt: Option<String>,
    pub cover_image_url: Option<String>,
    pub tags: Vec<String>,
    pub status: String,
    pub published_at: Option<String>,
    pub reading_minutes: i32,
}

impl From<Blog> for BlogSummary {
    fn from(blog: Blog) -> Self {
        Self {
            id: blog.id.unwrap_or_default(),
            title: blog.title,
            slug: blog.slug,
            excerpt: blog.excerpt,
            cover_image_url: blog.cover_image_url,
            tags: blog.tags,
            status: blog.status,
            published_at: blog.published_at,
            reading_minutes: blog.reading_minutes,
        }
    }
}
