use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

pub const KINDS: [&str; 4] = ["podcast", "video", "press", "talk"];

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "media_items")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub kind: String,
    pub title: String,
    pub outlet: Option<String>,
    pub url: String,
    pub thumbnail_url: Option<String>,
    pub description: Option<String>,
    pub published_on: Option<String>,
    pub featured: bool,
    pub position: i32,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
