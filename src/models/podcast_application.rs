use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

pub const STATUSES: [&str; 4] = ["new", "reviewing", "accepted", "rejected"];

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "podcast_applications")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub email: String,
    pub website: Option<String>,
    pub topic: String,
    pub pitch: String,
    pub social_links: Option<String>,
    #[sea_orm(default_value = "new")]
    pub status: String,
    pub admin_notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
