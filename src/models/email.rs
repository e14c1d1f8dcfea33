use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Inbox message mirrored from Gmail (metadata only)
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "emails")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub gmail_message_id: String,
    pub thread_id: Option<String>,
    pub from_address: String,
    pub subject: String,
    pub snippet: Option<String>,
    pub received_at: String,
    pub is_read: bool,
    pub created_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::email_task::Entity")]
    Tasks,
}

impl Related<super::email_task::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tasks.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
