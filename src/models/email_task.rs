use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

pub const STATUSES: [&str; 2] = ["open", "done"];
pub const PRIORITIES: [&str; 3] = ["low", "normal", "high"];

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "email_tasks")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub email_id: Option<i32>,
    pub title: String,
    pub notes: Option<String>,
    #[sea_orm(default_value = "open")]
    pub status: String,
    #[sea_orm(default_value = "normal")]
    pub priority: String,
    pub due_date: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::email::Entity",
        from = "Column::EmailId",
        to = "super::email::Column::Id"
    )]
    Email,
}

impl Related<super::email::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Email.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
