use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

pub const STATUS_DRAFT: &str = "draft";
pub const STATUS_SCHEDULED: &str = "scheduled";
pub const STATUS_SENDING: &str = "sending";
pub const STATUS_SENT: &str = "sent";
pub const STATUS_FAILED: &str = "failed";

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "campaigns")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub subject: String,
    pub preheader: Option<String>,
    pub content_html: String,
    #[sea_orm(default_value = "draft")]
    pub status: String,
    pub scheduled_at: Option<String>,
    pub sent_at: Option<String>,
    pub sender_campaign_id: Option<String>,
    pub error_message: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Sent or in-flight campaigns can no longer be edited or re-sent
    pub fn is_locked(&self) -> bool {
        self.status == STATUS_SENT || self.status == STATUS_SENDING
    }
}
