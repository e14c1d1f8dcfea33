//! SeaORM implementation of SubscriberRepository

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};

use crate::domain::{DomainError, PaginatedSubscribers, SubscriberFilter, SubscriberRepository};
use crate::models::subscriber::{self, ActiveModel, Column, Entity as SubscriberEntity};
use crate::utils::time::now_ts;

pub struct SeaOrmSubscriberRepository {
    db: DatabaseConnection,
}

impl SeaOrmSubscriberRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn get(&self, id: i32) -> Result<subscriber::Model, DomainError> {
        SubscriberEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(DomainError::NotFound)
    }
}

#[async_trait]
impl SubscriberRepository for SeaOrmSubscriberRepository {
    async fn find_all(&self, filter: SubscriberFilter) -> Result<PaginatedSubscribers, DomainError> {
        let mut query = SubscriberEntity::find();

        if let Some(status) = &filter.status
            && !status.is_empty()
        {
            query = query.filter(Column::Status.eq(status.as_str()));
        }

        if let Some(q) = &filter.query
            && !q.is_empty()
        {
            query = query.filter(Column::Email.contains(q.to_lowercase()));
        }

        query = query.order_by_desc(Column::CreatedAt).order_by_desc(Column::Id);

        let (subscribers, total) = if let Some(limit) = filter.limit {
            let paginator = query.paginate(&self.db, limit);
            let total = paginator.num_items().await?;
            let items = paginator.fetch_page(filter.page.unwrap_or(0)).await?;
            (items, total)
        } else {
            let items = query.all(&self.db).await?;
            let total = items.len() as u64;
            (items, total)
        };

        Ok(PaginatedSubscribers { subscribers, total })
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<subscriber::Model>, DomainError> {
        Ok(SubscriberEntity::find_by_id(id).one(&self.db).await?)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<subscriber::Model>, DomainError> {
        Ok(SubscriberEntity::find()
            .filter(Column::Email.eq(email))
            .one(&self.db)
            .await?)
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<subscriber::Model>, DomainError> {
        Ok(SubscriberEntity::find()
            .filter(Column::UnsubscribeToken.eq(token))
            .one(&self.db)
            .await?)
    }

    async fn upsert_active(
        &self,
        email: &str,
        name: Option<String>,
        source: Option<String>,
    ) -> Result<(subscriber::Model, bool), DomainError> {
        let now = now_ts();

        if let Some(existing) = self.find_by_email(email).await? {
            let mut active: ActiveModel = existing.into();
            active.status = Set(subscriber::STATUS_ACTIVE.to_string());
            if name.is_some() {
                active.name = Set(name);
            }
            active.sender_synced = Set(false);
            active.updated_at = Set(now);
            let model = active.update(&self.db).await?;
            return Ok((model, false));
        }

        let model = ActiveModel {
            email: Set(email.to_string()),
            name: Set(name),
            status: Set(subscriber::STATUS_ACTIVE.to_string()),
            source: Set(source),
            unsubscribe_token: Set(uuid::Uuid::new_v4().simple().to_string()),
            sender_synced: Set(false),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;

        Ok((model, true))
    }

    async fn set_status(&self, id: i32, status: &str) -> Result<subscriber::Model, DomainError> {
        let mut active: ActiveModel = self.get(id).await?.into();
        active.status = Set(status.to_string());
        active.updated_at = Set(now_ts());
        Ok(active.update(&self.db).await?)
    }

    async fn set_synced(&self, id: i32, synced: bool) -> Result<(), DomainError> {
        let mut active: ActiveModel = self.get(id).await?.into();
        active.sender_synced = Set(synced);
        active.update(&self.db).await?;
        Ok(())
    }

    async fn find_unsynced_active(&self) -> Result<Vec<subscriber::Model>, DomainError> {
        Ok(SubscriberEntity::find()
            .filter(Column::Status.eq(subscriber::STATUS_ACTIVE))
            .filter(Column::SenderSynced.eq(false))
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await?)
    }

    async fn delete(&self, id: i32) -> Result<(), DomainError> {
        let result = SubscriberEntity::delete_by_id(id).exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Err(DomainError::NotFound);
        }
        Ok(())
    }

    async fn count_by_status(&self, status: &str) -> Result<u64, DomainError> {
        Ok(SubscriberEntity::find()
            .filter(Column::Status.eq(status))
            .count(&self.db)
            .await?)
    }
}
