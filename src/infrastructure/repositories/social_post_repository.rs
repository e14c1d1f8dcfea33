//! SeaORM implementation of SocialPostRepository

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, sea_query::Expr,
};

use crate::domain::{
    DomainError, PublishOutcome, SocialPostFilter, SocialPostInput, SocialPostRepository,
};
use crate::models::SocialPost;
use crate::models::social_post::{self, ActiveModel, Column, Entity as SocialPostEntity};
use crate::utils::text::to_json_list;
use crate::utils::time::now_ts;

pub struct SeaOrmSocialPostRepository {
    db: DatabaseConnection,
}

impl SeaOrmSocialPostRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn apply(active: &mut ActiveModel, input: SocialPostInput) {
    active.platform = Set(input.platform);
    active.content = Set(input.content);
    active.media_urls = Set(to_json_list(&input.media_urls));
    active.link_url = Set(input.link_url);
    active.status = Set(input.status);
    active.scheduled_at = Set(input.scheduled_at);
    active.blog_id = Set(input.blog_id);
}

#[async_trait]
impl SocialPostRepository for SeaOrmSocialPostRepository {
    async fn find_all(&self, filter: SocialPostFilter) -> Result<Vec<SocialPost>, DomainError> {
        let mut query = SocialPostEntity::find();

        if let Some(platform) = &filter.platform
            && !platform.is_empty()
        {
            query = query.filter(Column::Platform.eq(platform.as_str()));
        }
        if let Some(status) = &filter.status
            && !status.is_empty()
        {
            query = query.filter(Column::Status.eq(status.as_str()));
        }

        let posts = query
            .order_by_desc(Column::ScheduledAt)
            .order_by_desc(Column::CreatedAt)
            .all(&self.db)
            .await?;
        Ok(posts.into_iter().map(SocialPost::from).collect())
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<SocialPost>, DomainError> {
        let post = SocialPostEntity::find_by_id(id).one(&self.db).await?;
        Ok(post.map(SocialPost::from))
    }

    async fn create(&self, input: SocialPostInput) -> Result<SocialPost, DomainError> {
        let now = now_ts();
        let mut active = ActiveModel {
            attempts: Set(0),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };
        apply(&mut active, input);
        Ok(SocialPost::from(active.insert(&self.db).await?))
    }

    async fn update(&self, id: i32, input: SocialPostInput) -> Result<SocialPost, DomainError> {
        let existing = SocialPostEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(DomainError::NotFound)?;

        let mut active: ActiveModel = existing.into();
        apply(&mut active, input);
        active.error_message = Set(None);
        active.updated_at = Set(now_ts());
        Ok(SocialPost::from(active.update(&self.db).await?))
    }

    async fn delete(&self, id: i32) -> Result<(), DomainError> {
        let result = SocialPostEntity::delete_by_id(id).exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Err(DomainError::NotFound);
        }
        Ok(())
    }

    async fn find_due(&self, now: &str) -> Result<Vec<SocialPost>, DomainError> {
        let posts = SocialPostEntity::find()
            .filter(Column::Status.eq(social_post::STATUS_SCHEDULED))
            .filter(Column::ScheduledAt.lte(now))
            .order_by_asc(Column::ScheduledAt)
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await?;
        Ok(posts.into_iter().map(SocialPost::from).collect())
    }

    async fn claim(&self, id: i32) -> Result<bool, DomainError> {
        // Conditional update so a manual publish and the scheduler cannot both send
        let result = SocialPostEntity::update_many()
            .col_expr(
                Column::Status,
                Expr::value(social_post::STATUS_PUBLISHING),
            )
            .col_expr(Column::UpdatedAt, Expr::value(now_ts()))
            .filter(Column::Id.eq(id))
            .filter(Column::Status.is_in([
                social_post::STATUS_DRAFT,
                social_post::STATUS_SCHEDULED,
                social_post::STATUS_FAILED,
            ]))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected == 1)
    }

    async fn record_outcome(
        &self,
        id: i32,
        outcome: PublishOutcome,
    ) -> Result<SocialPost, DomainError> {
        let existing = SocialPostEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(DomainError::NotFound)?;

        let attempts = existing.attempts + 1;
        let mut active: ActiveModel = existing.into();
        let now = now_ts();

        match outcome {
            PublishOutcome::Published {
                external_id,
                external_url,
            } => {
                active.status = Set(social_post::STATUS_PUBLISHED.to_string());
                active.external_post_id = Set(Some(external_id));
                active.external_url = Set(external_url);
                active.published_at = Set(Some(now.clone()));
                active.error_message = Set(None);
            }
            PublishOutcome::Failed { error } => {
                active.status = Set(social_post::STATUS_FAILED.to_string());
                active.error_message = Set(Some(error));
            }
        }
        active.attempts = Set(attempts);
        active.updated_at = Set(now);

        Ok(SocialPost::from(active.update(&self.db).await?))
    }

    async fn count_by_status(&self, status: &str) -> Result<u64, DomainError> {
        Ok(SocialPostEntity::find()
            .filter(Column::Status.eq(status))
            .count(&self.db)
            .await?)
    }
}
