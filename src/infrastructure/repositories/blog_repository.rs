//! SeaORM implementation of BlogRepository

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set, sea_query::Expr,
};

use crate::domain::{BlogFilter, BlogRepository, DomainError, PaginatedBlogs};
use crate::models::Blog;
use crate::models::blog::{self, ActiveModel, Column, Entity as BlogEntity};
use crate::utils::text::to_json_list;
use crate::utils::time::now_ts;

/// SeaORM-based implementation of BlogRepository
pub struct SeaOrmBlogRepository {
    db: DatabaseConnection,
}

impl SeaOrmBlogRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn apply(active: &mut ActiveModel, blog: Blog) {
    active.title = Set(blog.title);
    active.slug = Set(blog.slug);
    active.excerpt = Set(blog.excerpt);
    active.content = Set(blog.content);
    active.cover_image_url = Set(blog.cover_image_url);
    active.tags = Set(to_json_list(&blog.tags));
    active.status = Set(blog.status);
    active.scheduled_at = Set(blog.scheduled_at);
    active.published_at = Set(blog.published_at);
    active.reading_minutes = Set(blog.reading_minutes);
    active.meta_title = Set(blog.meta_title);
    active.meta_description = Set(blog.meta_description);
}

#[async_trait]
impl BlogRepository for SeaOrmBlogRepository {
    async fn find_all(&self, filter: BlogFilter) -> Result<PaginatedBlogs, DomainError> {
        let mut query = BlogEntity::find();

        if let Some(status) = &filter.status
            && !status.is_empty()
        {
            query = query.filter(Column::Status.eq(status.as_str()));
        }

        if let Some(tag) = &filter.tag
            && !tag.is_empty()
        {
            // Tags are a JSON array; match the quoted element
            query = query.filter(Column::Tags.contains(format!("\"{}\"", tag)));
        }

        if let Some(q) = &filter.query
            && !q.is_empty()
        {
            let cond = Condition::any()
                .add(Column::Title.contains(q))
                .add(Column::Excerpt.contains(q))
                .add(Column::Content.contains(q));
            query = query.filter(cond);
        }

        query = query
            .order_by_desc(Column::PublishedAt)
            .order_by_desc(Column::CreatedAt)
            .order_by_desc(Column::Id);

        let (blogs, total) = if let Some(limit) = filter.limit {
            let page = filter.page.unwrap_or(0);
            let paginator = query.paginate(&self.db, limit);
            let total = paginator.num_items().await?;
            let items = paginator.fetch_page(page).await?;
            (items, total)
        } else {
            let items = query.all(&self.db).await?;
            let total = items.len() as u64;
            (items, total)
        };

        Ok(PaginatedBlogs {
            blogs: blogs.into_iter().map(Blog::from).collect(),
            total,
        })
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Blog>, DomainError> {
        let blog = BlogEntity::find_by_id(id).one(&self.db).await?;
        Ok(blog.map(Blog::from))
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Blog>, DomainError> {
        let blog = BlogEntity::find()
            .filter(Column::Slug.eq(slug))
            .one(&self.db)
            .await?;
        Ok(blog.map(Blog::from))
    }

    async fn slug_exists(&self, slug: &str, except_id: Option<i32>) -> Result<bool, DomainError> {
        let mut query = BlogEntity::find().filter(Column::Slug.eq(slug));
        if let Some(id) = except_id {
            query = query.filter(Column::Id.ne(id));
        }
        Ok(query.count(&self.db).await? > 0)
    }

    async fn create(&self, blog: Blog) -> Result<Blog, DomainError> {
        let now = now_ts();
        let mut active = ActiveModel {
            view_count: Set(0),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };
        apply(&mut active, blog);

        let model = active.insert(&self.db).await?;
        Ok(Blog::from(model))
    }

    async fn update(&self, id: i32, blog: Blog) -> Result<Blog, DomainError> {
        let existing = BlogEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(DomainError::NotFound)?;

        let mut active: ActiveModel = existing.into();
        apply(&mut active, blog);
        active.updated_at = Set(now_ts());

        let model = active.update(&self.db).await?;
        Ok(Blog::from(model))
    }

    async fn delete(&self, id: i32) -> Result<(), DomainError> {
        let result = BlogEntity::delete_by_id(id).exec(&self.db).await?;

        if result.rows_affected == 0 {
            return Err(DomainError::NotFound);
        }

        Ok(())
    }

    async fn increment_views(&self, id: i32) -> Result<(), DomainError> {
        BlogEntity::update_many()
            .col_expr(Column::ViewCount, Expr::col(Column::ViewCount).add(1))
            .filter(Column::Id.eq(id))
            .exec(&self.db)
            .await?;
        Ok(())
    }

    async fn find_due(&self, now: &str) -> Result<Vec<Blog>, DomainError> {
        let blogs = BlogEntity::find()
            .filter(Column::Status.eq(blog::STATUS_SCHEDULED))
            .filter(Column::ScheduledAt.lte(now))
            .order_by_asc(Column::ScheduledAt)
            .all(&self.db)
            .await?;
        Ok(blogs.into_iter().map(Blog::from).collect())
    }
}
