//! Blog (journal) service - business logic without the HTTP layer
//!
//! Handlers and the scheduler call these with the blog repository.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::domain::{BlogFilter, BlogRepository, DomainError, PaginatedBlogs};
use crate::infrastructure::config::Config;
use crate::models::Blog;
use crate::models::blog::{STATUS_DRAFT, STATUS_PUBLISHED, STATUS_SCHEDULED};
use crate::utils::text::{reading_minutes, slugify};
use crate::utils::time::{normalize_ts, now_ts, parse_ts};

pub const RSS_ITEMS: u64 = 20;

/// Fields an admin may write
#[derive(Debug, Clone, Default, Deserialize, utoipa::ToSchema)]
pub struct BlogInput {
    pub title: String,
    pub slug: Option<String>,
    pub excerpt: Option<String>,
    #[serde(default)]
    pub content: String,
    pub cover_image_url: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub status: Option<String>,
    pub scheduled_at: Option<String>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq, utoipa::ToSchema)]
pub struct TagCount {
    pub name: String,
    pub count: usize,
}

fn clean_tags(tags: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for tag in tags {
        let tag = tag.trim().to_lowercase();
        if !tag.is_empty() && !out.contains(&tag) {
            out.push(tag);
        }
    }
    out
}

fn future_timestamp(value: &str) -> Result<String, DomainError> {
    let at = parse_ts(value)
        .ok_or_else(|| DomainError::validation("scheduled_at must be an RFC 3339 timestamp"))?;
    if at <= Utc::now() {
        return Err(DomainError::validation("scheduled_at must be in the future"));
    }
    normalize_ts(value).ok_or_else(|| DomainError::validation("invalid scheduled_at"))
}

/// First free slug: `base`, then `base-2`, `base-3`...
async fn unique_slug(
    repo: &dyn BlogRepository,
    base: &str,
    except_id: Option<i32>,
) -> Result<String, DomainError> {
    let base = if base.is_empty() { "post" } else { base };
    if !repo.slug_exists(base, except_id).await? {
        return Ok(base.to_string());
    }
    let mut n = 2;
    loop {
        let candidate = format!("{}-{}", base, n);
        if !repo.slug_exists(&candidate, except_id).await? {
            return Ok(candidate);
        }
        n += 1;
    }
}

/// Turn admin input into a stored blog, keeping what must survive from `existing`
async fn prepare(
    repo: &dyn BlogRepository,
    input: BlogInput,
    existing: Option<&Blog>,
) -> Result<Blog, DomainError> {
    let title = input.title.trim().to_string();
    if title.is_empty() {
        return Err(DomainError::validation("title is required"));
    }

    // Status only changes when asked for; edits leave it as is
    let status = input
        .status
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .or_else(|| existing.map(|b| b.status.clone()))
        .unwrap_or_else(|| STATUS_DRAFT.to_string());

    let except_id = existing.and_then(|b| b.id);
    let requested = input
        .slug
        .as_deref()
        .map(slugify)
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| match existing {
            Some(blog) => blog.slug.clone(),
            None => slugify(&title),
        });
    let slug = unique_slug(repo, &requested, except_id).await?;

    let mut published_at = existing.and_then(|b| b.published_at.clone());
    let scheduled_at = match status.as_str() {
        STATUS_DRAFT => None,
        STATUS_SCHEDULED => {
            let kept = existing
                .filter(|b| b.status == STATUS_SCHEDULED)
                .and_then(|b| b.scheduled_at.clone());
            match (input.scheduled_at.as_deref(), kept) {
                (Some(at), Some(kept)) if at == kept => Some(kept),
                (Some(at), _) => Some(future_timestamp(at)?),
                (None, Some(kept)) => Some(kept),
                (None, None) => {
                    return Err(DomainError::validation(
                        "scheduled_at is required to schedule",
                    ));
                }
            }
        }
        STATUS_PUBLISHED => {
            if published_at.is_none() {
                published_at = Some(now_ts());
            }
            None
        }
        other => {
            return Err(DomainError::validation(format!(
                "unknown status '{}'",
                other
            )));
        }
    };

    Ok(Blog {
        id: except_id,
        reading_minutes: reading_minutes(&input.content),
        title,
        slug,
        excerpt: input.excerpt.filter(|e| !e.trim().is_empty()),
        content: input.content,
        cover_image_url: input.cover_image_url.filter(|u| !u.trim().is_empty()),
        tags: clean_tags(input.tags),
        status,
        scheduled_at,
        published_at,
        view_count: existing.map(|b| b.view_count).unwrap_or(0),
        meta_title: input.meta_title,
        meta_description: input.meta_description,
        created_at: None,
        updated_at: None,
    })
}

fn to_input(blog: Blog) -> BlogInput {
    BlogInput {
        title: blog.title,
        slug: Some(blog.slug),
        excerpt: blog.excerpt,
        content: blog.content,
        cover_image_url: blog.cover_image_url,
        tags: blog.tags,
        status: Some(blog.status),
        scheduled_at: blog.scheduled_at,
        meta_title: blog.meta_title,
        meta_description: blog.meta_description,
    }
}

// --- Public ---

pub async fn list_published(
    repo: &dyn BlogRepository,
    tag: Option<String>,
    query: Option<String>,
    page: Option<u64>,
    limit: Option<u64>,
) -> Result<PaginatedBlogs, DomainError> {
    repo.find_all(BlogFilter {
        status: Some(STATUS_PUBLISHED.to_string()),
        tag: tag.map(|t| t.trim().to_lowercase()),
        query,
        page,
        limit: Some(limit.unwrap_or(10).clamp(1, 100)),
    })
    .await
}

/// Published blog by slug; counts the view
pub async fn get_published(repo: &dyn BlogRepository, slug: &str) -> Result<Blog, DomainError> {
    let mut blog = repo
        .find_by_slug(slug)
        .await?
        .filter(|b| b.status == STATUS_PUBLISHED)
        .ok_or(DomainError::NotFound)?;

    if let Some(id) = blog.id {
        repo.increment_views(id).await?;
        blog.view_count += 1;
    }
    Ok(blog)
}

/// Tag usage across published blogs, most used first
pub async fn tag_counts(repo: &dyn BlogRepository) -> Result<Vec<TagCount>, DomainError> {
    let published = repo
        .find_all(BlogFilter {
            status: Some(STATUS_PUBLISHED.to_string()),
            ..Default::default()
        })
        .await?;

    let mut counts: HashMap<String, usize> = HashMap::new();
    for blog in published.blogs {
        for tag in blog.tags {
            *counts.entry(tag).or_insert(0) += 1;
        }
    }

    let mut tags: Vec<TagCount> = counts
        .into_iter()
        .map(|(name, count)| TagCount { name, count })
        .collect();
    tags.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
    Ok(tags)
}

pub async fn latest_published(repo: &dyn BlogRepository, n: u64) -> Result<Vec<Blog>, DomainError> {
    Ok(list_published(repo, None, None, Some(0), Some(n)).await?.blogs)
}

// --- Admin ---

pub async fn list(repo: &dyn BlogRepository, filter: BlogFilter) -> Result<PaginatedBlogs, DomainError> {
    repo.find_all(filter).await
}

pub async fn get(repo: &dyn BlogRepository, id: i32) -> Result<Blog, DomainError> {
    repo.find_by_id(id).await?.ok_or(DomainError::NotFound)
}

pub async fn create(repo: &dyn BlogRepository, input: BlogInput) -> Result<Blog, DomainError> {
    let blog = prepare(repo, input, None).await?;
    let created = repo.create(blog).await?;
    tracing::info!("📝 Blog '{}' created ({})", created.slug, created.status);
    Ok(created)
}

pub async fn update(
    repo: &dyn BlogRepository,
    id: i32,
    input: BlogInput,
) -> Result<Blog, DomainError> {
    let existing = get(repo, id).await?;
    let blog = prepare(repo, input, Some(&existing)).await?;
    repo.update(id, blog).await
}

pub async fn delete(repo: &dyn BlogRepository, id: i32) -> Result<(), DomainError> {
    repo.delete(id).await
}

pub async fn publish(repo: &dyn BlogRepository, id: i32) -> Result<Blog, DomainError> {
    let existing = get(repo, id).await?;
    let mut input = to_input(existing);
    input.status = Some(STATUS_PUBLISHED.to_string());
    input.scheduled_at = None;
    update(repo, id, input).await
}

/// Back to draft; `published_at` is kept for a later re-publish
pub async fn unpublish(repo: &dyn BlogRepository, id: i32) -> Result<Blog, DomainError> {
    let existing = get(repo, id).await?;
    let mut input = to_input(existing);
    input.status = Some(STATUS_DRAFT.to_string());
    update(repo, id, input).await
}

pub async fn schedule(repo: &dyn BlogRepository, id: i32, at: &str) -> Result<Blog, DomainError> {
    let existing = get(repo, id).await?;
    let mut input = to_input(existing);
    input.status = Some(STATUS_SCHEDULED.to_string());
    input.scheduled_at = Some(at.to_string());
    update(repo, id, input).await
}

/// Publish every scheduled blog whose time has come. Returns how many went live.
pub async fn publish_due(repo: &dyn BlogRepository) -> Result<usize, DomainError> {
    let due = repo.find_due(&now_ts()).await?;
    let mut published = 0;

    for blog in due {
        let Some(id) = blog.id else { continue };
        match publish(repo, id).await {
            Ok(b) => {
                tracing::info!("📰 Scheduled blog '{}' published", b.slug);
                published += 1;
            }
            Err(e) => tracing::error!("❌ Failed to publish blog #{}: {}", id, e),
        }
    }

    Ok(published)
}

// --- RSS ---

#[derive(Serialize)]
struct Rss {
    #[serde(rename = "@version")]
    version: &'static str,
    channel: Channel,
}

#[derive(Serialize)]
struct Channel {
    title: String,
    link: String,
    description: String,
    #[serde(rename = "lastBuildDate")]
    last_build_date: String,
    #[serde(rename = "item")]
    items: Vec<RssItem>,
}

#[derive(Serialize)]
struct RssItem {
    title: String,
    link: String,
    guid: String,
    #[serde(rename = "pubDate", skip_serializing_if = "Option::is_none")]
    pub_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    category: Vec<String>,
}

/// RSS 2.0 document of the latest published posts
pub async fn rss_feed(repo: &dyn BlogRepository, config: &Config) -> Result<String, DomainError> {
    let blogs = latest_published(repo, RSS_ITEMS).await?;

    let items = blogs
        .into_iter()
        .map(|blog| {
            let link = config.blog_url(&blog.slug);
            RssItem {
                title: blog.title,
                guid: link.clone(),
                link,
                pub_date: blog
                    .published_at
                    .as_deref()
                    .and_then(parse_ts)
                    .map(|dt| dt.to_rfc2822()),
                description: blog.excerpt,
                category: blog.tags,
            }
        })
        .collect();

    let rss = Rss {
        version: "2.0",
        channel: Channel {
            title: config.site_name.clone(),
            link: format!("{}/journal", config.public_base_url),
            description: format!("Latest posts from {}", config.site_name),
            last_build_date: Utc::now().to_rfc2822(),
            items,
        },
    };

    let body = quick_xml::se::to_string_with_root("rss", &rss)
        .map_err(|e| DomainError::Internal(format!("RSS serialization failed: {}", e)))?;
    Ok(format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n{}", body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::SeaOrmBlogRepository;
    use crate::infrastructure::db::init_db;

    async fn repo() -> SeaOrmBlogRepository {
        let db = init_db("sqlite::memory:").await.expect("db");
        SeaOrmBlogRepository::new(db)
    }

    fn input(title: &str) -> BlogInput {
        BlogInput {
            title: title.to_string(),
            content: "word ".repeat(450),
            tags: vec!["Rust".into(), " rust ".into(), "Web".into()],
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_slug_collisions_get_suffixes() {
        let repo = repo().await;
        let a = create(&repo, input("Hello World")).await.unwrap();
        let b = create(&repo, input("Hello, world!")).await.unwrap();
        let c = create(&repo, input("hello world")).await.unwrap();
        assert_eq!(a.slug, "hello-world");
        assert_eq!(b.slug, "hello-world-2");
        assert_eq!(c.slug, "hello-world-3");
        assert_eq!(a.reading_minutes, 3);
        assert_eq!(a.tags, vec!["rust", "web"]);
    }

    #[tokio::test]
    async fn test_update_keeps_own_slug() {
        let repo = repo().await;
        let a = create(&repo, input("Stable")).await.unwrap();
        let mut edit = input("Stable");
        edit.content = "short".into();
        let updated = update(&repo, a.id.unwrap(), edit).await.unwrap();
        assert_eq!(updated.slug, "stable");
        assert_eq!(updated.reading_minutes, 1);
    }

    #[tokio::test]
    async fn test_republish_keeps_first_published_at() {
        let repo = repo().await;
        let blog = create(&repo, input("Once")).await.unwrap();
        let id = blog.id.unwrap();

        let first = publish(&repo, id).await.unwrap();
        let published_at = first.published_at.clone();
        assert!(published_at.is_some());

        let draft = unpublish(&repo, id).await.unwrap();
        assert_eq!(draft.status, STATUS_DRAFT);
        let again = publish(&repo, id).await.unwrap();
        assert_eq!(again.published_at, published_at);
    }

    #[tokio::test]
    async fn test_edit_without_status_keeps_it() {
        let repo = repo().await;
        let mut live = input("Evergreen");
        live.status = Some(STATUS_PUBLISHED.into());
        let blog = create(&repo, live).await.unwrap();
        let id = blog.id.unwrap();

        let mut edit = input("Evergreen, revised");
        edit.content = "Fresh words".into();
        let edited = update(&repo, id, edit).await.unwrap();
        assert_eq!(edited.status, STATUS_PUBLISHED);
        assert_eq!(edited.published_at, blog.published_at);
        let listed = list_published(&repo, None, None, None, None).await.unwrap();
        assert_eq!(listed.total, 1);

        let later = create(&repo, input("Queued")).await.unwrap();
        let later_id = later.id.unwrap();
        schedule(&repo, later_id, "2999-01-01T00:00:00Z").await.unwrap();
        let edited = update(&repo, later_id, input("Queued, retitled")).await.unwrap();
        assert_eq!(edited.status, STATUS_SCHEDULED);
        assert_eq!(edited.scheduled_at.as_deref(), Some("2999-01-01T00:00:00Z"));

        // Explicit status still wins
        let mut to_draft = input("Queued, retitled");
        to_draft.status = Some(STATUS_DRAFT.into());
        let drafted = update(&repo, later_id, to_draft).await.unwrap();
        assert_eq!(drafted.status, STATUS_DRAFT);
        assert_eq!(drafted.scheduled_at, None);
    }

    #[tokio::test]
    async fn test_schedule_requires_future() {
        let repo = repo().await;
        let blog = create(&repo, input("Later")).await.unwrap();
        let err = schedule(&repo, blog.id.unwrap(), "2001-01-01T00:00:00Z")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        let ok = schedule(&repo, blog.id.unwrap(), "2999-01-01T00:00:00+01:00")
            .await
            .unwrap();
        assert_eq!(ok.status, STATUS_SCHEDULED);
        assert_eq!(ok.scheduled_at.as_deref(), Some("2998-12-31T23:00:00Z"));
    }

    #[tokio::test]
    async fn test_public_reads_hide_drafts() {
        let repo = repo().await;
        create(&repo, input("Draft only")).await.unwrap();
        let mut live = input("Live");
        live.status = Some(STATUS_PUBLISHED.into());
        create(&repo, live).await.unwrap();

        let listed = list_published(&repo, None, None, None, None).await.unwrap();
        assert_eq!(listed.total, 1);
        assert!(matches!(
            get_published(&repo, "draft-only").await,
            Err(DomainError::NotFound)
        ));
        let read = get_published(&repo, "live").await.unwrap();
        assert_eq!(read.view_count, 1);

        let tags = tag_counts(&repo).await.unwrap();
        assert_eq!(tags[0], TagCount { name: "rust".into(), count: 1 });
    }

    #[tokio::test]
    async fn test_rss_contains_published_items() {
        let repo = repo().await;
        let mut live = input("Feed me");
        live.status = Some(STATUS_PUBLISHED.into());
        live.excerpt = Some("Fish & chips".into());
        create(&repo, live).await.unwrap();

        let xml = rss_feed(&repo, &Config::default()).await.unwrap();
        assert!(xml.starts_with("<?xml"));
        assert!(xml.contains("<rss version=\"2.0\">"));
        assert!(xml.contains("<link>http://localhost:8000/journal/feed-me</link>"));
        assert!(xml.contains("Fish &amp; chips"));
    }
}
