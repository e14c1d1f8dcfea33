use axum::{
    Json,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;

use crate::domain::BlogFilter;
use crate::infrastructure::AppState;
use crate::models::BlogSummary;
use crate::services::blog_service::{self, BlogInput};

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct PublicBlogQuery {
    pub tag: Option<String>,
    pub q: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct AdminBlogQuery {
    pub status: Option<String>,
    pub q: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct ScheduleRequest {
    pub scheduled_at: String,
}

// --- Public ---

#[utoipa::path(
    get,
    path = "/api/blogs",
    params(PublicBlogQuery),
    responses((status = 200, description = "Published blogs, newest first"))
)]
pub async fn list_published(
    State(state): State<AppState>,
    Query(params): Query<PublicBlogQuery>,
) -> impl IntoResponse {
    match blog_service::list_published(
        state.blog_repo.as_ref(),
        params.tag,
        params.q,
        params.page,
        params.limit,
    )
    .await
    {
        Ok(page) => {
            let blogs: Vec<BlogSummary> = page.blogs.into_iter().map(BlogSummary::from).collect();
            (
                StatusCode::OK,
                Json(json!({ "blogs": blogs, "total": page.total })),
            )
                .into_response()
        }
        Err(e) => e.into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/blogs/{slug}",
    params(("slug" = String, Path, description = "Blog slug")),
    responses(
        (status = 200, description = "Published blog", body = crate::models::Blog),
        (status = 404, description = "No published blog with that slug")
    )
)]
pub async fn get_published(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> impl IntoResponse {
    match blog_service::get_published(state.blog_repo.as_ref(), &slug).await {
        Ok(blog) => (StatusCode::OK, Json(json!(blog))).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn list_tags(State(state): State<AppState>) -> impl IntoResponse {
    match blog_service::tag_counts(state.blog_repo.as_ref()).await {
        Ok(tags) => (StatusCode::OK, Json(json!({ "tags": tags }))).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn rss_feed(State(state): State<AppState>) -> impl IntoResponse {
    match blog_service::rss_feed(state.blog_repo.as_ref(), &state.config).await {
        Ok(xml) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/rss+xml; charset=utf-8")],
            xml,
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

// --- Admin ---

pub async fn list_all(
    State(state): State<AppState>,
    Query(params): Query<AdminBlogQuery>,
) -> impl IntoResponse {
    let filter = BlogFilter {
        status: params.status,
        tag: None,
        query: params.q,
        page: params.page,
        limit: params.limit,
    };
    match blog_service::list(state.blog_repo.as_ref(), filter).await {
        Ok(page) => (
            StatusCode::OK,
            Json(json!({ "blogs": page.blogs, "total": page.total })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn get_blog(State(state): State<AppState>, Path(id): Path<i32>) -> impl IntoResponse {
    match blog_service::get(state.blog_repo.as_ref(), id).await {
        Ok(blog) => (StatusCode::OK, Json(json!(blog))).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn create_blog(
    State(state): State<AppState>,
    Json(input): Json<BlogInput>,
) -> impl IntoResponse {
    match blog_service::create(state.blog_repo.as_ref(), input).await {
        Ok(blog) => (
            StatusCode::CREATED,
            Json(json!({ "message": "Blog created successfully", "blog": blog })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn update_blog(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(input): Json<BlogInput>,
) -> impl IntoResponse {
    match blog_service::update(state.blog_repo.as_ref(), id, input).await {
        Ok(blog) => (StatusCode::OK, Json(json!({ "blog": blog }))).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn delete_blog(State(state): State<AppState>, Path(id): Path<i32>) -> impl IntoResponse {
    match blog_service::delete(state.blog_repo.as_ref(), id).await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "message": "Blog deleted successfully" })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn publish_blog(State(state): State<AppState>, Path(id): Path<i32>) -> impl IntoResponse {
    match blog_service::publish(state.blog_repo.as_ref(), id).await {
        Ok(blog) => (StatusCode::OK, Json(json!({ "blog": blog }))).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn unpublish_blog(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> impl IntoResponse {
    match blog_service::unpublish(state.blog_repo.as_ref(), id).await {
        Ok(blog) => (StatusCode::OK, Json(json!({ "blog": blog }))).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn schedule_blog(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<ScheduleRequest>,
) -> impl IntoResponse {
    match blog_service::schedule(state.blog_repo.as_ref(), id, &payload.scheduled_at).await {
        Ok(blog) => (StatusCode::OK, Json(json!({ "blog": blog }))).into_response(),
        Err(e) => e.into_response(),
    }
}
