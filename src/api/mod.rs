pub mod ai;
pub mod auth;
pub mod blog;
pub mod campaigns;
pub mod contact;
pub mod dashboard;
pub mod error;
pub mod health;
pub mod inbox;
pub mod media;
pub mod newsletter;
pub mod oauth;
pub mod podcast;
pub mod scheduler;
pub mod site;
pub mod social;
pub mod tasks;

use axum::{
    Router, middleware,
    routing::{get, post, put},
};

use crate::infrastructure::AppState;
use crate::infrastructure::auth::AdminUser;

pub fn api_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Auth
        .route("/auth/setup", post(auth::setup))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/me", get(auth::me))
        // Public site
        .route("/site/home", get(site::home))
        .route("/blogs", get(blog::list_published))
        .route("/blogs/tags", get(blog::list_tags))
        .route("/blogs/:slug", get(blog::get_published))
        .route("/feed.xml", get(blog::rss_feed))
        .route("/media", get(media::list_media))
        .route("/contact", post(contact::submit))
        .route("/podcast/apply", post(podcast::apply))
        // Newsletter
        .route("/newsletter/subscribe", post(newsletter::subscribe))
        .route(
            "/newsletter/unsubscribe",
            get(newsletter::unsubscribe_link).post(newsletter::unsubscribe),
        )
        // Provider redirect lands here without a session
        .route("/oauth/:provider/callback", get(oauth::callback))
        .nest("/admin", admin_router())
        .with_state(state)
}

fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(dashboard::stats))
        // Blogs
        .route("/blogs", get(blog::list_all).post(blog::create_blog))
        .route(
            "/blogs/:id",
            get(blog::get_blog)
                .put(blog::update_blog)
                .delete(blog::delete_blog),
        )
        .route("/blogs/:id/publish", post(blog::publish_blog))
        .route("/blogs/:id/unpublish", post(blog::unpublish_blog))
        .route("/blogs/:id/schedule", post(blog::schedule_blog))
        // Media
        .route("/media", get(media::list_media).post(media::create_media))
        .route(
            "/media/:id",
            put(media::update_media).delete(media::delete_media),
        )
        // Contact messages
        .route("/contact", get(contact::list_messages))
        .route(
            "/contact/:id",
            put(contact::update_status).delete(contact::delete_message),
        )
        .route("/contact/:id/reply", post(contact::reply))
        // Subscribers
        .route("/subscribers", get(newsletter::list_subscribers))
        .route("/subscribers/export", get(newsletter::export_csv))
        .route("/subscribers/import", post(newsletter::import_csv))
        .route("/subscribers/sync", post(newsletter::sync_all))
        .route(
            "/subscribers/:id",
            axum::routing::delete(newsletter::delete_subscriber),
        )
        .route("/newsletter/groups", get(newsletter::list_groups))
        // Campaigns
        .route(
            "/campaigns",
            get(campaigns::list_campaigns).post(campaigns::create_campaign),
        )
        .route(
            "/campaigns/:id",
            get(campaigns::get_campaign)
                .put(campaigns::update_campaign)
                .delete(campaigns::delete_campaign),
        )
        .route("/campaigns/:id/send", post(campaigns::send_campaign))
        .route("/campaigns/:id/schedule", post(campaigns::schedule_campaign))
        // Connected accounts
        .route("/oauth/:provider/begin", post(oauth::begin_authorization))
        .route("/accounts", get(oauth::list_accounts))
        .route("/accounts/:provider", axum::routing::delete(oauth::disconnect))
        .route("/accounts/:provider/refresh", post(oauth::refresh))
        // Social posts
        .route(
            "/social/posts",
            get(social::list_posts).post(social::create_post),
        )
        .route(
            "/social/posts/:id",
            get(social::get_post)
                .put(social::update_post)
                .delete(social::delete_post),
        )
        .route("/social/posts/:id/publish", post(social::publish_post))
        .route("/social/posts/:id/retry", post(social::retry_post))
        .route("/social/posts/:id/schedule", post(social::schedule_post))
        .route("/social/from-blog", post(social::from_blog))
        // Inbox and tasks
        .route("/inbox", get(inbox::list_emails))
        .route("/inbox/sync", post(inbox::sync_inbox))
        .route("/inbox/:id", get(inbox::get_email))
        .route("/inbox/:id/read", post(inbox::mark_read))
        .route("/inbox/:id/task", post(inbox::create_task))
        .route("/tasks", get(tasks::list_tasks).post(tasks::create_task))
        .route(
            "/tasks/:id",
            put(tasks::update_task).delete(tasks::delete_task),
        )
        // Podcast
        .route("/podcast/applications", get(podcast::list_applications))
        .route(
            "/podcast/applications/:id",
            put(podcast::review_application).delete(podcast::delete_application),
        )
        // AI
        .route(
            "/ai/integrations",
            get(ai::list_integrations).post(ai::create_integration),
        )
        .route(
            "/ai/integrations/:id",
            put(ai::update_integration).delete(ai::delete_integration),
        )
        .route("/ai/integrations/:id/default", post(ai::set_default))
        .route("/ai/generate", post(ai::generate))
        // Scheduler
        .route("/scheduler/jobs", get(scheduler::list_jobs))
        .route("/scheduler/jobs/:name", put(scheduler::update_job))
        .route("/scheduler/jobs/:name/run", post(scheduler::run_job))
        .route_layer(middleware::from_extractor::<AdminUser>())
}
