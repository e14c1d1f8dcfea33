use crate::api;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

#[derive(OpenApi)]
#[openapi(
    paths(
        api::health::health_check,
        api::auth::setup,
        api::auth::login,
        api::site::home,
        api::blog::list_published,
        api::blog::get_published,
        api::contact::submit,
        api::newsletter::subscribe,
        api::podcast::apply,
        api::dashboard::stats,
        api::ai::generate,
    ),
    components(
        schemas(
            api::auth::Credentials,
            api::blog::ScheduleRequest,
            crate::models::Blog,
            crate::models::BlogSummary,
            crate::models::SocialPost,
            crate::services::blog_service::BlogInput,
            crate::services::blog_service::TagCount,
            crate::services::contact_service::ContactRequest,
            crate::services::newsletter_service::SubscribeRequest,
            crate::services::newsletter_service::ImportSummary,
            crate::services::newsletter_service::SyncSummary,
            crate::services::campaign_service::CampaignInput,
            crate::services::podcast_service::ApplicationRequest,
            crate::services::podcast_service::ReviewRequest,
            crate::services::media_service::MediaInput,
            crate::services::task_service::TaskInput,
            crate::services::ai_service::IntegrationInput,
            crate::services::ai_service::IntegrationView,
            crate::services::ai_service::GenerateKind,
            crate::services::ai_service::GenerateRequest,
            crate::services::ai_service::GenerateResponse,
            crate::services::dashboard_service::DashboardStats,
            crate::services::dashboard_service::BlogCounts,
            crate::services::inbox_service::InboxSyncSummary,
            crate::services::social_service::FromBlogRequest,
            crate::scheduler::JobUpdate,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "brandhub", description = "BrandHub API")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_documented_bodies_resolve() {
        let doc = ApiDoc::openapi();
        for path in ["/api/admin/ai/generate", "/api/blogs/{slug}", "/api/admin/dashboard"] {
            assert!(doc.paths.paths.contains_key(path), "missing {}", path);
        }
        let components = doc.components.expect("components");
        for schema in ["GenerateResponse", "Blog", "DashboardStats"] {
            assert!(components.schemas.contains_key(schema), "missing {}", schema);
        }
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
