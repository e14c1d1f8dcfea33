use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use brandhub::auth::create_jwt;
use brandhub::config::Config;
use brandhub::{AppState, db, server};
use serde_json::{Value, json};
use tower::util::ServiceExt; // for `oneshot`

// Helper to create an app over an in-memory database, with an admin token
async fn setup_app() -> (Router, String) {
    let db = db::init_db("sqlite::memory:")
        .await
        .expect("Failed to init DB");
    let app = server::build_router(AppState::new(db, Config::default()));
    let token = create_jwt("admin", "admin").expect("Failed to create JWT");
    (app, token)
}

async fn call(
    app: &Router,
    method: &str,
    uri: &str,
    token: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let builder = Request::builder()
        .uri(uri)
        .method(method)
        .header("Authorization", format!("Bearer {}", token));
    let req = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

#[tokio::test]
async fn test_not_found_errors() {
    let (app, token) = setup_app().await;

    let (status, body) = call(&app, "GET", "/api/admin/blogs/999", &token, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Resource not found");

    let (status, _) = call(&app, "DELETE", "/api/admin/campaigns/42", &token, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = call(&app, "DELETE", "/api/admin/tasks/7", &token, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = call(
        &app,
        "POST",
        "/api/admin/scheduler/jobs/make_coffee/run",
        &token,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = call(&app, "DELETE", "/api/admin/accounts/linkedin", &token, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_validation_errors() {
    let (app, token) = setup_app().await;

    // Blog without a title
    let (status, body) = call(
        &app,
        "POST",
        "/api/admin/blogs",
        &token,
        Some(json!({ "title": "   ", "content": "x" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    // Scheduling in the past
    let (_, created) = call(
        &app,
        "POST",
        "/api/admin/blogs",
        &token,
        Some(json!({ "title": "Past", "content": "x" })),
    )
    .await;
    let id = created["blog"]["id"].as_i64().unwrap();
    let (status, _) = call(
        &app,
        "POST",
        &format!("/api/admin/blogs/{}/schedule", id),
        &token,
        Some(json!({ "scheduled_at": "2001-01-01T00:00:00Z" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Tweet over the length limit
    let (status, _) = call(
        &app,
        "POST",
        "/api/admin/social/posts",
        &token,
        Some(json!({ "platform": "twitter", "content": "x".repeat(300) })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Gmail is not a publishing platform
    let (status, _) = call(
        &app,
        "POST",
        "/api/admin/social/posts",
        &token,
        Some(json!({ "platform": "google", "content": "hello" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Scheduler interval below the minimum
    let (status, _) = call(
        &app,
        "PUT",
        "/api/admin/scheduler/jobs/publish_social",
        &token,
        Some(json!({ "interval_secs": 5 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Unknown provider
    let (status, _) = call(&app, "POST", "/api/admin/oauth/myspace/begin", &token, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_conflict_errors() {
    let (app, token) = setup_app().await;

    let (_, created) = call(
        &app,
        "POST",
        "/api/admin/social/posts",
        &token,
        Some(json!({ "platform": "linkedin", "content": "Draft post" })),
    )
    .await;
    let id = created["post"]["id"].as_i64().unwrap();

    // Only failed posts can be retried
    let (status, _) = call(
        &app,
        "POST",
        &format!("/api/admin/social/posts/{}/retry", id),
        &token,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = call(
        &app,
        "POST",
        "/api/auth/setup",
        &token,
        Some(json!({ "username": "first", "password": "password123" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = call(
        &app,
        "POST",
        "/api/auth/setup",
        &token,
        Some(json!({ "username": "second", "password": "password123" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_missing_integrations_return_service_unavailable() {
    let (app, token) = setup_app().await;

    let (_, created) = call(
        &app,
        "POST",
        "/api/admin/campaigns",
        &token,
        Some(json!({ "subject": "Monthly notes", "content_html": "<p>Hi</p>" })),
    )
    .await;
    let id = created["campaign"]["id"].as_i64().unwrap();

    let (status, body) = call(
        &app,
        "POST",
        &format!("/api/admin/campaigns/{}/send", id),
        &token,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(body["error"].as_str().unwrap().contains("Sender.net"));

    let (status, _) = call(&app, "POST", "/api/admin/inbox/sync", &token, None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    let (status, _) = call(&app, "POST", "/api/admin/oauth/google/begin", &token, None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    let (status, _) = call(
        &app,
        "POST",
        "/api/admin/ai/generate",
        &token,
        Some(json!({ "kind": "blog_ideas", "topic": "remote work" })),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    // A draft post whose platform is not connected fails; the failure is stored
    let (_, created) = call(
        &app,
        "POST",
        "/api/admin/social/posts",
        &token,
        Some(json!({ "platform": "twitter", "content": "Hello" })),
    )
    .await;
    let id = created["post"]["id"].as_i64().unwrap();
    let (status, body) = call(
        &app,
        "POST",
        &format!("/api/admin/social/posts/{}/publish", id),
        &token,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["post"]["status"], "failed");
    assert!(body["post"]["error_message"].is_string());
}
