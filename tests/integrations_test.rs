//! Third-party flows against a wiremock server standing in for every provider.

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use brandhub::auth::create_jwt;
use brandhub::config::{Config, Endpoints, OAuthCredentials, ProviderCredentials, SenderConfig};
use brandhub::models::{social_account, social_post, subscriber};
use brandhub::{AppState, db, server};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use secrecy::SecretString;
use serde_json::{Value, json};
use tower::util::ServiceExt; // for `oneshot`
use wiremock::matchers::{
    body_partial_json, body_string_contains, header as header_eq, method, path, query_param,
};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn creds(id: &str) -> Option<OAuthCredentials> {
    Some(OAuthCredentials {
        client_id: id.to_string(),
        client_secret: SecretString::new(format!("{}-secret", id)),
    })
}

// Helper to create an app whose integrations all point at the mock server
async fn setup_app(mock: &MockServer) -> (Router, AppState, String) {
    let db = db::init_db("sqlite::memory:")
        .await
        .expect("Failed to init DB");
    let config = Config {
        public_base_url: "https://brand.example".to_string(),
        admin_app_url: "https://brand.example/admin".to_string(),
        oauth: ProviderCredentials {
            google: creds("google"),
            linkedin: creds("linkedin"),
            twitter: creds("twitter"),
            instagram: creds("instagram"),
            threads: creds("threads"),
        },
        sender: Some(SenderConfig {
            api_key: SecretString::new("sender-key".to_string()),
            group_id: Some("grp1".to_string()),
            from_email: "hello@brand.example".to_string(),
            from_name: "Brand".to_string(),
        }),
        endpoints: Endpoints::all(&mock.uri()),
        ..Config::default()
    };
    let state = AppState::new(db, config);
    let token = create_jwt("admin", "admin").expect("Failed to create JWT");
    (server::build_router(state.clone()), state, token)
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

/// Run the consent round trip: begin, then hit the callback with the issued state
async fn connect(app: &Router, token: &str, provider: &str) -> axum::response::Response {
    let (status, body) = call(
        app,
        "POST",
        &format!("/api/admin/oauth/{}/begin", provider),
        token,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let authorize = url::Url::parse(body["authorize_url"].as_str().unwrap()).unwrap();
    let csrf = authorize
        .query_pairs()
        .find(|(k, _)| k == "state")
        .map(|(_, v)| v.into_owned())
        .unwrap();
    assert_eq!(
        authorize
            .query_pairs()
            .find(|(k, _)| k == "redirect_uri")
            .map(|(_, v)| v.into_owned())
            .unwrap(),
        format!("https://brand.example/api/oauth/{}/callback", provider)
    );

    let req = Request::builder()
        .uri(format!(
            "/api/oauth/{}/callback?code=auth-code&state={}",
            provider, csrf
        ))
        .body(Body::empty())
        .unwrap();
    app.clone().oneshot(req).await.unwrap()
}

async fn mock_twitter_login(mock: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/2/oauth2/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "tw-access",
            "refresh_token": "tw-refresh",
            "expires_in": 7200,
            "scope": "tweet.read tweet.write users.read offline.access"
        })))
        .expect(1)
        .mount(mock)
        .await;

    Mock::given(method("GET"))
        .and(path("/2/users/me"))
        .and(header_eq("authorization", "Bearer tw-access"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "data": { "id": "42", "username": "brandhub" } })),
        )
        .mount(mock)
        .await;
}

async fn mock_google_login(mock: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains("grant_type=authorization_code"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "g-access",
            "refresh_token": "g-refresh",
            "expires_in": 3600
        })))
        .expect(1)
        .mount(mock)
        .await;
    Mock::given(method("GET"))
        .and(path("/oauth2/v2/userinfo"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "id": "g-1", "email": "me@brand.example" })),
        )
        .mount(mock)
        .await;
}

#[tokio::test]
async fn test_subscribe_pushes_to_sender() {
    let mock = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/subscribers"))
        .and(header_eq("authorization", "Bearer sender-key"))
        .and(body_partial_json(json!({ "email": "fan@example.com", "groups": ["grp1"] })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(1)
        .mount(&mock)
        .await;

    let (app, state, token) = setup_app(&mock).await;
    let req = Request::builder()
        .uri("/api/newsletter/subscribe")
        .method("POST")
        .header("content-type", "application/json")
        .body(Body::from(r#"{"email":"fan@example.com","name":"Fan"}"#))
        .unwrap();
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let row = subscriber::Entity::find()
        .filter(subscriber::Column::Email.eq("fan@example.com"))
        .one(state.db())
        .await
        .unwrap()
        .unwrap();
    assert!(row.sender_synced);

    let (_, list) = call(&app, "GET", "/api/admin/subscribers", &token, None).await;
    assert_eq!(list["subscribers"][0]["sender_synced"], true);
}

#[tokio::test]
async fn test_sender_failure_keeps_local_subscriber() {
    let mock = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/subscribers"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&mock)
        .await;

    let (app, _, token) = setup_app(&mock).await;
    let req = Request::builder()
        .uri("/api/newsletter/subscribe")
        .method("POST")
        .header("content-type", "application/json")
        .body(Body::from(r#"{"email":"later@example.com"}"#))
        .unwrap();
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let (_, list) = call(&app, "GET", "/api/admin/subscribers", &token, None).await;
    assert_eq!(list["total"], 1);
    assert_eq!(list["subscribers"][0]["sender_synced"], false);

    // Manual sync retries and reports the failure
    let (status, summary) = call(&app, "POST", "/api/admin/subscribers/sync", &token, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["synced"], 0);
    assert_eq!(summary["failed"], 1);
}

#[tokio::test]
async fn test_campaign_send_through_sender() {
    let mock = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/campaigns"))
        .and(body_partial_json(json!({ "subject": "Spring update", "groups": ["grp1"] })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "data": { "id": 123 } })))
        .expect(1)
        .mount(&mock)
        .await;
    Mock::given(method("POST"))
        .and(path("/campaigns/123/send"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(1)
        .mount(&mock)
        .await;

    let (app, _, token) = setup_app(&mock).await;
    let (status, created) = call(
        &app,
        "POST",
        "/api/admin/campaigns",
        &token,
        Some(json!({ "subject": "Spring update", "content_html": "<p>News</p>" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["campaign"]["id"].as_i64().unwrap();

    let (status, body) = call(
        &app,
        "POST",
        &format!("/api/admin/campaigns/{}/send", id),
        &token,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["campaign"]["status"], "sent");
    assert_eq!(body["campaign"]["sender_campaign_id"], "123");

    // Sent campaigns are locked
    let (status, _) = call(
        &app,
        "POST",
        &format!("/api/admin/campaigns/{}/send", id),
        &token,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_campaign_send_failure_is_recorded() {
    let mock = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/campaigns"))
        .respond_with(ResponseTemplate::new(422).set_body_string("subject too long"))
        .mount(&mock)
        .await;

    let (app, _, token) = setup_app(&mock).await;
    let (_, created) = call(
        &app,
        "POST",
        "/api/admin/campaigns",
        &token,
        Some(json!({ "subject": "Oops", "content_html": "<p>x</p>" })),
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
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["campaign"]["status"], "failed");
    assert!(
        body["campaign"]["error_message"]
            .as_str()
            .unwrap()
            .contains("422")
    );
}

#[tokio::test]
async fn test_oauth_connect_and_publish_tweet() {
    let mock = MockServer::start().await;
    mock_twitter_login(&mock).await;
    Mock::given(method("POST"))
        .and(path("/2/tweets"))
        .and(header_eq("authorization", "Bearer tw-access"))
        .and(body_partial_json(json!({ "text": "Shipped it\n\nhttps://brand.example/journal/shipped" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "data": { "id": "999" } })))
        .expect(1)
        .mount(&mock)
        .await;

    let (app, _, token) = setup_app(&mock).await;

    let response = connect(&app, &token, "twitter").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let location = response.headers()[header::LOCATION].to_str().unwrap();
    assert_eq!(location, "https://brand.example/admin/settings?connected=twitter");

    let (_, accounts) = call(&app, "GET", "/api/admin/accounts", &token, None).await;
    assert_eq!(accounts["accounts"][0]["platform"], "twitter");
    assert_eq!(accounts["accounts"][0]["display_name"], "@brandhub");
    // Tokens are never serialized
    assert!(accounts["accounts"][0].get("access_token").is_none());

    let (status, created) = call(
        &app,
        "POST",
        "/api/admin/social/posts",
        &token,
        Some(json!({
            "platform": "twitter",
            "content": "Shipped it",
            "link_url": "https://brand.example/journal/shipped"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
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
    assert_eq!(body["post"]["status"], "published");
    assert_eq!(body["post"]["external_post_id"], "999");
    assert_eq!(body["post"]["attempts"], 1);

    // Published posts are immutable
    let (status, _) = call(
        &app,
        "PUT",
        &format!("/api/admin/social/posts/{}", id),
        &token,
        Some(json!({ "platform": "twitter", "content": "Edited" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_oauth_state_is_single_use() {
    let mock = MockServer::start().await;
    mock_twitter_login(&mock).await;
    let (app, _, token) = setup_app(&mock).await;

    let (_, body) = call(&app, "POST", "/api/admin/oauth/twitter/begin", &token, None).await;
    let authorize = url::Url::parse(body["authorize_url"].as_str().unwrap()).unwrap();
    let csrf = authorize
        .query_pairs()
        .find(|(k, _)| k == "state")
        .map(|(_, v)| v.into_owned())
        .unwrap();
    assert!(authorize.query_pairs().any(|(k, _)| k == "code_challenge"));

    let callback = format!("/api/oauth/twitter/callback?code=auth-code&state={}", csrf);
    let first = app
        .clone()
        .oneshot(Request::builder().uri(&callback).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::SEE_OTHER);

    let replay = app
        .clone()
        .oneshot(Request::builder().uri(&callback).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(replay.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_oauth_denied_redirects_with_error() {
    let mock = MockServer::start().await;
    let (app, _, token) = setup_app(&mock).await;

    let (_, body) = call(&app, "POST", "/api/admin/oauth/twitter/begin", &token, None).await;
    let authorize = url::Url::parse(body["authorize_url"].as_str().unwrap()).unwrap();
    let csrf = authorize
        .query_pairs()
        .find(|(k, _)| k == "state")
        .map(|(_, v)| v.into_owned())
        .unwrap();

    let req = Request::builder()
        .uri(format!(
            "/api/oauth/twitter/callback?error=access_denied&state={}",
            csrf
        ))
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let location = response.headers()[header::LOCATION].to_str().unwrap();
    assert_eq!(
        location,
        "https://brand.example/admin/settings?error=access_denied"
    );

    let (_, accounts) = call(&app, "GET", "/api/admin/accounts", &token, None).await;
    assert!(accounts["accounts"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_scheduler_publishes_due_social_posts() {
    let mock = MockServer::start().await;
    mock_twitter_login(&mock).await;
    Mock::given(method("POST"))
        .and(path("/2/tweets"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "data": { "id": "555" } })))
        .expect(1)
        .mount(&mock)
        .await;

    let (app, state, token) = setup_app(&mock).await;
    assert_eq!(connect(&app, &token, "twitter").await.status(), StatusCode::SEE_OTHER);

    let (status, created) = call(
        &app,
        "POST",
        "/api/admin/social/posts",
        &token,
        Some(json!({
            "platform": "twitter",
            "content": "Scheduled hello",
            "status": "scheduled",
            "scheduled_at": "2999-01-01T00:00:00Z"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["post"]["id"].as_i64().unwrap() as i32;

    // Nothing is due yet
    let (_, body) = call(
        &app,
        "POST",
        "/api/admin/scheduler/jobs/publish_social/run",
        &token,
        None,
    )
    .await;
    assert_eq!(body["job"]["last_message"], "0 published, 0 failed");

    social_post::Entity::update_many()
        .set(social_post::ActiveModel {
            scheduled_at: Set(Some("2020-01-01T00:00:00Z".to_string())),
            ..Default::default()
        })
        .filter(social_post::Column::Id.eq(id))
        .exec(state.db())
        .await
        .unwrap();

    let (_, body) = call(
        &app,
        "POST",
        "/api/admin/scheduler/jobs/publish_social/run",
        &token,
        None,
    )
    .await;
    assert_eq!(body["job"]["last_status"], "ok");
    assert_eq!(body["job"]["last_message"], "1 published, 0 failed");

    let (_, post) = call(
        &app,
        "GET",
        &format!("/api/admin/social/posts/{}", id),
        &token,
        None,
    )
    .await;
    assert_eq!(post["status"], "published");
    assert_eq!(post["external_post_id"], "555");
}

#[tokio::test]
async fn test_gmail_inbox_sync() {
    let mock = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "g-access",
            "refresh_token": "g-refresh",
            "expires_in": 3600
        })))
        .mount(&mock)
        .await;
    Mock::given(method("GET"))
        .and(path("/oauth2/v2/userinfo"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "id": "g-1", "email": "me@brand.example" })),
        )
        .mount(&mock)
        .await;
    Mock::given(method("GET"))
        .and(path("/gmail/v1/users/me/messages"))
        .and(query_param("labelIds", "INBOX"))
        .and(header_eq("authorization", "Bearer g-access"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "messages": [{ "id": "m1", "threadId": "t1" }]
        })))
        .mount(&mock)
        .await;
    Mock::given(method("GET"))
        .and(path("/gmail/v1/users/me/messages/m1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "m1",
            "threadId": "t1",
            "labelIds": ["INBOX", "UNREAD"],
            "snippet": "Loved your last post",
            "internalDate": "1700000000000",
            "payload": { "headers": [
                { "name": "From", "value": "Reader <reader@example.com>" },
                { "name": "Subject", "value": "Hello there" }
            ] }
        })))
        .expect(1)
        .mount(&mock)
        .await;
    Mock::given(method("POST"))
        .and(path("/gmail/v1/users/me/messages/m1/modify"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "m1" })))
        .mount(&mock)
        .await;

    let (app, _, token) = setup_app(&mock).await;
    let response = connect(&app, &token, "google").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let (status, summary) = call(&app, "POST", "/api/admin/inbox/sync", &token, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["fetched"], 1);
    assert_eq!(summary["stored"], 1);

    // Known messages are not fetched again
    let (_, summary) = call(&app, "POST", "/api/admin/inbox/sync", &token, None).await;
    assert_eq!(summary["stored"], 0);

    let (_, inbox) = call(&app, "GET", "/api/admin/inbox?unread=true", &token, None).await;
    assert_eq!(inbox["total"], 1);
    assert_eq!(inbox["emails"][0]["subject"], "Hello there");
    let id = inbox["emails"][0]["id"].as_i64().unwrap();

    let (status, task) = call(
        &app,
        "POST",
        &format!("/api/admin/inbox/{}/task", id),
        &token,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(task["task"]["email_id"], id);

    let (status, _) = call(
        &app,
        "POST",
        &format!("/api/admin/inbox/{}/read", id),
        &token,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (_, inbox) = call(&app, "GET", "/api/admin/inbox?unread=true", &token, None).await;
    assert_eq!(inbox["total"], 0);
}

#[tokio::test]
async fn test_ai_generate_with_openai() {
    let mock = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header_eq("authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({ "model": "gpt-4o-mini" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": {
                "role": "assistant",
                "content": "1. Why small teams ship faster\n2. Lessons from a year of weekly posts"
            } }]
        })))
        .expect(1)
        .mount(&mock)
        .await;

    let (app, _, token) = setup_app(&mock).await;
    let (status, created) = call(
        &app,
        "POST",
        "/api/admin/ai/integrations",
        &token,
        Some(json!({ "name": "Main", "provider": "openai", "api_key": "sk-test" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["integration"]["is_default"], true);
    assert!(created["integration"].get("api_key").is_none());

    let (status, body) = call(
        &app,
        "POST",
        "/api/admin/ai/generate",
        &token,
        Some(json!({ "kind": "blog_ideas", "topic": "shipping in public" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["integration"], "Main");
    assert_eq!(
        body["ideas"],
        json!([
            "Why small teams ship faster",
            "Lessons from a year of weekly posts"
        ])
    );
}

#[tokio::test]
async fn test_linkedin_publish_takes_urn_from_header() {
    let mock = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/v2/accessToken"))
        .and(body_string_contains("client_secret=linkedin-secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "li-access",
            "expires_in": 5184000
        })))
        .expect(1)
        .mount(&mock)
        .await;
    Mock::given(method("GET"))
        .and(path("/v2/userinfo"))
        .and(header_eq("authorization", "Bearer li-access"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "sub": "abc", "name": "Brand Person" })),
        )
        .mount(&mock)
        .await;
    // LinkedIn answers 201 with the URN in a header and nothing in the body
    Mock::given(method("POST"))
        .and(path("/v2/ugcPosts"))
        .and(header_eq("authorization", "Bearer li-access"))
        .and(header_eq("x-restli-protocol-version", "2.0.0"))
        .and(body_partial_json(json!({
            "author": "urn:li:person:abc",
            "lifecycleState": "PUBLISHED"
        })))
        .respond_with(ResponseTemplate::new(201).insert_header("x-restli-id", "urn:li:share:42"))
        .expect(1)
        .mount(&mock)
        .await;

    let (app, _, token) = setup_app(&mock).await;
    let response = connect(&app, &token, "linkedin").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let (_, accounts) = call(&app, "GET", "/api/admin/accounts", &token, None).await;
    assert_eq!(accounts["accounts"][0]["display_name"], "Brand Person");
    assert_eq!(accounts["accounts"][0]["external_id"], "abc");

    let (_, created) = call(
        &app,
        "POST",
        "/api/admin/social/posts",
        &token,
        Some(json!({ "platform": "linkedin", "content": "A longer thought for LinkedIn" })),
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
    assert_eq!(body["post"]["status"], "published");
    assert_eq!(body["post"]["external_post_id"], "urn:li:share:42");
    assert_eq!(
        body["post"]["external_url"],
        "https://www.linkedin.com/feed/update/urn:li:share:42/"
    );
    assert!(body["post"]["error_message"].is_null());
}

#[tokio::test]
async fn test_instagram_long_lived_token_publish_and_refresh() {
    let mock = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/access_token"))
        .and(body_string_contains("grant_type=authorization_code"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "ig-short",
            "user_id": 1789
        })))
        .expect(1)
        .mount(&mock)
        .await;
    Mock::given(method("GET"))
        .and(path("/access_token"))
        .and(query_param("grant_type", "ig_exchange_token"))
        .and(query_param("access_token", "ig-short"))
        .and(query_param("client_secret", "instagram-secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "ig-long",
            "token_type": "bearer",
            "expires_in": 5183944
        })))
        .expect(1)
        .mount(&mock)
        .await;
    Mock::given(method("GET"))
        .and(path("/v21.0/me"))
        .and(query_param("access_token", "ig-long"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "user_id": "1789", "username": "brandhub" })),
        )
        .mount(&mock)
        .await;
    Mock::given(method("GET"))
        .and(path("/refresh_access_token"))
        .and(query_param("grant_type", "ig_refresh_token"))
        .and(query_param("access_token", "ig-long"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "ig-long-2",
            "token_type": "bearer",
            "expires_in": 5183944
        })))
        .expect(1)
        .mount(&mock)
        .await;
    // Publishing runs on the refreshed token
    Mock::given(method("POST"))
        .and(path("/v21.0/1789/media"))
        .and(body_string_contains("access_token=ig-long-2"))
        .and(body_string_contains("image_url="))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "c-1" })))
        .expect(1)
        .mount(&mock)
        .await;
    Mock::given(method("POST"))
        .and(path("/v21.0/1789/media_publish"))
        .and(body_string_contains("creation_id=c-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "ig-post-9" })))
        .expect(1)
        .mount(&mock)
        .await;

    let (app, _, token) = setup_app(&mock).await;
    let response = connect(&app, &token, "instagram").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let location = response.headers()[header::LOCATION].to_str().unwrap();
    assert_eq!(location, "https://brand.example/admin/settings?connected=instagram");

    let (_, accounts) = call(&app, "GET", "/api/admin/accounts", &token, None).await;
    assert_eq!(accounts["accounts"][0]["external_id"], "1789");
    assert_eq!(accounts["accounts"][0]["display_name"], "@brandhub");
    assert!(accounts["accounts"][0]["token_expires_at"].is_string());

    let (status, body) = call(
        &app,
        "POST",
        "/api/admin/accounts/instagram/refresh",
        &token,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["account"]["platform"], "instagram");
    assert!(body["account"].get("access_token").is_none());

    let (status, created) = call(
        &app,
        "POST",
        "/api/admin/social/posts",
        &token,
        Some(json!({
            "platform": "instagram",
            "content": "Behind the scenes",
            "media_urls": ["https://cdn.brand.example/cover.jpg"]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["post"]["id"].as_i64().unwrap();

    let (_, body) = call(
        &app,
        "POST",
        &format!("/api/admin/social/posts/{}/publish", id),
        &token,
        None,
    )
    .await;
    assert_eq!(body["post"]["status"], "published");
    assert_eq!(body["post"]["external_post_id"], "ig-post-9");
}

#[tokio::test]
async fn test_threads_connect_and_publish_text() {
    let mock = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/access_token"))
        .and(body_string_contains("client_id=threads"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "th-short",
            "user_id": 555
        })))
        .expect(1)
        .mount(&mock)
        .await;
    Mock::given(method("GET"))
        .and(path("/access_token"))
        .and(query_param("grant_type", "th_exchange_token"))
        .and(query_param("access_token", "th-short"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "th-long",
            "expires_in": 5183944
        })))
        .expect(1)
        .mount(&mock)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1.0/me"))
        .and(query_param("access_token", "th-long"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "id": "555", "username": "brandhub" })),
        )
        .mount(&mock)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1.0/555/threads"))
        .and(body_string_contains("media_type=TEXT"))
        .and(body_string_contains("access_token=th-long"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "tc-1" })))
        .expect(1)
        .mount(&mock)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1.0/555/threads_publish"))
        .and(body_string_contains("creation_id=tc-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": 98765 })))
        .expect(1)
        .mount(&mock)
        .await;

    let (app, _, token) = setup_app(&mock).await;
    assert_eq!(connect(&app, &token, "threads").await.status(), StatusCode::SEE_OTHER);

    let (_, created) = call(
        &app,
        "POST",
        "/api/admin/social/posts",
        &token,
        Some(json!({ "platform": "threads", "content": "Small update, big week" })),
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
    assert_eq!(body["post"]["status"], "published");
    // Numeric ids come back as strings
    assert_eq!(body["post"]["external_post_id"], "98765");
}

#[tokio::test]
async fn test_ai_generate_with_anthropic() {
    let mock = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/messages"))
        .and(header_eq("x-api-key", "sk-ant-test"))
        .and(header_eq("anthropic-version", "2023-06-01"))
        .and(body_partial_json(json!({ "model": "claude-3-5-haiku-latest" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": [
                { "type": "text", "text": "Title: Ship weekly\n" },
                { "type": "text", "text": "Description: Why small releases win." }
            ]
        })))
        .expect(1)
        .mount(&mock)
        .await;

    let (app, _, token) = setup_app(&mock).await;
    let (status, created) = call(
        &app,
        "POST",
        "/api/admin/ai/integrations",
        &token,
        Some(json!({ "name": "Claude", "provider": "anthropic", "api_key": "sk-ant-test" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["integration"]["model_name"], "claude-3-5-haiku-latest");

    let (status, body) = call(
        &app,
        "POST",
        "/api/admin/ai/generate",
        &token,
        Some(json!({ "kind": "seo_meta", "topic": "weekly shipping" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["integration"], "Claude");
    assert_eq!(body["meta_title"], "Ship weekly");
    assert_eq!(body["meta_description"], "Why small releases win.");
}

#[tokio::test]
async fn test_refresh_tokens_renews_google_access() {
    let mock = MockServer::start().await;
    mock_google_login(&mock).await;
    // Google leaves out the refresh token on refresh; the stored one is reused
    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains("grant_type=refresh_token"))
        .and(body_string_contains("refresh_token=g-refresh"))
        .and(body_string_contains("client_secret=google-secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "g-access-2",
            "expires_in": 3600
        })))
        .expect(2)
        .mount(&mock)
        .await;
    Mock::given(method("GET"))
        .and(path("/gmail/v1/users/me/messages"))
        .and(header_eq("authorization", "Bearer g-access-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "resultSizeEstimate": 0 })))
        .expect(1)
        .mount(&mock)
        .await;

    let (app, _, token) = setup_app(&mock).await;
    assert_eq!(connect(&app, &token, "google").await.status(), StatusCode::SEE_OTHER);

    let (status, body) = call(&app, "POST", "/api/admin/accounts/google/refresh", &token, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["account"]["token_expires_at"].is_string());

    // Expires within the window, so the job renews it again
    let (_, body) = call(
        &app,
        "POST",
        "/api/admin/scheduler/jobs/refresh_tokens/run",
        &token,
        None,
    )
    .await;
    assert_eq!(body["job"]["last_status"], "ok");
    assert_eq!(body["job"]["last_message"], "1 refreshed, 0 failed");

    let (status, summary) = call(&app, "POST", "/api/admin/inbox/sync", &token, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["fetched"], 0);
}

#[tokio::test]
async fn test_refresh_tokens_counts_failures() {
    let mock = MockServer::start().await;
    mock_google_login(&mock).await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains("grant_type=refresh_token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({ "error": "invalid_grant" })))
        .mount(&mock)
        .await;

    let (app, _, token) = setup_app(&mock).await;
    assert_eq!(connect(&app, &token, "google").await.status(), StatusCode::SEE_OTHER);

    let (_, body) = call(
        &app,
        "POST",
        "/api/admin/scheduler/jobs/refresh_tokens/run",
        &token,
        None,
    )
    .await;
    assert_eq!(body["job"]["last_message"], "0 refreshed, 1 failed");

    let (status, body) = call(&app, "POST", "/api/admin/accounts/google/refresh", &token, None).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body["error"].as_str().unwrap().contains("400"));
}

#[tokio::test]
async fn test_contact_reply_goes_through_gmail() {
    let mock = MockServer::start().await;
    mock_google_login(&mock).await;
    Mock::given(method("POST"))
        .and(path("/gmail/v1/users/me/messages/send"))
        .and(header_eq("authorization", "Bearer g-access"))
        .and(body_string_contains("\"raw\""))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "id": "sent-1", "threadId": "t9" })),
        )
        .expect(1)
        .mount(&mock)
        .await;

    let (app, _, token) = setup_app(&mock).await;
    let req = Request::builder()
        .uri("/api/contact")
        .method("POST")
        .header("content-type", "application/json")
        .body(Body::from(
            serde_json::to_vec(&json!({
                "name": "Reader",
                "email": "reader@example.com",
                "subject": "Speaking gig",
                "message": "Would you talk at our meetup next month?"
            }))
            .unwrap(),
        ))
        .unwrap();
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let (_, list) = call(&app, "GET", "/api/admin/contact", &token, None).await;
    let id = list["messages"][0]["id"].as_i64().unwrap();
    let reply_uri = format!("/api/admin/contact/{}/reply", id);
    let reply = json!({ "body": "Happy to, send me the details." });

    // No Gmail account yet
    let (status, _) = call(&app, "POST", &reply_uri, &token, Some(reply.clone())).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    assert_eq!(connect(&app, &token, "google").await.status(), StatusCode::SEE_OTHER);
    let (status, body) = call(&app, "POST", &reply_uri, &token, Some(reply)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"]["status"], "replied");
}

#[tokio::test]
async fn test_from_blog_drafts_fit_platform_limits() {
    let mock = MockServer::start().await;
    let (app, _, token) = setup_app(&mock).await;

    let excerpt = "Shipping notes from a busy month. ".repeat(20);
    let (_, created) = call(
        &app,
        "POST",
        "/api/admin/blogs",
        &token,
        Some(json!({
            "title": "Launch notes",
            "content": "Body",
            "excerpt": excerpt,
            "status": "published"
        })),
    )
    .await;
    let blog_id = created["blog"]["id"].as_i64().unwrap();

    let (status, body) = call(
        &app,
        "POST",
        "/api/admin/social/from-blog",
        &token,
        Some(json!({ "blog_id": blog_id, "platforms": ["twitter", "threads", "linkedin"] })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["total"], 3);

    let link = "https://brand.example/journal/launch-notes";
    let full = format!("Launch notes\n\n{}", excerpt.trim());
    let posts = body["posts"].as_array().unwrap();
    for (post, limit) in posts.iter().zip([280, 500, 3000]) {
        assert_eq!(post["status"], "draft");
        assert_eq!(post["link_url"], link);
        assert_eq!(post["blog_id"], blog_id);
        let content = post["content"].as_str().unwrap();
        assert!(content.chars().count() + 2 + link.len() <= limit);
    }
    let tweet = posts[0]["content"].as_str().unwrap();
    assert!(tweet.starts_with("Launch notes"));
    assert!(tweet.ends_with('…'));
    assert!(posts[1]["content"].as_str().unwrap().ends_with('…'));
    assert_eq!(posts[2]["content"], full.as_str());

    let (status, _) = call(
        &app,
        "POST",
        "/api/admin/social/from-blog",
        &token,
        Some(json!({ "blog_id": blog_id, "platforms": ["google"] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = call(
        &app,
        "POST",
        "/api/admin/social/from-blog",
        &token,
        Some(json!({ "blog_id": 4242, "platforms": ["twitter"] })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_publish_social_continues_after_a_failed_post() {
    let mock = MockServer::start().await;
    mock_twitter_login(&mock).await;
    Mock::given(method("POST"))
        .and(path("/2/tweets"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "data": { "id": "777" } })))
        .expect(1)
        .mount(&mock)
        .await;

    let (app, _, token) = setup_app(&mock).await;
    assert_eq!(connect(&app, &token, "twitter").await.status(), StatusCode::SEE_OTHER);

    // Oldest first: the LinkedIn post has no connected account
    let mut ids = Vec::new();
    for (platform, at) in [
        ("linkedin", "2020-01-01T00:00:00Z"),
        ("twitter", "2020-01-02T00:00:00Z"),
    ] {
        let (status, created) = call(
            &app,
            "POST",
            "/api/admin/social/posts",
            &token,
            Some(json!({
                "platform": platform,
                "content": "Catching up",
                "status": "scheduled",
                "scheduled_at": at
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        ids.push(created["post"]["id"].as_i64().unwrap());
    }

    let (_, body) = call(
        &app,
        "POST",
        "/api/admin/scheduler/jobs/publish_social/run",
        &token,
        None,
    )
    .await;
    assert_eq!(body["job"]["last_status"], "ok");
    assert_eq!(body["job"]["last_message"], "1 published, 1 failed");

    let (_, failed) = call(&app, "GET", &format!("/api/admin/social/posts/{}", ids[0]), &token, None).await;
    assert_eq!(failed["status"], "failed");
    assert_eq!(failed["attempts"], 1);
    assert!(failed["error_message"].as_str().unwrap().contains("linkedin"));

    let (_, published) = call(&app, "GET", &format!("/api/admin/social/posts/{}", ids[1]), &token, None).await;
    assert_eq!(published["status"], "published");
    assert_eq!(published["external_post_id"], "777");
}

#[tokio::test]
async fn test_inbox_job_reports_unreadable_google_account() {
    let mock = MockServer::start().await;
    let (app, state, token) = setup_app(&mock).await;
    let run = "/api/admin/scheduler/jobs/sync_inbox/run";

    // Not connected is a skip
    let (_, body) = call(&app, "POST", run, &token, None).await;
    assert_eq!(body["job"]["last_status"], "ok");
    assert!(body["job"]["last_message"].as_str().unwrap().starts_with("skipped"));

    // A stored token that cannot be decrypted is a real failure
    social_account::ActiveModel {
        platform: Set("google".to_string()),
        external_id: Set("g-1".to_string()),
        access_token: Set("not-a-vault-secret".to_string()),
        created_at: Set("2026-01-01T00:00:00Z".to_string()),
        updated_at: Set("2026-01-01T00:00:00Z".to_string()),
        ..Default::default()
    }
    .insert(state.db())
    .await
    .unwrap();

    let (_, body) = call(&app, "POST", run, &token, None).await;
    assert_eq!(body["job"]["last_status"], "error");
    assert!(!body["job"]["last_message"].as_str().unwrap().starts_with("skipped"));

    let (status, _) = call(&app, "POST", "/api/admin/inbox/sync", &token, None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}
