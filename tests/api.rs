//! HTTP-level tests for the public and admin API surface.
//!
//! These exercise the real router with an in-memory database; email, AI,
//! and indexing stay disabled (their default configuration).

use std::net::SocketAddr;
use std::sync::Arc;

use axum_test::TestServer;
use serde_json::{json, Value};
use tempfile::TempDir;

use brightfold::{
    api::{self, AppState},
    cache::MemoryCache,
    config::Config,
    db::{
        create_test_pool,
        migrations::run_migrations,
        repositories::{
            SqlxAuthorRepository, SqlxCategoryRepository, SqlxContactRepository,
            SqlxGalleryRepository, SqlxOfferingRepository, SqlxPageViewRepository,
            SqlxPostRepository, SqlxSessionRepository, SqlxTagRepository, SqlxUserRepository,
        },
    },
    services::{
        AiService, AnalyticsService, AuthorService, CategoryService, ContactService,
        EmailService, GalleryService, IndexingService, LoginRateLimiter, OfferingService,
        PostService, TagService, UserService,
    },
};

async fn build_server(upload_dir: &TempDir) -> TestServer {
    let pool = create_test_pool().await.expect("Failed to create pool");
    run_migrations(&pool).await.expect("Failed to migrate");

    let config = Arc::new(Config::default());
    let cache = Arc::new(MemoryCache::new());
    let upload_path = upload_dir.path().to_path_buf();

    let rate_limiter = Arc::new(LoginRateLimiter::new());
    let user_service = Arc::new(UserService::new(
        SqlxUserRepository::boxed(pool.clone()),
        SqlxSessionRepository::boxed(pool.clone()),
        rate_limiter,
    ));
    user_service
        .ensure_admin("admin", "admin@test.local", "correct horse battery")
        .await
        .expect("Failed to seed admin");

    let tag_repo = SqlxTagRepository::boxed(pool.clone());
    let email_service = Arc::new(EmailService::new(config.email.clone()).unwrap());

    let state = AppState {
        config: config.clone(),
        cache: cache.clone(),
        user_service,
        post_service: Arc::new(PostService::new(
            SqlxPostRepository::boxed(pool.clone()),
            tag_repo.clone(),
            cache.clone(),
        )),
        author_service: Arc::new(AuthorService::new(SqlxAuthorRepository::boxed(pool.clone()))),
        category_service: Arc::new(CategoryService::new(
            SqlxCategoryRepository::boxed(pool.clone()),
            cache.clone(),
        )),
        tag_service: Arc::new(TagService::new(tag_repo)),
        offering_service: Arc::new(OfferingService::new(
            SqlxOfferingRepository::boxed(pool.clone()),
            cache.clone(),
        )),
        contact_service: Arc::new(ContactService::new(
            SqlxContactRepository::boxed(pool.clone()),
            email_service.clone(),
        )),
        gallery_service: Arc::new(GalleryService::new(
            SqlxGalleryRepository::boxed(pool.clone()),
            cache.clone(),
            upload_path.clone(),
        )),
        analytics_service: Arc::new(AnalyticsService::new(SqlxPageViewRepository::boxed(
            pool.clone(),
        ))),
        email_service,
        ai_service: Arc::new(AiService::new(config.ai.clone(), upload_path.clone())),
        indexing_service: Arc::new(IndexingService::new(
            config.indexing.clone(),
            config.server.public_url.clone(),
        )),
    };

    let app = api::build_router(state, "http://localhost:3000", &upload_path);
    TestServer::new(app.into_make_service_with_connect_info::<SocketAddr>())
        .expect("Failed to start test server")
}

async fn login(server: &TestServer) -> String {
    let response = server
        .post("/api/v1/auth/login")
        .json(&json!({
            "username_or_email": "admin",
            "password": "correct horse battery",
        }))
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    body["data"]["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_public_lists_start_empty() {
    let dir = TempDir::new().unwrap();
    let server = build_server(&dir).await;

    let response = server.get("/api/v1/posts").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["total"], 0);

    let response = server.get("/api/v1/offerings").await;
    response.assert_status_ok();

    let response = server.get("/api/v1/gallery").await;
    response.assert_status_ok();
}

#[tokio::test]
async fn test_admin_routes_require_session() {
    let dir = TempDir::new().unwrap();
    let server = build_server(&dir).await;

    let response = server.get("/api/v1/admin/posts").await;
    response.assert_status_unauthorized();
    let body: Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_login_and_me() {
    let dir = TempDir::new().unwrap();
    let server = build_server(&dir).await;

    let token = login(&server).await;

    let response = server
        .get("/api/v1/auth/me")
        .authorization_bearer(&token)
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["data"]["username"], "admin");
    assert_eq!(body["data"]["role"], "admin");
    // Password hashes never leave the API
    assert!(body["data"].get("password_hash").is_none());
}

#[tokio::test]
async fn test_login_rejects_bad_password() {
    let dir = TempDir::new().unwrap();
    let server = build_server(&dir).await;

    let response = server
        .post("/api/v1/auth/login")
        .json(&json!({
            "username_or_email": "admin",
            "password": "wrong",
        }))
        .await;
    response.assert_status_unauthorized();
}

#[tokio::test]
async fn test_post_lifecycle_through_api() {
    let dir = TempDir::new().unwrap();
    let server = build_server(&dir).await;
    let token = login(&server).await;

    // A post needs a byline
    let response = server
        .post("/api/v1/admin/authors")
        .authorization_bearer(&token)
        .json(&json!({"name": "Jane Doe"}))
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);
    let author: Value = response.json();
    let author_id = author["data"]["id"].as_i64().unwrap();

    // Draft first
    let response = server
        .post("/api/v1/admin/posts")
        .authorization_bearer(&token)
        .json(&json!({
            "title": "Launching Our Studio",
            "content": "# Hello\n\nWe build brands.",
            "author_id": author_id,
            "tags": ["news"],
        }))
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);
    let post: Value = response.json();
    let post_id = post["data"]["id"].as_i64().unwrap();
    assert_eq!(post["data"]["slug"], "launching-our-studio");
    assert_eq!(post["data"]["status"], "draft");

    // Draft is invisible to the public
    let response = server.get("/api/v1/posts/launching-our-studio").await;
    response.assert_status_not_found();

    // Publish
    let response = server
        .put(&format!("/api/v1/admin/posts/{}", post_id))
        .authorization_bearer(&token)
        .json(&json!({"status": "published"}))
        .await;
    response.assert_status_ok();

    // Now it is public, with rendered HTML and meta attached
    let response = server.get("/api/v1/posts/launching-our-studio").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["data"]["author_name"], "Jane Doe");
    assert!(body["data"]["content_html"]
        .as_str()
        .unwrap()
        .contains("<h1>"));
    assert_eq!(body["data"]["tags"][0], "news");

    // And the tag cloud picked it up
    let response = server.get("/api/v1/tags").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["data"][0]["slug"], "news");
}

#[tokio::test]
async fn test_bulk_publish_via_patch_and_sitemap() {
    let dir = TempDir::new().unwrap();
    let server = build_server(&dir).await;
    let token = login(&server).await;

    let response = server
        .post("/api/v1/admin/authors")
        .authorization_bearer(&token)
        .json(&json!({"name": "Jane Doe"}))
        .await;
    let author: Value = response.json();
    let author_id = author["data"]["id"].as_i64().unwrap();

    let mut ids = Vec::new();
    for title in ["Spring Campaign", "Unfinished Notes"] {
        let response = server
            .post("/api/v1/admin/posts")
            .authorization_bearer(&token)
            .json(&json!({
                "title": title,
                "content": "Body.",
                "author_id": author_id,
            }))
            .await;
        response.assert_status(axum::http::StatusCode::CREATED);
        let post: Value = response.json();
        ids.push(post["data"]["id"].as_i64().unwrap());
    }

    // Bulk status changes go over PATCH
    let response = server
        .patch("/api/v1/admin/posts/bulk")
        .authorization_bearer(&token)
        .json(&json!({"ids": [ids[0]], "action": "publish"}))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["data"]["affected"], 1);

    // The sitemap carries the published slug and skips the draft
    let response = server.get("/sitemap.xml").await;
    response.assert_status_ok();
    assert!(response
        .header("content-type")
        .to_str()
        .unwrap()
        .contains("xml"));
    let xml = response.text();
    assert!(xml.contains("/blog/spring-campaign"));
    assert!(!xml.contains("unfinished-notes"));
}

#[tokio::test]
async fn test_contact_intake_and_triage() {
    let dir = TempDir::new().unwrap();
    let server = build_server(&dir).await;

    let response = server
        .post("/api/v1/contact")
        .json(&json!({
            "name": "Prospect",
            "email": "prospect@example.com",
            "message": "We need a new website.",
        }))
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);
    let body: Value = response.json();
    let id = body["data"]["id"].as_i64().unwrap();
    assert_eq!(body["data"]["status"], "new");

    let token = login(&server).await;

    let response = server
        .get("/api/v1/admin/contact/unread-count")
        .authorization_bearer(&token)
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["data"]["count"], 1);

    // Opening marks it read
    let response = server
        .get(&format!("/api/v1/admin/contact/{}", id))
        .authorization_bearer(&token)
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["data"]["status"], "read");

    // Replying without SMTP configured is a clear error, not a silent no-op
    let response = server
        .post(&format!("/api/v1/admin/contact/{}/reply", id))
        .authorization_bearer(&token)
        .json(&json!({"subject": "Re: website", "body": "Happy to talk."}))
        .await;
    response.assert_status(axum::http::StatusCode::SERVICE_UNAVAILABLE);

    // Bulk status changes go over PATCH
    let response = server
        .patch("/api/v1/admin/contact/bulk")
        .authorization_bearer(&token)
        .json(&json!({"ids": [id], "status": "responded"}))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["data"]["affected"], 1);
}

#[tokio::test]
async fn test_view_tracking_deduplicates() {
    let dir = TempDir::new().unwrap();
    let server = build_server(&dir).await;

    let response = server
        .post("/api/v1/track")
        .json(&json!({"path": "/services"}))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["data"]["counted"], true);

    // Same visitor, same path, same day: not counted again
    let response = server
        .post("/api/v1/track")
        .json(&json!({"path": "/services?utm=x"}))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["data"]["counted"], false);

    let token = login(&server).await;
    let response = server
        .get("/api/v1/admin/analytics")
        .authorization_bearer(&token)
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["data"]["summary"]["total_views"], 1);
}

#[tokio::test]
async fn test_generation_disabled_without_api_key() {
    let dir = TempDir::new().unwrap();
    let server = build_server(&dir).await;
    let token = login(&server).await;

    let response = server
        .post("/api/v1/admin/generate/post")
        .authorization_bearer(&token)
        .json(&json!({"prompt": "A post about rebranding"}))
        .await;
    response.assert_status(axum::http::StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_editor_cannot_manage_accounts() {
    let dir = TempDir::new().unwrap();
    let server = build_server(&dir).await;
    let admin_token = login(&server).await;

    // Admin provisions an editor account
    let response = server
        .post("/api/v1/admin/users")
        .authorization_bearer(&admin_token)
        .json(&json!({
            "username": "editor",
            "email": "editor@test.local",
            "password": "editor-password",
        }))
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);

    let response = server
        .post("/api/v1/auth/login")
        .json(&json!({
            "username_or_email": "editor",
            "password": "editor-password",
        }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    let editor_token = body["data"]["token"].as_str().unwrap().to_string();

    // Editors manage content but not accounts
    let response = server
        .get("/api/v1/admin/posts")
        .authorization_bearer(&editor_token)
        .await;
    response.assert_status_ok();

    let response = server
        .get("/api/v1/admin/users")
        .authorization_bearer(&editor_token)
        .await;
    response.assert_status_forbidden();
}
