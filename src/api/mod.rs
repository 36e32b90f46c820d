//! API layer - HTTP handlers and routing
//!
//! Public surface (no session):
//! - posts, offerings, categories, tags, authors, gallery
//! - contact form intake and view tracking
//!
//! Admin console (session required, /api/v1/admin):
//! - content CRUD, contact triage, analytics, uploads, AI generation
//! - account management (administrators only)

pub mod analytics;
pub mod auth;
pub mod authors;
pub mod categories;
pub mod common;
pub mod contact;
pub mod gallery;
pub mod generate;
pub mod middleware;
pub mod offerings;
pub mod posts;
pub mod responses;
pub mod sitemap;
pub mod tags;
pub mod upload;
pub mod users;

use axum::{
    http::{header, HeaderValue, Method},
    middleware as axum_middleware,
    Router,
};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

pub use middleware::{ApiError, AppState, AuthenticatedUser};
pub use responses::{ApiResponse, Paginated};

/// Build the /api/v1 router
pub fn build_api_router(state: AppState) -> Router<AppState> {
    // Console routes behind a valid session
    let admin_routes = Router::new()
        .nest("/posts", posts::admin_router())
        .nest("/authors", authors::admin_router())
        .nest("/categories", categories::admin_router())
        .nest("/tags", tags::admin_router())
        .nest("/offerings", offerings::admin_router())
        .nest("/contact", contact::admin_router())
        .nest("/gallery", gallery::admin_router())
        .nest("/analytics", analytics::admin_router())
        .nest("/generate", generate::admin_router())
        .nest("/upload", upload::admin_router())
        // Account management additionally requires the admin role
        .nest(
            "/users",
            users::admin_router()
                .route_layer(axum_middleware::from_fn(middleware::require_admin)),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_auth,
        ));

    let protected_auth = auth::protected_router().route_layer(
        axum_middleware::from_fn_with_state(state.clone(), middleware::require_auth),
    );

    Router::new()
        .nest("/posts", posts::public_router())
        .nest("/offerings", offerings::public_router())
        .nest("/categories", categories::public_router())
        .nest("/tags", tags::public_router())
        .nest("/authors", authors::public_router())
        .nest("/gallery", gallery::public_router())
        .nest("/contact", contact::public_router())
        .nest("/track", analytics::public_router())
        .nest("/auth", auth::public_router().merge(protected_auth))
        .nest("/admin", admin_routes)
}

/// Build the complete application router
pub fn build_router(state: AppState, cors_origin: &str, upload_dir: &std::path::Path) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(
            cors_origin
                .parse::<HeaderValue>()
                .unwrap_or_else(|_| HeaderValue::from_static("http://localhost:3000")),
        )
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::COOKIE])
        .allow_credentials(true);

    Router::new()
        .nest("/api/v1", build_api_router(state.clone()))
        .merge(sitemap::router())
        .nest_service("/uploads", ServeDir::new(upload_dir))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
