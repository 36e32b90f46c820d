//! Brightfold - marketing site backend and admin console

use anyhow::Result;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use brightfold::{
    api::{self, AppState},
    cache::MemoryCache,
    config::Config,
    db::{
        self,
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

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "brightfold=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Brightfold backend...");

    let config = Arc::new(Config::load_with_env(Path::new("config.yml"))?);
    tracing::info!("Configuration loaded");

    let pool = db::create_pool(&config.database).await?;
    db::migrations::run_migrations(&pool).await?;
    tracing::info!("Database ready: {}", config.database.url);

    let cache = Arc::new(MemoryCache::new());

    // Repositories
    let user_repo = SqlxUserRepository::boxed(pool.clone());
    let session_repo = SqlxSessionRepository::boxed(pool.clone());
    let author_repo = SqlxAuthorRepository::boxed(pool.clone());
    let category_repo = SqlxCategoryRepository::boxed(pool.clone());
    let tag_repo = SqlxTagRepository::boxed(pool.clone());
    let post_repo = SqlxPostRepository::boxed(pool.clone());
    let offering_repo = SqlxOfferingRepository::boxed(pool.clone());
    let contact_repo = SqlxContactRepository::boxed(pool.clone());
    let gallery_repo = SqlxGalleryRepository::boxed(pool.clone());
    let page_view_repo = SqlxPageViewRepository::boxed(pool.clone());

    // Services
    let rate_limiter = Arc::new(LoginRateLimiter::new());
    let user_service = Arc::new(UserService::with_session_expiration(
        user_repo,
        session_repo,
        rate_limiter.clone(),
        config.admin.session_expiration_days,
    ));
    let post_service = Arc::new(PostService::new(
        post_repo,
        tag_repo.clone(),
        cache.clone(),
    ));
    let author_service = Arc::new(AuthorService::new(author_repo));
    let category_service = Arc::new(CategoryService::new(category_repo, cache.clone()));
    let tag_service = Arc::new(TagService::new(tag_repo));
    let offering_service = Arc::new(OfferingService::new(offering_repo, cache.clone()));
    let email_service = Arc::new(EmailService::new(config.email.clone())?);
    let contact_service = Arc::new(ContactService::new(contact_repo, email_service.clone()));
    let gallery_service = Arc::new(GalleryService::new(
        gallery_repo,
        cache.clone(),
        config.upload.path.clone(),
    ));
    let analytics_service = Arc::new(AnalyticsService::new(page_view_repo));
    let ai_service = Arc::new(AiService::new(
        config.ai.clone(),
        config.upload.path.clone(),
    ));
    let indexing_service = Arc::new(IndexingService::new(
        config.indexing.clone(),
        config.server.public_url.clone(),
    ));

    // Seed the first admin account from configuration
    if config.admin.password.is_empty() {
        tracing::warn!("No admin password configured; skipping admin seeding");
    } else if let Some(user) = user_service
        .ensure_admin(
            &config.admin.username,
            &config.admin.email,
            &config.admin.password,
        )
        .await?
    {
        tracing::info!(username = %user.username, "Admin account seeded");
    }

    // Periodic cleanup: expired sessions and stale login-attempt records
    {
        let user_service = user_service.clone();
        let rate_limiter = rate_limiter.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(tokio::time::Duration::from_secs(3600));
            loop {
                interval.tick().await;
                rate_limiter.cleanup().await;
                match user_service.cleanup_expired_sessions().await {
                    Ok(0) => {}
                    Ok(n) => tracing::debug!(removed = n, "Cleaned up expired sessions"),
                    Err(e) => tracing::warn!("Session cleanup failed: {}", e),
                }
            }
        });
    }

    let state = AppState {
        config: config.clone(),
        cache,
        user_service,
        post_service,
        author_service,
        category_service,
        tag_service,
        offering_service,
        contact_service,
        gallery_service,
        analytics_service,
        email_service,
        ai_service,
        indexing_service,
    };

    let app = api::build_router(state, &config.server.cors_origin, &config.upload.path);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
