//! Sitemap endpoint
//!
//! - GET /sitemap.xml - Published content as an XML sitemap
//!
//! This is the document the indexing ping advertises to search engines
//! after a publish.

use axum::{extract::State, http::header, response::IntoResponse, routing::get, Router};

use crate::api::middleware::{ApiError, AppState};

/// Most URLs a single sitemap file may carry
const MAX_URLS: usize = 50_000;

/// Sitemap routes, mounted at the server root
pub fn router() -> Router<AppState> {
    Router::new().route("/sitemap.xml", get(sitemap))
}

/// GET /sitemap.xml - Published posts and offerings plus the homepage
async fn sitemap(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let base = state.config.server.public_url.trim_end_matches('/');

    let mut locs = vec![format!("{}/", base)];
    for offering in state.offering_service.list_published().await? {
        locs.push(format!("{}/services/{}", base, offering.slug));
    }
    for slug in state.post_service.published_slugs(MAX_URLS).await? {
        locs.push(format!("{}/blog/{}", base, slug));
    }

    let mut xml = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n",
    );
    for loc in &locs {
        xml.push_str("  <url><loc>");
        xml.push_str(loc);
        xml.push_str("</loc></url>\n");
    }
    xml.push_str("</urlset>\n");

    Ok(([(header::CONTENT_TYPE, "application/xml")], xml))
}
