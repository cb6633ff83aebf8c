//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! `/healthz` answers directly, `/api/*` is forwarded to the backend, and
//! everything else is a static file. Clean page URLs such as `/login` are
//! rewritten to their HTML files before the static service sees them.

pub mod pages;
pub mod proxy;

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;

use std::path::Path;

use axum::Router;
use axum::middleware;
use axum::routing::{any, get};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub fn app(state: AppState, static_dir: &Path) -> Router {
    let static_files = ServeDir::new(static_dir).append_index_html_on_directories(true);

    Router::new()
        .route("/healthz", get(healthz))
        .route("/api", any(proxy::forward))
        .route("/api/{*rest}", any(proxy::forward))
        .fallback_service(static_files)
        .layer(middleware::map_request(pages::rewrite_clean_url))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}
