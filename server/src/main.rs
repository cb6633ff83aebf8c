//! Static file server and `/api` reverse proxy for the board front end.
//!
//! SYSTEM CONTEXT
//! ==============
//! Browsers load pages from here and call the backend through `/api/*` on the
//! same origin, so the refresh cookie set by the backend stays first-party.

mod config;
mod error;
mod routes;
mod state;

use config::ServerConfig;
use error::ServerError;
use state::AppState;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ServerConfig::from_env().expect("invalid server configuration");
    run(config).await.expect("server failed");
}

async fn run(config: ServerConfig) -> Result<(), ServerError> {
    let state = AppState::new(&config)?;
    let app = routes::app(state, &config.static_dir);
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?;

    tracing::info!(
        port = config.port,
        static_dir = %config.static_dir.display(),
        api_target = %config.api_target,
        "board server listening"
    );
    axum::serve(listener, app).await?;
    Ok(())
}
