//! Shared application state.

use std::time::Duration;

use crate::config::ServerConfig;
use crate::error::ServerError;

#[derive(Clone)]
pub struct AppState {
    pub http: reqwest::Client,
    pub api_target: String,
}

impl AppState {
    /// Build the upstream client. Redirects are passed back to the browser, not followed.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &ServerConfig) -> Result<Self, ServerError> {
        let http = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .timeout(Duration::from_secs(config.upstream_timeout_secs))
            .build()
            .map_err(ServerError::HttpClientBuild)?;
        Ok(Self { http, api_target: config.api_target.clone() })
    }
}
