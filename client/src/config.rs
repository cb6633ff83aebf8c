//! Client configuration parsed from environment variables.
//!
//! DESIGN
//! ======
//! Development builds talk to the backend directly on `localhost:8080`;
//! deployed builds go through the same-origin reverse proxy. Either choice
//! can be overridden wholesale with `BOARD_API_BASE_URL`.

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

use crate::error::ClientError;

pub const API_PREFIX: &str = "/api/v1";
pub const DEVELOPMENT_API_BASE_URL: &str = "http://localhost:8080/api/v1";
pub const DEFAULT_ORIGIN: &str = "http://localhost:3000";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl Default for ClientTimeouts {
    fn default() -> Self {
        Self { request_secs: DEFAULT_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Absolute base URL every relative endpoint is joined onto (no trailing slash).
    pub api_base_url: String,
    /// Origin of the front end, used to tell internal from external redirects.
    pub origin: String,
    pub timeouts: ClientTimeouts,
}

impl ClientConfig {
    /// Config pointing at an explicit API base URL with default timeouts.
    #[must_use]
    pub fn with_base_url(api_base_url: impl Into<String>) -> Self {
        let api_base_url = api_base_url.into().trim_end_matches('/').to_owned();
        Self { api_base_url, origin: DEFAULT_ORIGIN.to_owned(), timeouts: ClientTimeouts::default() }
    }

    /// Replace the API base URL, keeping origin and timeouts.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidBaseUrl`] unless `api_base_url` is an
    /// absolute http(s) URL; the config is left unchanged.
    pub fn set_api_base_url(&mut self, api_base_url: impl Into<String>) -> Result<(), ClientError> {
        let api_base_url = api_base_url.into();
        if !is_absolute_http(&api_base_url) {
            return Err(ClientError::InvalidBaseUrl(api_base_url));
        }
        self.api_base_url = api_base_url.trim_end_matches('/').to_owned();
        Ok(())
    }

    /// Build typed client config from environment variables.
    ///
    /// Optional:
    /// - `BOARD_ENV`: `development` (default) or `production`
    /// - `BOARD_ORIGIN`: front-end origin, default `http://localhost:3000`
    /// - `BOARD_API_BASE_URL`: overrides the environment-derived base URL
    /// - `BOARD_REQUEST_TIMEOUT_SECS`: default 30
    /// - `BOARD_CONNECT_TIMEOUT_SECS`: default 10
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown `BOARD_ENV` or a base URL that is not
    /// an absolute http(s) URL.
    pub fn from_env() -> Result<Self, ClientError> {
        let environment = parse_environment(std::env::var("BOARD_ENV").ok().as_deref())?;
        let origin = std::env::var("BOARD_ORIGIN")
            .unwrap_or_else(|_| DEFAULT_ORIGIN.to_owned())
            .trim_end_matches('/')
            .to_owned();

        let api_base_url = match std::env::var("BOARD_API_BASE_URL") {
            Ok(url) => url.trim_end_matches('/').to_owned(),
            Err(_) => resolve_base_url(environment, &origin),
        };
        if !is_absolute_http(&api_base_url) {
            return Err(ClientError::InvalidBaseUrl(api_base_url));
        }

        let timeouts = ClientTimeouts {
            request_secs: env_parse_u64("BOARD_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_secs: env_parse_u64("BOARD_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS),
        };

        Ok(Self { api_base_url, origin, timeouts })
    }
}

/// Base URL for an environment: direct backend in development, proxied
/// same-origin path otherwise.
#[must_use]
pub fn resolve_base_url(environment: Environment, origin: &str) -> String {
    match environment {
        Environment::Development => DEVELOPMENT_API_BASE_URL.to_owned(),
        Environment::Production => format!("{}{API_PREFIX}", origin.trim_end_matches('/')),
    }
}

fn parse_environment(raw: Option<&str>) -> Result<Environment, ClientError> {
    match raw.map(str::trim).unwrap_or("development") {
        "development" | "dev" | "local" => Ok(Environment::Development),
        "production" | "prod" => Ok(Environment::Production),
        other => Err(ClientError::ConfigParse(format!("unknown BOARD_ENV: {other}"))),
    }
}

fn is_absolute_http(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

fn env_parse_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(default)
}
