//! Server configuration parsed from environment variables.

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

use std::path::PathBuf;

use crate::error::ServerError;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_STATIC_DIR: &str = "public";
pub const DEFAULT_API_TARGET: &str = "http://localhost:8080";
pub const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    pub static_dir: PathBuf,
    /// Backend origin; `/api/*` is forwarded to `{api_target}/api/*`.
    pub api_target: String,
    pub upstream_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            static_dir: PathBuf::from(DEFAULT_STATIC_DIR),
            api_target: DEFAULT_API_TARGET.to_owned(),
            upstream_timeout_secs: DEFAULT_UPSTREAM_TIMEOUT_SECS,
        }
    }
}

impl ServerConfig {
    /// Build typed server config from environment variables.
    ///
    /// Optional:
    /// - `PORT` (default 3000)
    /// - `STATIC_DIR` (default `public`)
    /// - `API_TARGET` (default `http://localhost:8080`)
    /// - `UPSTREAM_TIMEOUT_SECS` (default 30)
    ///
    /// # Errors
    ///
    /// Returns an error if `PORT` is not a valid port or `API_TARGET` is not
    /// an absolute http(s) URL.
    pub fn from_env() -> Result<Self, ServerError> {
        let port = match std::env::var("PORT") {
            Ok(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| ServerError::ConfigParse(format!("invalid PORT: {raw}")))?,
            Err(_) => DEFAULT_PORT,
        };
        let static_dir = std::env::var("STATIC_DIR").map_or_else(|_| PathBuf::from(DEFAULT_STATIC_DIR), PathBuf::from);
        let api_target = std::env::var("API_TARGET")
            .unwrap_or_else(|_| DEFAULT_API_TARGET.to_owned())
            .trim_end_matches('/')
            .to_owned();
        if !api_target.starts_with("http://") && !api_target.starts_with("https://") {
            return Err(ServerError::ConfigParse(format!("invalid API_TARGET: {api_target}")));
        }
        let upstream_timeout_secs = env_parse_u64("UPSTREAM_TIMEOUT_SECS", DEFAULT_UPSTREAM_TIMEOUT_SECS);

        Ok(Self { port, static_dir, api_target, upstream_timeout_secs })
    }
}

fn env_parse_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(default)
}
