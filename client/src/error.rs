//! Errors for client construction and configuration.
//!
//! Request-level failures never surface here: the HTTP core folds them into
//! [`crate::net::types::ApiResponse`] envelopes.

/// Errors produced while configuring or building the client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// A configuration value could not be parsed.
    #[error("config parse failed: {0}")]
    ConfigParse(String),

    /// The API base URL is not an absolute http(s) URL.
    #[error("invalid API base URL: {0}")]
    InvalidBaseUrl(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(#[from] reqwest::Error),

    /// A storage backend could not be opened.
    #[error(transparent)]
    Storage(#[from] crate::storage::StorageError),
}
