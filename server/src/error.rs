//! Server error type.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// An environment variable could not be parsed.
    #[error("config parse failed: {0}")]
    ConfigParse(String),

    /// The upstream HTTP client could not be built.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(#[source] reqwest::Error),

    /// Binding or serving the listener failed.
    #[error("server io failed: {0}")]
    Io(#[from] std::io::Error),

    /// The incoming request body could not be read.
    #[error("request body read failed: {0}")]
    BodyRead(String),

    /// The backend could not be reached or its response read.
    #[error("upstream request failed: {0}")]
    Upstream(#[source] reqwest::Error),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::BodyRead(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
            Self::ConfigParse(_) | Self::HttpClientBuild(_) | Self::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        tracing::warn!(error = %self, %status, "request failed");
        let body = serde_json::json!({ "message": self.to_string() });
        (status, axum::Json(body)).into_response()
    }
}
