//! `/api/*` reverse proxy.
//!
//! DESIGN
//! ======
//! Requests are forwarded to `{api_target}` with the same method, path,
//! query, headers and body. Hop-by-hop headers and `Host` are dropped in both
//! directions; everything else, including `Set-Cookie`, is passed through.
//! Bodies are buffered, which is fine for JSON and form uploads up to
//! [`MAX_BODY_BYTES`].

#[cfg(test)]
#[path = "proxy_test.rs"]
mod tests;

use axum::body::{Body, to_bytes};
use axum::extract::{Request, State};
use axum::http::HeaderMap;
use axum::http::header::{self, HeaderName};
use axum::response::Response;

use crate::error::ServerError;
use crate::state::AppState;

pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

const HOP_BY_HOP: [HeaderName; 9] = [
    header::CONNECTION,
    HeaderName::from_static("keep-alive"),
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
    header::CONTENT_LENGTH,
];

/// Remove headers that describe a single connection rather than the message.
pub fn strip_hop_by_hop(headers: &mut HeaderMap) {
    for name in &HOP_BY_HOP {
        headers.remove(name);
    }
}

/// Upstream URL for an incoming `/api/...` path and query.
#[must_use]
pub fn upstream_url(api_target: &str, path_and_query: &str) -> String {
    format!("{}{path_and_query}", api_target.trim_end_matches('/'))
}

pub async fn forward(State(state): State<AppState>, req: Request) -> Result<Response, ServerError> {
    let (parts, body) = req.into_parts();
    let path_and_query = parts.uri.path_and_query().map_or_else(|| parts.uri.path(), |pq| pq.as_str());
    let url = upstream_url(&state.api_target, path_and_query);

    let body = to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(|e| ServerError::BodyRead(e.to_string()))?;

    let mut headers = parts.headers;
    strip_hop_by_hop(&mut headers);
    headers.remove(header::HOST);

    let upstream = state
        .http
        .request(parts.method.clone(), &url)
        .headers(headers)
        .body(body)
        .send()
        .await
        .map_err(|e| {
            tracing::warn!(error = %e, %url, "upstream unreachable");
            ServerError::Upstream(e)
        })?;

    let status = upstream.status();
    let mut response_headers = upstream.headers().clone();
    strip_hop_by_hop(&mut response_headers);
    let bytes = upstream.bytes().await.map_err(ServerError::Upstream)?;

    tracing::debug!(method = %parts.method, %url, %status, size = bytes.len(), "proxied");

    let mut response = Response::new(Body::from(bytes));
    *response.status_mut() = status;
    *response.headers_mut() = response_headers;
    Ok(response)
}
