//! Clean page URLs.

#[cfg(test)]
#[path = "pages_test.rs"]
mod tests;

use axum::extract::Request;
use axum::http::Uri;

/// Public path to HTML file under the static directory.
pub const CLEAN_URLS: &[(&str, &str)] = &[
    ("/login", "/pages/login.html"),
    ("/signup", "/pages/signup.html"),
    ("/profile", "/pages/profile.html"),
    ("/board", "/pages/posts.html"),
    ("/post-detail", "/pages/post-detail.html"),
    ("/post-create", "/pages/post-form.html"),
    ("/post-edit", "/pages/post-form.html"),
];

/// HTML file behind a clean path. A single trailing slash is tolerated.
#[must_use]
pub fn page_for(path: &str) -> Option<&'static str> {
    let path = path.strip_suffix('/').filter(|p| !p.is_empty()).unwrap_or(path);
    CLEAN_URLS.iter().find(|(clean, _)| *clean == path).map(|(_, file)| *file)
}

/// Rewritten URI for a clean path, keeping the query string.
#[must_use]
pub fn rewrite_uri(uri: &Uri) -> Option<Uri> {
    let file = page_for(uri.path())?;
    let target = match uri.query() {
        Some(query) => format!("{file}?{query}"),
        None => file.to_owned(),
    };
    target.parse().ok()
}

pub async fn rewrite_clean_url(mut req: Request) -> Request {
    if let Some(uri) = rewrite_uri(req.uri()) {
        tracing::debug!(from = %req.uri(), to = %uri, "clean url rewrite");
        *req.uri_mut() = uri;
    }
    req
}
