//! Page routes and navigation helpers.
//!
//! SYSTEM CONTEXT
//! ==============
//! Navigation itself is the UI's job (`Navigator::navigate`). This module only
//! knows the route table, carries one-shot state across a navigation through
//! the session scope, and refuses redirects that leave the origin.

#[cfg(test)]
#[path = "router_test.rs"]
mod router_test;

use reqwest::Url;
use serde_json::Value;

use crate::navigator::Navigator;
use crate::storage::{STORAGE_KEYS, Scope, Store};

/// Page paths served by the front end.
#[derive(Debug, Clone, Copy)]
pub struct Routes {
    /// Popular posts.
    pub home: &'static str,
    /// Full post list.
    pub board: &'static str,
    pub login: &'static str,
    pub signup: &'static str,
    pub profile: &'static str,
    /// Takes `?id=`.
    pub post_detail: &'static str,
    pub post_create: &'static str,
    /// Takes `?id=`.
    pub post_edit: &'static str,
}

pub const ROUTES: Routes = Routes {
    home: "/",
    board: "/board",
    login: "/login",
    signup: "/signup",
    profile: "/profile",
    post_detail: "/post-detail",
    post_create: "/post-create",
    post_edit: "/post-edit",
};

/// Navigate to `path`, stashing `state` for the next page when it has content.
pub fn navigate_to(navigator: &dyn Navigator, store: &Store, path: &str, state: &Value) {
    if has_content(state) {
        store.set(Scope::Session, STORAGE_KEYS.router_state, state);
    }
    navigator.navigate(path);
}

/// Read and remove the state stashed by [`navigate_to`].
#[must_use]
pub fn take_router_state(store: &Store) -> Option<Value> {
    let state = store.get::<Value>(Scope::Session, STORAGE_KEYS.router_state);
    store.remove(Scope::Session, STORAGE_KEYS.router_state);
    state
}

fn has_content(state: &Value) -> bool {
    match state {
        Value::Null => false,
        Value::Object(map) => !map.is_empty(),
        Value::Array(items) => !items.is_empty(),
        _ => true,
    }
}

/// Append URL-encoded query parameters to `path`.
#[must_use]
pub fn with_query<K: AsRef<str>, V: AsRef<str>>(path: &str, params: &[(K, V)]) -> String {
    if params.is_empty() {
        return path.to_owned();
    }
    let query = params
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k.as_ref()), urlencoding::encode(v.as_ref())))
        .collect::<Vec<_>>()
        .join("&");
    let separator = if path.contains('?') { '&' } else { '?' };
    format!("{path}{separator}{query}")
}

/// True when `url`, resolved against `origin`, points at another origin.
///
/// Unparseable input counts as internal.
#[must_use]
pub fn is_external_url(url: &str, origin: &str) -> bool {
    let Ok(base) = Url::parse(origin) else {
        return false;
    };
    match base.join(url) {
        Ok(resolved) => resolved.origin() != base.origin(),
        Err(_) => false,
    }
}

/// Navigate to `url` unless it leaves `origin`. Returns whether it navigated.
pub fn safe_redirect(navigator: &dyn Navigator, origin: &str, url: &str) -> bool {
    if is_external_url(url, origin) {
        tracing::warn!(url, "refusing redirect to external URL");
        return false;
    }
    navigator.navigate(url);
    true
}
