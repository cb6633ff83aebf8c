//! Named accessors for the stored credentials.

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;

use std::sync::Arc;

use super::{Scope, Store};
use crate::net::types::UserProfile;

/// Durable- and session-scope keys used by the client.
#[derive(Debug, Clone, Copy)]
pub struct StorageKeys {
    pub auth_token: &'static str,
    pub user_info: &'static str,
    pub login_status: &'static str,
    pub router_state: &'static str,
}

pub const STORAGE_KEYS: StorageKeys = StorageKeys {
    auth_token: "auth_token",
    user_info: "user_info",
    login_status: "is_logged_in",
    router_state: "__router_state__",
};

/// Credential facet over the durable scope of a [`Store`].
#[derive(Clone)]
pub struct AuthStorage {
    store: Arc<Store>,
}

impl AuthStorage {
    #[must_use]
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    #[must_use]
    pub fn store(&self) -> &Arc<Store> {
        &self.store
    }

    pub fn set_token(&self, token: &str) {
        self.store.set(Scope::Local, STORAGE_KEYS.auth_token, token);
    }

    #[must_use]
    /// Stored access token; an empty string counts as no token.
    pub fn get_token(&self) -> Option<String> {
        self.store
            .get::<String>(Scope::Local, STORAGE_KEYS.auth_token)
            .filter(|token| !token.is_empty())
    }

    pub fn remove_token(&self) {
        self.store.remove(Scope::Local, STORAGE_KEYS.auth_token);
    }

    pub fn set_user_info(&self, user: &UserProfile) {
        self.store.set(Scope::Local, STORAGE_KEYS.user_info, user);
    }

    #[must_use]
    pub fn get_user_info(&self) -> Option<UserProfile> {
        self.store.get(Scope::Local, STORAGE_KEYS.user_info)
    }

    pub fn remove_user_info(&self) {
        self.store.remove(Scope::Local, STORAGE_KEYS.user_info);
    }

    pub fn set_login_status(&self, logged_in: bool) {
        self.store.set(Scope::Local, STORAGE_KEYS.login_status, &logged_in);
    }

    /// Stored login flag; `false` when absent or unreadable.
    #[must_use]
    pub fn get_login_status(&self) -> bool {
        self.store.get(Scope::Local, STORAGE_KEYS.login_status).unwrap_or(false)
    }

    /// Remove token, profile and login flag.
    pub fn clear_auth(&self) {
        self.remove_token();
        self.remove_user_info();
        self.store.remove(Scope::Local, STORAGE_KEYS.login_status);
    }

    /// True only when a token, the login flag and a profile are all stored.
    #[must_use]
    pub fn has_complete_session(&self) -> bool {
        self.get_token().is_some() && self.get_login_status() && self.get_user_info().is_some()
    }
}
