//! Session-state broadcaster.
//!
//! DESIGN
//! ======
//! `AuthState` is the single authoritative answer to "is someone logged in,
//! and as whom". It is hydrated from stored credentials on construction and
//! mutated only through `login`, `logout` and `update_user`, each of which
//! writes storage and notifies observers in the same call.
//!
//! Observers are closures registered with `subscribe`, which returns a
//! `Subscription` token used for removal. Every observer receives the
//! current snapshot immediately on subscribe. Dispatch happens outside the
//! locks, so an observer may read state or even mutate it; a panicking
//! observer is logged and skipped without affecting the others.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use serde_json::Value;

use crate::net::types::UserProfile;
use crate::storage::AuthStorage;

/// Immutable view of the session handed to observers.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AuthSnapshot {
    pub is_logged_in: bool,
    pub user: Option<UserProfile>,
}

/// Removal token returned by [`AuthState::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Subscription(u64);

type Observer = Arc<dyn Fn(&AuthSnapshot) + Send + Sync>;

pub struct AuthState {
    storage: AuthStorage,
    snapshot: RwLock<AuthSnapshot>,
    observers: Mutex<Vec<(Subscription, Observer)>>,
    next_id: AtomicU64,
}

impl AuthState {
    /// Build the broadcaster, hydrating from stored credentials.
    ///
    /// The session counts as logged in only when token, login flag and
    /// profile are all present.
    #[must_use]
    pub fn new(storage: AuthStorage) -> Self {
        let user = storage.get_user_info();
        let is_logged_in = storage.has_complete_session() && user.is_some();
        tracing::debug!(is_logged_in, "session state hydrated");
        Self {
            storage,
            snapshot: RwLock::new(AuthSnapshot { is_logged_in, user }),
            observers: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Register `observer` and invoke it once with the current snapshot.
    pub fn subscribe<F>(&self, observer: F) -> Subscription
    where
        F: Fn(&AuthSnapshot) + Send + Sync + 'static,
    {
        let subscription = Subscription(self.next_id.fetch_add(1, Ordering::Relaxed));
        let observer: Observer = Arc::new(observer);
        self.observers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((subscription, Arc::clone(&observer)));

        let snapshot = self.get_state();
        dispatch(subscription, &observer, &snapshot);
        subscription
    }

    /// Remove an observer. Returns `false` if it was not registered.
    pub fn unsubscribe(&self, subscription: Subscription) -> bool {
        let mut observers = self.observers.lock().unwrap_or_else(PoisonError::into_inner);
        let before = observers.len();
        observers.retain(|(id, _)| *id != subscription);
        observers.len() != before
    }

    #[must_use]
    pub fn observer_count(&self) -> usize {
        self.observers.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Deliver the current snapshot to every registered observer.
    pub fn notify(&self) {
        let snapshot = self.get_state();
        let observers: Vec<(Subscription, Observer)> = self
            .observers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        for (subscription, observer) in &observers {
            dispatch(*subscription, observer, &snapshot);
        }
    }

    /// Current snapshot, by value.
    #[must_use]
    pub fn get_state(&self) -> AuthSnapshot {
        self.snapshot.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        self.snapshot.read().unwrap_or_else(PoisonError::into_inner).is_logged_in
    }

    #[must_use]
    pub fn current_user(&self) -> Option<UserProfile> {
        self.snapshot.read().unwrap_or_else(PoisonError::into_inner).user.clone()
    }

    /// Mark `user` as logged in, persist the profile and login flag, notify.
    pub fn login(&self, user: UserProfile) {
        {
            let mut snapshot = self.snapshot.write().unwrap_or_else(PoisonError::into_inner);
            snapshot.is_logged_in = true;
            snapshot.user = Some(user.clone());
        }
        self.storage.set_user_info(&user);
        self.storage.set_login_status(true);
        tracing::info!(user_id = user.user_id, "session logged in");
        self.notify();
    }

    /// Clear the session and every stored credential, then notify.
    ///
    /// Calling this while already logged out is harmless.
    pub fn logout(&self) {
        {
            let mut snapshot = self.snapshot.write().unwrap_or_else(PoisonError::into_inner);
            snapshot.is_logged_in = false;
            snapshot.user = None;
        }
        self.storage.clear_auth();
        tracing::info!("session logged out");
        self.notify();
    }

    /// Shallow-merge a JSON object into the current user, persist, notify.
    ///
    /// Non-object input is logged and ignored.
    pub fn update_user(&self, partial: Value) {
        let Value::Object(patch) = partial else {
            tracing::error!("update_user expects a JSON object; ignoring");
            return;
        };

        let merged = {
            let mut snapshot = self.snapshot.write().unwrap_or_else(PoisonError::into_inner);
            let mut base = match snapshot.user.as_ref().map(serde_json::to_value) {
                Some(Ok(Value::Object(map))) => map,
                _ => serde_json::Map::new(),
            };
            base.extend(patch);
            match serde_json::from_value::<UserProfile>(Value::Object(base)) {
                Ok(user) => {
                    snapshot.user = Some(user.clone());
                    user
                }
                Err(e) => {
                    tracing::error!(error = %e, "update_user produced an invalid profile; ignoring");
                    return;
                }
            }
        };

        self.storage.set_user_info(&merged);
        self.notify();
    }

    /// Replace profile fields with those of `profile` (see [`Self::update_user`]).
    pub fn update_profile(&self, profile: &UserProfile) {
        match serde_json::to_value(profile) {
            Ok(value) => self.update_user(value),
            Err(e) => tracing::error!(error = %e, "profile serialization failed"),
        }
    }
}

fn dispatch(subscription: Subscription, observer: &Observer, snapshot: &AuthSnapshot) {
    if let Err(panic) = catch_unwind(AssertUnwindSafe(|| (**observer)(snapshot))) {
        let reason = panic
            .downcast_ref::<&str>()
            .map(|s| (*s).to_owned())
            .or_else(|| panic.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_owned());
        tracing::error!(subscription = subscription.0, %reason, "session observer panicked");
    }
}
