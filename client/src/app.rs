//! Composition root.
//!
//! ARCHITECTURE
//! ============
//! `BoardApp` builds exactly one store, session broadcaster and HTTP client
//! and hands shared references to the services. The auth service is then
//! registered with the client as its token refresher through a weak handle,
//! which closes the client/auth cycle without a reference loop.

#[cfg(test)]
#[path = "app_test.rs"]
mod tests;

use std::path::Path;
use std::sync::Arc;

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::navigator::Navigator;
use crate::net::api::{ApiClient, TokenRefresher};
use crate::services::{AuthService, CommentsService, PostsService};
use crate::state::AuthState;
use crate::storage::{AuthStorage, Store};

pub struct BoardApp {
    pub config: ClientConfig,
    pub store: Arc<Store>,
    pub storage: AuthStorage,
    pub session: Arc<AuthState>,
    pub api: Arc<ApiClient>,
    pub auth: Arc<AuthService>,
    pub posts: PostsService,
    pub comments: CommentsService,
    navigator: Arc<dyn Navigator>,
}

impl BoardApp {
    /// Wire every component around `store`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: ClientConfig, store: Arc<Store>, navigator: Arc<dyn Navigator>) -> Result<Self, ClientError> {
        let storage = AuthStorage::new(Arc::clone(&store));
        let session = Arc::new(AuthState::new(storage.clone()));
        let api = Arc::new(ApiClient::new(&config, storage.clone(), Arc::clone(&session), Arc::clone(&navigator))?);

        let auth = Arc::new(AuthService::new(Arc::clone(&api)));
        let refresher: Arc<dyn TokenRefresher> = auth.clone();
        api.set_refresher(Arc::downgrade(&refresher));

        tracing::info!(base_url = api.base_url(), logged_in = session.is_logged_in(), "board client ready");

        Ok(Self {
            posts: PostsService::new(Arc::clone(&api)),
            comments: CommentsService::new(Arc::clone(&api)),
            config,
            store,
            storage,
            session,
            api,
            auth,
            navigator,
        })
    }

    /// In-memory app, nothing persists past the process.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn in_memory(config: ClientConfig, navigator: Arc<dyn Navigator>) -> Result<Self, ClientError> {
        Self::new(config, Arc::new(Store::in_memory()), navigator)
    }

    /// App whose durable scope is `<data_dir>/local.json`.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage file cannot be opened or the HTTP
    /// client cannot be built.
    pub fn with_data_dir(
        config: ClientConfig,
        data_dir: &Path,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, ClientError> {
        let store = Store::with_local_file(data_dir.join("local.json"))?;
        Self::new(config, Arc::new(store), navigator)
    }

    #[must_use]
    pub fn navigator(&self) -> &Arc<dyn Navigator> {
        &self.navigator
    }
}
