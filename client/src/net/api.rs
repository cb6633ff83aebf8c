//! HTTP client core: the single funnel for every backend call.
//!
//! DESIGN
//! ======
//! `ApiClient::request` resolves the endpoint against the configured base
//! URL, attaches the stored bearer token, sends cookies from a shared jar (so
//! the HTTP-only refresh cookie travels with every call) and folds whatever
//! happens into an [`ApiResponse`] envelope. It never returns `Err`.
//!
//! SESSION RENEWAL
//! ===============
//! A 401 carrying `ACCESS_TOKEN_EXPIRED` triggers one token refresh followed
//! by exactly one retry of the original request. `REFRESH_TOKEN_EXPIRED`, or
//! a refresh that yields no token, ends the session: credentials are cleared
//! through the broadcaster, the user is told, and the UI is sent to login.
//!
//! Refreshes are single-flight. The first caller stores a shared future in
//! `pending_refresh` while still holding the lock, before anything awaits;
//! later callers clone and await that same future. The future empties the
//! slot itself when it settles, success or not. A request whose 401 arrives
//! after that point compares the token it sent with the stored one and
//! reuses a newer token instead of starting a second refresh. Expiry runs
//! once per failed token: later failures find the credentials already gone.
//!
//! The refresh call lives in the auth service, which itself depends on this
//! client. The cycle is broken by the [`TokenRefresher`] trait: the client
//! keeps only a `Weak` handle registered after both sides exist.

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use std::sync::{Arc, Mutex, PoisonError, RwLock, Weak};
use std::time::Duration;

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use reqwest::Method;
use reqwest::header::{CONTENT_TYPE, HeaderMap};
use serde::Serialize;
use serde_json::Value;

use super::types::{ACCESS_TOKEN_EXPIRED, ApiResponse, REFRESH_TOKEN_EXPIRED};
use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::navigator::{Navigator, ToastKind};
use crate::state::AuthState;
use crate::storage::AuthStorage;
use crate::util::router::{ROUTES, with_query};

const NETWORK_ERROR_MESSAGE: &str = "네트워크 에러가 발생했습니다.";
const SESSION_EXPIRED_MESSAGE: &str = "세션이 만료되었습니다. 다시 로그인해주세요.";
const INVALID_BODY_MESSAGE: &str = "요청 본문을 만들 수 없습니다.";

// =============================================================================
// REQUEST OPTIONS
// =============================================================================

/// Body carried by a request.
#[derive(Clone, Debug, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    /// Sent as `application/json`.
    Json(Value),
    /// Sent as `multipart/form-data`; the transport picks the boundary.
    Form(FormData),
}

/// Transport options for [`ApiClient::request`].
#[derive(Clone, Debug)]
pub struct RequestOptions {
    pub method: Method,
    pub headers: HeaderMap,
    pub body: RequestBody,
}

impl RequestOptions {
    #[must_use]
    pub fn new(method: Method) -> Self {
        Self { method, headers: HeaderMap::new(), body: RequestBody::Empty }
    }

    #[must_use]
    pub fn json(method: Method, body: Value) -> Self {
        Self { method, headers: HeaderMap::new(), body: RequestBody::Json(body) }
    }
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self::new(Method::GET)
    }
}

/// Replayable multipart payload. Kept as plain data so a request can be
/// re-issued after a token refresh.
#[derive(Clone, Debug, Default)]
pub struct FormData {
    parts: Vec<FormPart>,
}

#[derive(Clone, Debug)]
enum FormPart {
    Text { name: String, value: String },
    File { name: String, file_name: String, mime: Option<String>, bytes: Vec<u8> },
}

impl FormData {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parts.push(FormPart::Text { name: name.into(), value: value.into() });
        self
    }

    #[must_use]
    pub fn file(
        mut self,
        name: impl Into<String>,
        file_name: impl Into<String>,
        mime: Option<&str>,
        bytes: Vec<u8>,
    ) -> Self {
        self.parts.push(FormPart::File {
            name: name.into(),
            file_name: file_name.into(),
            mime: mime.map(str::to_owned),
            bytes,
        });
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    fn to_multipart(&self) -> reqwest::multipart::Form {
        self.parts.iter().fold(reqwest::multipart::Form::new(), |form, part| match part {
            FormPart::Text { name, value } => form.text(name.clone(), value.clone()),
            FormPart::File { name, file_name, mime, bytes } => {
                let base = reqwest::multipart::Part::bytes(bytes.clone()).file_name(file_name.clone());
                let part = match mime.as_deref() {
                    Some(mime) => match base.mime_str(mime) {
                        Ok(part) => part,
                        Err(e) => {
                            tracing::warn!(error = %e, mime, "ignoring invalid multipart mime type");
                            reqwest::multipart::Part::bytes(bytes.clone()).file_name(file_name.clone())
                        }
                    },
                    None => base,
                };
                form.part(name.clone(), part)
            }
        })
    }
}

// =============================================================================
// TOKEN REFRESHER
// =============================================================================

/// Capability that mints a new access token from the refresh cookie.
#[async_trait::async_trait]
pub trait TokenRefresher: Send + Sync {
    /// Returns the new access token, or `None` if the refresh failed.
    async fn refresh_token(&self) -> Option<String>;
}

type RefreshFuture = Shared<BoxFuture<'static, Option<String>>>;

// =============================================================================
// CLIENT
// =============================================================================

pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    storage: AuthStorage,
    session: Arc<AuthState>,
    navigator: Arc<dyn Navigator>,
    refresher: RwLock<Option<Weak<dyn TokenRefresher>>>,
    pending_refresh: Arc<Mutex<Option<RefreshFuture>>>,
    expiry_lock: Mutex<()>,
}

enum Renewal {
    Token(String),
    SessionEnded,
    Failed,
}

impl ApiClient {
    /// Build the client with a cookie-keeping transport.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(
        config: &ClientConfig,
        storage: AuthStorage,
        session: Arc<AuthState>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(Duration::from_secs(config.timeouts.request_secs))
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .build()?;
        Ok(Self {
            http,
            base_url: config.api_base_url.trim_end_matches('/').to_owned(),
            storage,
            session,
            navigator,
            refresher: RwLock::new(None),
            pending_refresh: Arc::new(Mutex::new(None)),
            expiry_lock: Mutex::new(()),
        })
    }

    /// Register the refresher used for `ACCESS_TOKEN_EXPIRED` recovery.
    ///
    /// Only a weak handle is kept; the refresher usually owns this client.
    pub fn set_refresher(&self, refresher: Weak<dyn TokenRefresher>) {
        *self.refresher.write().unwrap_or_else(PoisonError::into_inner) = Some(refresher);
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub fn storage(&self) -> &AuthStorage {
        &self.storage
    }

    #[must_use]
    pub fn session(&self) -> &Arc<AuthState> {
        &self.session
    }

    #[must_use]
    pub fn navigator(&self) -> &Arc<dyn Navigator> {
        &self.navigator
    }

    /// Absolute endpoints pass through; anything else is joined onto the base URL.
    #[must_use]
    pub fn resolve_url(&self, endpoint: &str) -> String {
        if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            endpoint.to_owned()
        } else if endpoint.starts_with('/') {
            format!("{}{endpoint}", self.base_url)
        } else {
            format!("{}/{endpoint}", self.base_url)
        }
    }

    /// Send a request, transparently renewing an expired access token once.
    pub async fn request(&self, endpoint: &str, options: RequestOptions) -> ApiResponse {
        let token = self.storage.get_token();
        let response = self.send(endpoint, &options, token.as_deref()).await;
        if response.status != Some(401) {
            return response;
        }

        match response.error_code.as_deref() {
            Some(REFRESH_TOKEN_EXPIRED) => {
                tracing::warn!(endpoint, "refresh token expired");
                self.expire_session(token.as_deref());
                response
            }
            Some(ACCESS_TOKEN_EXPIRED) => match self.renewed_token(token.as_deref()).await {
                Renewal::Token(new_token) => {
                    tracing::debug!(endpoint, "retrying with refreshed access token");
                    self.send(endpoint, &options, Some(&new_token)).await
                }
                Renewal::SessionEnded => response,
                Renewal::Failed => {
                    tracing::warn!(endpoint, "access token refresh failed");
                    self.expire_session(token.as_deref());
                    response
                }
            },
            _ => response,
        }
    }

    /// Token to retry with after `sent` was rejected as expired.
    ///
    /// A refresh runs only while `sent` is still the stored token. If another
    /// request already stored a newer one, that token is reused; if the
    /// session was cleared meanwhile there is nothing to retry with.
    async fn renewed_token(&self, sent: Option<&str>) -> Renewal {
        let stored = self.storage.get_token();
        if stored.as_deref() != sent {
            return match stored {
                Some(newer) => {
                    tracing::debug!("access token already renewed");
                    Renewal::Token(newer)
                }
                None => Renewal::SessionEnded,
            };
        }
        match self.refresh_access_token().await {
            Some(token) => Renewal::Token(token),
            None => Renewal::Failed,
        }
    }

    /// Send a request without the 401 renewal protocol.
    ///
    /// Used for the refresh call itself, which must never recurse into a refresh.
    pub async fn request_without_renewal(&self, endpoint: &str, options: RequestOptions) -> ApiResponse {
        let token = self.storage.get_token();
        self.send(endpoint, &options, token.as_deref()).await
    }

    /// Obtain a fresh access token, sharing one in-flight refresh between callers.
    ///
    /// On success the token is persisted before any waiter resumes. On failure
    /// every waiter gets `None` and stored credentials are left untouched.
    pub async fn refresh_access_token(&self) -> Option<String> {
        let pending = {
            let mut slot = self.pending_refresh.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(existing) = slot.as_ref() {
                existing.clone()
            } else {
                let started = self.start_refresh();
                *slot = Some(started.clone());
                started
            }
        };
        pending.await
    }

    fn start_refresh(&self) -> RefreshFuture {
        let refresher = self
            .refresher
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .and_then(Weak::upgrade);
        let storage = self.storage.clone();
        let slot = Arc::clone(&self.pending_refresh);

        async move {
            let token = match refresher {
                Some(refresher) => refresher.refresh_token().await,
                None => {
                    tracing::warn!("no token refresher registered");
                    None
                }
            };
            if let Some(token) = token.as_deref() {
                storage.set_token(token);
            }
            slot.lock().unwrap_or_else(PoisonError::into_inner).take();
            token
        }
        .boxed()
        .shared()
    }

    /// Drop the session, tell the user, and send them to the login page.
    ///
    /// Only the first request that failed with `failed_token` does this;
    /// later ones find the stored token already gone.
    fn expire_session(&self, failed_token: Option<&str>) {
        let _expiring = self.expiry_lock.lock().unwrap_or_else(PoisonError::into_inner);
        if failed_token.is_some() && self.storage.get_token().as_deref() != failed_token {
            tracing::debug!("session already expired");
            return;
        }
        self.session.logout();
        self.navigator.toast(ToastKind::Warning, SESSION_EXPIRED_MESSAGE);
        self.navigator.navigate(ROUTES.login);
    }

    async fn send(&self, endpoint: &str, options: &RequestOptions, token: Option<&str>) -> ApiResponse {
        let url = self.resolve_url(endpoint);
        let mut builder = self
            .http
            .request(options.method.clone(), &url)
            .headers(options.headers.clone());
        if let Some(token) = token {
            builder = builder.bearer_auth(token);
        }
        builder = match &options.body {
            RequestBody::Empty => builder,
            RequestBody::Json(body) => builder.json(body),
            RequestBody::Form(form) => builder.multipart(form.to_multipart()),
        };

        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(error = %e, method = %options.method, %url, "API request failed");
                return ApiResponse::network_error(network_error_message(&e.to_string()));
            }
        };

        let status = response.status().as_u16();
        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.contains("application/json"));
        let text = match response.text().await {
            Ok(text) => text,
            Err(e) => {
                tracing::error!(error = %e, status, %url, "API response body read failed");
                return ApiResponse::network_error(network_error_message(&e.to_string()));
            }
        };

        envelope(status, parse_body(status, is_json, &text))
    }

    // =========================================================================
    // CONVENIENCE
    // =========================================================================

    /// `GET` with query parameters appended to the endpoint.
    pub async fn get<K: AsRef<str>, V: AsRef<str>>(&self, endpoint: &str, params: &[(K, V)]) -> ApiResponse {
        let url = with_query(endpoint, params);
        self.request(&url, RequestOptions::new(Method::GET)).await
    }

    pub async fn post<B: Serialize + ?Sized>(&self, endpoint: &str, body: &B) -> ApiResponse {
        self.send_json(Method::POST, endpoint, body).await
    }

    pub async fn put<B: Serialize + ?Sized>(&self, endpoint: &str, body: &B) -> ApiResponse {
        self.send_json(Method::PUT, endpoint, body).await
    }

    pub async fn patch<B: Serialize + ?Sized>(&self, endpoint: &str, body: &B) -> ApiResponse {
        self.send_json(Method::PATCH, endpoint, body).await
    }

    pub async fn delete(&self, endpoint: &str) -> ApiResponse {
        self.request(endpoint, RequestOptions::new(Method::DELETE)).await
    }

    /// `POST` a multipart form.
    pub async fn post_form(&self, endpoint: &str, form: FormData) -> ApiResponse {
        let options = RequestOptions { method: Method::POST, headers: HeaderMap::new(), body: RequestBody::Form(form) };
        self.request(endpoint, options).await
    }

    async fn send_json<B: Serialize + ?Sized>(&self, method: Method, endpoint: &str, body: &B) -> ApiResponse {
        match serde_json::to_value(body) {
            Ok(value) => self.request(endpoint, RequestOptions::json(method, value)).await,
            Err(e) => {
                tracing::error!(error = %e, endpoint, "request body serialization failed");
                ApiResponse::network_error(INVALID_BODY_MESSAGE)
            }
        }
    }
}

// =============================================================================
// RESPONSE NORMALIZATION
// =============================================================================

/// Decode a response body: nothing for 204 or empty bodies, JSON when it
/// parses, the raw text otherwise.
fn parse_body(status: u16, is_json: bool, text: &str) -> Option<Value> {
    if status == 204 || text.is_empty() {
        return None;
    }
    match serde_json::from_str::<Value>(text) {
        Ok(value) => Some(value),
        Err(e) => {
            if is_json {
                tracing::warn!(error = %e, status, "JSON content-type with unparseable body");
            }
            Some(Value::String(text.to_owned()))
        }
    }
}

fn envelope(status: u16, data: Option<Value>) -> ApiResponse {
    if (200..300).contains(&status) {
        return ApiResponse::ok(data, status);
    }
    let message = error_message_from_body(data.as_ref()).unwrap_or_else(|| format!("HTTP {status} 에러"));
    let error_code = data
        .as_ref()
        .and_then(|d| d.get("errorCode"))
        .and_then(Value::as_str)
        .map(str::to_owned);
    ApiResponse::failure(message, status, error_code)
}

/// Backend-provided `message`, else `error`, ignoring empty strings.
fn error_message_from_body(data: Option<&Value>) -> Option<String> {
    let data = data?;
    ["message", "error"]
        .iter()
        .filter_map(|field| data.get(field).and_then(Value::as_str))
        .find(|s| !s.is_empty())
        .map(str::to_owned)
}

fn network_error_message(raw: &str) -> String {
    if raw.trim().is_empty() { NETWORK_ERROR_MESSAGE.to_owned() } else { raw.to_owned() }
}
