//! Account and session endpoints.
//!
//! DESIGN
//! ======
//! Login stores the access token and hands the profile to the session
//! broadcaster, so observers learn about it in the same call. Logout clears
//! local state whatever the backend says. The service also implements
//! [`TokenRefresher`] for the client core; the refresh request bypasses the
//! core's own renewal logic so a failing refresh cannot recurse.

use std::sync::Arc;

use reqwest::Method;
use serde_json::{Value, json};

use crate::net::api::{ApiClient, RequestOptions, TokenRefresher};
use crate::net::types::{
    ApiResponse, LoginRequest, LoginResponse, PasswordChangeRequest, RefreshResponse, SignupRequest, UserProfile,
};
use crate::state::AuthState;
use crate::storage::AuthStorage;

const DUPLICATE_EMAIL_MESSAGE: &str = "이미 가입된 이메일입니다.";

pub struct AuthService {
    api: Arc<ApiClient>,
}

impl AuthService {
    #[must_use]
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    fn storage(&self) -> &AuthStorage {
        self.api.storage()
    }

    fn session(&self) -> &Arc<AuthState> {
        self.api.session()
    }

    /// `POST /users`. A 409 is reported as a duplicate email.
    pub async fn signup(&self, email: &str, password: &str, nickname: &str) -> ApiResponse {
        let response = self.api.post("/users", &SignupRequest { email, password, nickname }).await;
        if response.success {
            tracing::info!(email, "signup succeeded");
            return response;
        }
        tracing::warn!(status = ?response.status, error = ?response.error, "signup failed");
        if response.status == Some(409) {
            return response.with_error(DUPLICATE_EMAIL_MESSAGE);
        }
        response
    }

    /// `POST /auth`. On success the token is stored and the session logged in.
    pub async fn login(&self, email: &str, password: &str) -> ApiResponse<UserProfile> {
        let response = self.api.post("/auth", &LoginRequest { email, password }).await.decode::<LoginResponse>();
        let status = response.status.unwrap_or(200);
        match response.data {
            Some(LoginResponse { access_token, my_profile_response }) if response.success => {
                self.storage().set_token(&access_token);
                self.session().login(my_profile_response.clone());
                ApiResponse::ok(Some(my_profile_response), status)
            }
            _ => {
                tracing::warn!(status = ?response.status, error = ?response.error, "login failed");
                if response.success {
                    return ApiResponse::failure("로그인 응답이 비어 있습니다.", status, None);
                }
                response.discard()
            }
        }
    }

    /// `DELETE /auth`, then clear the local session regardless of the outcome.
    pub async fn logout(&self) -> ApiResponse {
        let response = self.api.delete("/auth").await;
        if !response.success {
            tracing::warn!(status = ?response.status, error = ?response.error, "logout request failed");
        }
        self.session().logout();
        response
    }

    /// `GET /users/me`, refreshing the stored profile on success.
    pub async fn get_current_user(&self) -> ApiResponse<UserProfile> {
        let response = self.api.get::<&str, &str>("/users/me", &[]).await.decode::<UserProfile>();
        match (&response.data, response.success) {
            (Some(profile), true) => self.session().update_profile(profile),
            (_, false) => tracing::warn!(status = ?response.status, error = ?response.error, "fetching profile failed"),
            (None, true) => {}
        }
        response
    }

    pub async fn change_password(&self, original_password: &str, new_password: &str) -> ApiResponse {
        let body = PasswordChangeRequest { original_password, new_password };
        let response = self.api.patch("/users/me/password", &body).await;
        if !response.success {
            tracing::warn!(status = ?response.status, error = ?response.error, "password change failed");
        }
        response
    }

    /// `PATCH /users/me/nickname`, merging the result into the session.
    ///
    /// A response without a profile body still applies the new nickname.
    pub async fn update_nickname(&self, nickname: &str) -> ApiResponse {
        let response = self.api.patch("/users/me/nickname", &json!({ "nickname": nickname })).await;
        if !response.success {
            tracing::warn!(status = ?response.status, error = ?response.error, "nickname change failed");
            return response;
        }
        match &response.data {
            Some(data @ Value::Object(_)) => self.session().update_user(data.clone()),
            _ => self.session().update_user(json!({ "nickname": nickname })),
        }
        response
    }

    /// `DELETE /users`. The local session is cleared only on success.
    pub async fn delete_account(&self) -> ApiResponse {
        let response = self.api.delete("/users").await;
        if response.success {
            tracing::info!("account deleted");
            self.session().logout();
        } else {
            tracing::warn!(status = ?response.status, error = ?response.error, "account deletion failed");
        }
        response
    }

    pub async fn check_email_duplicate(&self, email: &str) -> ApiResponse {
        self.api.get("/users/check-email", &[("email", email)]).await
    }

    pub async fn check_nickname_duplicate(&self, nickname: &str) -> ApiResponse {
        self.api.get("/users/check-nickname", &[("nickname", nickname)]).await
    }

    /// Stored-credential check: token, login flag and profile all present.
    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        self.storage().has_complete_session()
    }

    /// `GET /auth/refresh`, authenticated by the refresh cookie.
    ///
    /// Returns the new access token. Persisting it is left to the client
    /// core, which owns the single-flight slot.
    pub async fn refresh_token(&self) -> Option<String> {
        let response = self
            .api
            .request_without_renewal("/auth/refresh", RequestOptions::new(Method::GET))
            .await
            .decode::<RefreshResponse>();
        match response.data {
            Some(RefreshResponse { access_token }) if response.success => Some(access_token),
            _ => {
                tracing::warn!(
                    status = ?response.status,
                    error_code = ?response.error_code,
                    "token refresh failed"
                );
                None
            }
        }
    }
}

#[async_trait::async_trait]
impl TokenRefresher for AuthService {
    async fn refresh_token(&self) -> Option<String> {
        AuthService::refresh_token(self).await
    }
}
