//! Wire DTOs for the backend API and the normalized response envelope.
//!
//! DESIGN
//! ======
//! Backend payloads are camelCase JSON. Profile objects keep unknown fields in
//! `extra` so a shallow merge in the session broadcaster never drops data the
//! backend added.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Backend code: the access token expired, a refresh may recover.
pub const ACCESS_TOKEN_EXPIRED: &str = "ACCESS_TOKEN_EXPIRED";
/// Backend code: the refresh cookie expired, the session is gone.
pub const REFRESH_TOKEN_EXPIRED: &str = "REFRESH_TOKEN_EXPIRED";

const MALFORMED_BODY_MESSAGE: &str = "응답 형식이 올바르지 않습니다.";

// =============================================================================
// ENVELOPE
// =============================================================================

/// Normalized result of one request/response cycle.
///
/// `success` is true iff the transport completed with a 2xx status. `status`
/// is `None` only for network-level failures, which also never carry an
/// `error_code`.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T = Value> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
    pub status: Option<u16>,
    pub error_code: Option<String>,
}

impl<T> ApiResponse<T> {
    #[must_use]
    pub fn ok(data: Option<T>, status: u16) -> Self {
        Self { success: true, data, error: None, status: Some(status), error_code: None }
    }

    #[must_use]
    pub fn failure(error: impl Into<String>, status: u16, error_code: Option<String>) -> Self {
        Self { success: false, data: None, error: Some(error.into()), status: Some(status), error_code }
    }

    #[must_use]
    pub fn network_error(error: impl Into<String>) -> Self {
        Self { success: false, data: None, error: Some(error.into()), status: None, error_code: None }
    }

    /// True when no HTTP response was received at all.
    #[must_use]
    pub fn is_network_error(&self) -> bool {
        !self.success && self.status.is_none()
    }

    /// Same envelope with a replaced user-facing error message.
    #[must_use]
    pub fn with_error(self, error: impl Into<String>) -> Self {
        Self { error: Some(error.into()), ..self }
    }

    /// Transform the payload, keeping status and error fields.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ApiResponse<U> {
        ApiResponse {
            success: self.success,
            data: self.data.map(f),
            error: self.error,
            status: self.status,
            error_code: self.error_code,
        }
    }

    /// Drop the payload type, keeping status and error fields.
    #[must_use]
    pub fn discard<U>(self) -> ApiResponse<U> {
        ApiResponse {
            success: self.success,
            data: None,
            error: self.error,
            status: self.status,
            error_code: self.error_code,
        }
    }
}

impl ApiResponse<Value> {
    /// Decode a successful JSON payload into `T`.
    ///
    /// A body that does not match `T` turns the envelope into a failure with
    /// the original status, so callers only deal with one error channel.
    #[must_use]
    pub fn decode<T: DeserializeOwned>(self) -> ApiResponse<T> {
        if !self.success {
            return self.discard();
        }
        let status = self.status.unwrap_or(200);
        match self.data {
            None | Some(Value::Null) => ApiResponse::ok(None, status),
            Some(value) => match serde_json::from_value::<T>(value) {
                Ok(decoded) => ApiResponse::ok(Some(decoded), status),
                Err(e) => {
                    tracing::warn!(error = %e, status, "response body did not match expected shape");
                    ApiResponse::failure(MALFORMED_BODY_MESSAGE, status, None)
                }
            },
        }
    }
}

// =============================================================================
// USERS & AUTH
// =============================================================================

/// Logged-in user's profile as stored in session state.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default)]
    pub user_id: i64,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub nickname: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image: Option<String>,
    /// Fields the backend sends that this client does not model.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserProfile {
    #[must_use]
    pub fn new(user_id: i64, email: impl Into<String>, nickname: impl Into<String>) -> Self {
        Self { user_id, email: email.into(), nickname: nickname.into(), profile_image: None, extra: Map::new() }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct SignupRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub nickname: &'a str,
}

#[derive(Clone, Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub access_token: String,
    pub my_profile_response: UserProfile,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub access_token: String,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordChangeRequest<'a> {
    pub original_password: &'a str,
    pub new_password: &'a str,
}

// =============================================================================
// PAGINATION
// =============================================================================

/// Position after the last item of a page, as returned by the backend.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cursor {
    pub id: i64,
    pub created_at: String,
    #[serde(default)]
    pub has_next: bool,
}

/// Cursor pagination request. Cursor fields are sent only when both are set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CursorQuery {
    pub cursor_id: Option<i64>,
    pub cursor_created_at: Option<String>,
    pub size: u32,
}

pub const DEFAULT_PAGE_SIZE: u32 = 10;

impl Default for CursorQuery {
    fn default() -> Self {
        Self { cursor_id: None, cursor_created_at: None, size: DEFAULT_PAGE_SIZE }
    }
}

impl CursorQuery {
    /// Query for the page following `cursor` (first page when `None`).
    #[must_use]
    pub fn after(cursor: Option<&Cursor>, size: u32) -> Self {
        Self {
            cursor_id: cursor.map(|c| c.id),
            cursor_created_at: cursor.map(|c| c.created_at.clone()),
            size,
        }
    }

    /// Query-string pairs in wire order.
    #[must_use]
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = vec![("size".to_owned(), self.size.to_string())];
        if let (Some(id), Some(created_at)) = (self.cursor_id, self.cursor_created_at.as_deref()) {
            if !created_at.is_empty() {
                params.push(("cursorId".to_owned(), id.to_string()));
                params.push(("cursorCreatedAt".to_owned(), created_at.to_owned()));
            }
        }
        params
    }
}

// =============================================================================
// POSTS & COMMENTS
// =============================================================================

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub author_id: Option<i64>,
    #[serde(default)]
    pub author_nickname: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub view_count: Option<u64>,
    #[serde(default)]
    pub like_count: Option<u64>,
    #[serde(default)]
    pub comment_count: Option<u64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PostsPage {
    #[serde(default)]
    pub posts: Vec<Post>,
    #[serde(default)]
    pub cursor: Option<Cursor>,
}

/// Identifier echoed back by create endpoints.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Created {
    #[serde(alias = "postId", alias = "commentId")]
    pub id: i64,
}

#[derive(Clone, Debug, Serialize)]
pub struct PostInput<'a> {
    pub title: &'a str,
    pub content: &'a str,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: i64,
    pub content: String,
    #[serde(default)]
    pub author_id: Option<i64>,
    #[serde(default)]
    pub author_nickname: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CommentsPage {
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(default)]
    pub cursor: Option<Cursor>,
}

#[derive(Clone, Debug, Serialize)]
pub struct CommentInput<'a> {
    pub content: &'a str,
}
