//! Comment endpoints.

use std::sync::Arc;

use crate::net::api::ApiClient;
use crate::net::types::{ApiResponse, CommentInput, CommentsPage, Created, Cursor, CursorQuery};

pub struct CommentsService {
    api: Arc<ApiClient>,
}

impl CommentsService {
    #[must_use]
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    /// `GET /posts/{post_id}/comments`, cursor-paginated like posts.
    pub async fn fetch_comments(&self, post_id: i64, cursor: Option<&Cursor>, size: u32) -> ApiResponse<CommentsPage> {
        let params = CursorQuery::after(cursor, size).to_params();
        let response = self
            .api
            .get(&format!("/posts/{post_id}/comments"), params.as_slice())
            .await
            .decode::<CommentsPage>();
        if !response.success {
            tracing::warn!(post_id, status = ?response.status, error = ?response.error, "fetching comments failed");
        }
        response
    }

    pub async fn create_comment(&self, post_id: i64, content: &str) -> ApiResponse<Created> {
        let response = self
            .api
            .post(&format!("/posts/{post_id}/comments"), &CommentInput { content })
            .await
            .decode::<Created>();
        if !response.success {
            tracing::warn!(post_id, status = ?response.status, error = ?response.error, "creating comment failed");
        }
        response
    }

    pub async fn update_comment(&self, comment_id: i64, content: &str) -> ApiResponse {
        let response = self.api.patch(&format!("/comments/{comment_id}"), &CommentInput { content }).await;
        if !response.success {
            tracing::warn!(comment_id, status = ?response.status, error = ?response.error, "updating comment failed");
        }
        response
    }

    pub async fn delete_comment(&self, comment_id: i64) -> ApiResponse {
        let response = self.api.delete(&format!("/comments/{comment_id}")).await;
        if !response.success {
            tracing::warn!(comment_id, status = ?response.status, error = ?response.error, "deleting comment failed");
        }
        response
    }
}
