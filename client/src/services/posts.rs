//! Post endpoints and the list-view projection.

#[cfg(test)]
#[path = "posts_test.rs"]
mod posts_test;

use std::sync::Arc;

use serde::Serialize;

use crate::net::api::ApiClient;
use crate::net::types::{ApiResponse, Created, Cursor, CursorQuery, Post, PostInput, PostsPage};

pub const EXCERPT_PLACEHOLDER: &str = "내용을 확인하려면 클릭하세요.";
const AVATAR_BASE_URL: &str = "https://ui-avatars.com/api/";

pub struct PostsService {
    api: Arc<ApiClient>,
}

impl PostsService {
    #[must_use]
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    /// `GET /posts`. Pass the previous page's cursor to get the next one.
    pub async fn fetch_posts(&self, cursor: Option<&Cursor>, size: u32) -> ApiResponse<PostsPage> {
        let params = CursorQuery::after(cursor, size).to_params();
        let response = self.api.get("/posts", params.as_slice()).await.decode::<PostsPage>();
        if !response.success {
            tracing::warn!(status = ?response.status, error = ?response.error, "fetching posts failed");
        }
        response
    }

    pub async fn get_post(&self, id: i64) -> ApiResponse<Post> {
        let response = self.api.get::<&str, &str>(&format!("/posts/{id}"), &[]).await.decode::<Post>();
        if !response.success {
            tracing::warn!(post_id = id, status = ?response.status, error = ?response.error, "fetching post failed");
        }
        response
    }

    pub async fn create_post(&self, title: &str, content: &str) -> ApiResponse<Created> {
        let response = self.api.post("/posts", &PostInput { title, content }).await.decode::<Created>();
        if response.success {
            tracing::info!(post_id = ?response.data.map(|c| c.id), "post created");
        } else {
            tracing::warn!(status = ?response.status, error = ?response.error, "creating post failed");
        }
        response
    }

    pub async fn update_post(&self, id: i64, title: &str, content: &str) -> ApiResponse {
        let response = self.api.patch(&format!("/posts/{id}"), &PostInput { title, content }).await;
        if !response.success {
            tracing::warn!(post_id = id, status = ?response.status, error = ?response.error, "updating post failed");
        }
        response
    }

    pub async fn delete_post(&self, id: i64) -> ApiResponse {
        let response = self.api.delete(&format!("/posts/{id}")).await;
        if !response.success {
            tracing::warn!(post_id = id, status = ?response.status, error = ?response.error, "deleting post failed");
        }
        response
    }
}

// =============================================================================
// LIST PROJECTION
// =============================================================================

/// A post shaped for a list card.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostSummary {
    pub id: i64,
    pub title: String,
    pub excerpt: String,
    pub author: String,
    pub author_avatar: String,
    pub created_at: String,
    pub views: u64,
    pub likes: u64,
    pub comments: u64,
    pub image: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct TransformedPosts {
    pub posts: Vec<PostSummary>,
    pub cursor: Option<Cursor>,
}

#[must_use]
pub fn transform_post(post: &Post) -> PostSummary {
    let excerpt = [post.content.as_deref(), post.excerpt.as_deref()]
        .into_iter()
        .flatten()
        .find(|s| !s.is_empty())
        .unwrap_or(EXCERPT_PLACEHOLDER)
        .to_owned();
    PostSummary {
        id: post.id,
        title: post.title.clone(),
        excerpt,
        author: post.author_nickname.clone(),
        author_avatar: avatar_url(&post.author_nickname),
        created_at: post.created_at.clone(),
        views: post.view_count.unwrap_or(0),
        likes: post.like_count.unwrap_or(0),
        comments: post.comment_count.unwrap_or(0),
        image: None,
    }
}

/// Project a list response. A failed or empty response is an empty page.
#[must_use]
pub fn transform_posts_response(response: &ApiResponse<PostsPage>) -> TransformedPosts {
    match (&response.data, response.success) {
        (Some(page), true) => TransformedPosts {
            posts: page.posts.iter().map(transform_post).collect(),
            cursor: page.cursor.clone(),
        },
        _ => TransformedPosts::default(),
    }
}

fn avatar_url(nickname: &str) -> String {
    format!("{AVATAR_BASE_URL}?name={}&background=random", urlencoding::encode(nickname))
}
