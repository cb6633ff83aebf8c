//! Domain services over the HTTP client core.
//!
//! SYSTEM CONTEXT
//! ==============
//! Each service maps one backend resource to typed calls. They never fail for
//! expected errors: every call returns an [`crate::ApiResponse`] and logs the
//! failure. Auth is the only service that mutates session state.

pub mod auth;
pub mod comments;
pub mod posts;

pub use auth::AuthService;
pub use comments::CommentsService;
pub use posts::{PostSummary, PostsService, TransformedPosts, transform_post, transform_posts_response};
