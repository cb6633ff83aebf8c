use super::*;

fn post(id: i64, nickname: &str) -> Post {
    Post {
        id,
        title: format!("post {id}"),
        content: None,
        excerpt: None,
        author_id: Some(1),
        author_nickname: nickname.to_owned(),
        created_at: "2025-01-02T03:04:05".to_owned(),
        updated_at: None,
        view_count: None,
        like_count: None,
        comment_count: None,
    }
}

// =============================================================
// transform_post
// =============================================================

#[test]
fn excerpt_prefers_content() {
    let mut p = post(1, "neo");
    p.content = Some("본문".into());
    p.excerpt = Some("요약".into());
    assert_eq!(transform_post(&p).excerpt, "본문");
}

#[test]
fn excerpt_falls_back_to_excerpt_then_placeholder() {
    let mut p = post(1, "neo");
    p.content = Some(String::new());
    p.excerpt = Some("요약".into());
    assert_eq!(transform_post(&p).excerpt, "요약");

    assert_eq!(transform_post(&post(2, "neo")).excerpt, EXCERPT_PLACEHOLDER);
}

#[test]
fn avatar_url_encodes_nickname() {
    let summary = transform_post(&post(1, "김 철수"));
    assert_eq!(
        summary.author_avatar,
        "https://ui-avatars.com/api/?name=%EA%B9%80%20%EC%B2%A0%EC%88%98&background=random"
    );
    assert_eq!(summary.author, "김 철수");
}

#[test]
fn counts_default_to_zero() {
    let mut p = post(1, "neo");
    p.view_count = Some(12);
    let summary = transform_post(&p);
    assert_eq!((summary.views, summary.likes, summary.comments), (12, 0, 0));
    assert_eq!(summary.image, None);
    assert_eq!(summary.created_at, "2025-01-02T03:04:05");
}

// =============================================================
// transform_posts_response
// =============================================================

#[test]
fn failed_response_is_empty_page() {
    let resp: ApiResponse<PostsPage> = ApiResponse::failure("HTTP 500 에러", 500, None);
    assert_eq!(transform_posts_response(&resp), TransformedPosts::default());
}

#[test]
fn missing_body_is_empty_page() {
    let resp: ApiResponse<PostsPage> = ApiResponse::ok(None, 200);
    assert_eq!(transform_posts_response(&resp), TransformedPosts { posts: vec![], cursor: None });
}

#[test]
fn page_is_projected_with_cursor() {
    let cursor = Cursor { id: 2, created_at: "2025-01-01T00:00:00".into(), has_next: true };
    let resp = ApiResponse::ok(Some(PostsPage { posts: vec![post(1, "a"), post(2, "b")], cursor: Some(cursor.clone()) }), 200);

    let page = transform_posts_response(&resp);
    assert_eq!(page.posts.iter().map(|p| p.id).collect::<Vec<_>>(), vec![1, 2]);
    assert_eq!(page.cursor, Some(cursor));
}
