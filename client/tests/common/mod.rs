//! In-process mock of the board backend for integration tests.
//!
//! Binds an ephemeral port, serves `/api/v1/*`, records every request and
//! lets tests steer how the refresh endpoint behaves.
#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, Request, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use board_client::BoardApp;
use board_client::config::ClientConfig;
use board_client::navigator::RecordingNavigator;
use serde_json::{Value, json};

pub const PASSWORD: &str = "Password1!";
pub const TAKEN_EMAIL: &str = "taken@example.com";

#[derive(Clone, Debug)]
pub enum RefreshMode {
    /// Issue `token` and accept it from then on.
    Issue(String),
    /// Issue `token` but keep rejecting it.
    IssueRejected(String),
    /// Answer `401 REFRESH_TOKEN_EXPIRED`.
    Expired,
    /// Answer `500`.
    Fail,
}

#[derive(Clone, Debug)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
}

pub struct MockState {
    pub valid_token: Mutex<String>,
    pub refresh_mode: Mutex<RefreshMode>,
    pub refresh_calls: AtomicUsize,
    pub expired_served: AtomicUsize,
    /// Refresh waits until this many expired-token 401s have been served.
    pub refresh_waits_for: AtomicUsize,
    pub require_cookie: AtomicBool,
    pub logout_fails: AtomicBool,
    pub requests: Mutex<Vec<Recorded>>,
}

impl MockState {
    fn new() -> Self {
        Self {
            valid_token: Mutex::new("t1".to_owned()),
            refresh_mode: Mutex::new(RefreshMode::Issue("t2".to_owned())),
            refresh_calls: AtomicUsize::new(0),
            expired_served: AtomicUsize::new(0),
            refresh_waits_for: AtomicUsize::new(0),
            require_cookie: AtomicBool::new(false),
            logout_fails: AtomicBool::new(false),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn set_valid_token(&self, token: &str) {
        *self.valid_token.lock().unwrap() = token.to_owned();
    }

    pub fn set_refresh_mode(&self, mode: RefreshMode) {
        *self.refresh_mode.lock().unwrap() = mode;
    }

    pub fn refresh_calls(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    pub fn requests_to(&self, path: &str) -> Vec<Recorded> {
        self.requests.lock().unwrap().iter().filter(|r| r.path == path).cloned().collect()
    }
}

pub struct MockBackend {
    pub base_url: String,
    pub state: Arc<MockState>,
}

impl MockBackend {
    pub async fn spawn() -> Self {
        let state = Arc::new(MockState::new());
        let api = Router::new()
            .route("/auth", post(login).delete(logout))
            .route("/auth/refresh", get(refresh))
            .route("/users", post(signup).delete(delete_account))
            .route("/users/me", get(me))
            .route("/users/me/password", patch(change_password))
            .route("/users/me/nickname", patch(change_nickname))
            .route("/users/check-email", get(check_available))
            .route("/users/check-nickname", get(check_available))
            .route("/posts", get(list_posts).post(create_post))
            .route("/posts/{id}", get(get_post).patch(update_post).delete(delete_post))
            .route("/posts/{id}/comments", get(list_comments).post(create_comment))
            .route("/comments/{id}", patch(update_comment).delete(delete_comment))
            .route("/uploads", post(upload))
            .route("/session-gone", get(session_gone))
            .route("/other-401", get(other_unauthorized))
            .route("/slow/me", get(slow_me))
            .route("/samples/text", get(|| async { "pong" }))
            .route("/samples/json-text", get(|| async { r#"{"a":1}"# }))
            .route("/samples/empty", get(|| async { StatusCode::NO_CONTENT }))
            .route("/samples/error-text", get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }));

        let app = Router::new()
            .nest("/api/v1", api)
            .layer(middleware::from_fn_with_state(Arc::clone(&state), record))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url: format!("http://{addr}/api/v1"), state }
    }

    pub fn app(&self) -> (BoardApp, Arc<RecordingNavigator>) {
        let navigator = Arc::new(RecordingNavigator::new());
        let app = BoardApp::in_memory(ClientConfig::with_base_url(&self.base_url), navigator.clone()).unwrap();
        (app, navigator)
    }
}

pub fn profile(user_id: i64, nickname: &str) -> Value {
    json!({ "userId": user_id, "email": format!("{nickname}@example.com"), "nickname": nickname })
}

fn post_json(id: i64) -> Value {
    json!({
        "id": id,
        "title": format!("post {id}"),
        "content": "body",
        "authorNickname": "neo",
        "createdAt": "2025-01-01T00:00:00",
        "viewCount": 3
    })
}

// =============================================================
// Plumbing
// =============================================================

async fn record(State(state): State<Arc<MockState>>, req: Request, next: Next) -> Response {
    let recorded = {
        let header_str = |name: header::HeaderName| req.headers().get(name).and_then(|v| v.to_str().ok()).map(str::to_owned);
        Recorded {
            method: req.method().to_string(),
            path: req.uri().path().trim_start_matches("/api/v1").to_owned(),
            query: req.uri().query().map(str::to_owned),
            authorization: header_str(header::AUTHORIZATION),
            content_type: header_str(header::CONTENT_TYPE),
        }
    };
    state.requests.lock().unwrap().push(recorded);
    next.run(req).await
}

fn error(status: StatusCode, body: Value) -> Response {
    (status, Json(body)).into_response()
}

fn authorize(state: &MockState, headers: &HeaderMap) -> Result<(), Response> {
    let Some(auth) = headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok()) else {
        return Err(error(StatusCode::UNAUTHORIZED, json!({ "message": "인증이 필요합니다." })));
    };
    let valid = format!("Bearer {}", state.valid_token.lock().unwrap());
    if auth == valid {
        return Ok(());
    }
    state.expired_served.fetch_add(1, Ordering::SeqCst);
    Err(error(
        StatusCode::UNAUTHORIZED,
        json!({ "message": "액세스 토큰이 만료되었습니다.", "errorCode": "ACCESS_TOKEN_EXPIRED" }),
    ))
}

// =============================================================
// Auth
// =============================================================

async fn login(State(state): State<Arc<MockState>>, Json(body): Json<Value>) -> Response {
    if body["password"] != PASSWORD {
        return error(StatusCode::UNAUTHORIZED, json!({ "message": "이메일 또는 비밀번호가 일치하지 않습니다." }));
    }
    let token = state.valid_token.lock().unwrap().clone();
    let nickname = body["email"].as_str().unwrap_or("neo").split('@').next().unwrap_or("neo").to_owned();
    (
        [(header::SET_COOKIE, "refresh_token=r1; Path=/; HttpOnly")],
        Json(json!({ "accessToken": token, "myProfileResponse": profile(1, &nickname) })),
    )
        .into_response()
}

async fn logout(State(state): State<Arc<MockState>>) -> Response {
    if state.logout_fails.load(Ordering::SeqCst) {
        return error(StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": "Internal Server Error" }));
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn refresh(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    state.refresh_calls.fetch_add(1, Ordering::SeqCst);

    let wait_for = state.refresh_waits_for.load(Ordering::SeqCst);
    for _ in 0..200 {
        if state.expired_served.load(Ordering::SeqCst) >= wait_for {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    if wait_for > 0 {
        tokio::time::sleep(Duration::from_millis(100)).await;
    }

    let has_cookie = headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|c| c.contains("refresh_token=r1"));
    let expired = || {
        error(
            StatusCode::UNAUTHORIZED,
            json!({ "message": "리프레시 토큰이 만료되었습니다.", "errorCode": "REFRESH_TOKEN_EXPIRED" }),
        )
    };
    if state.require_cookie.load(Ordering::SeqCst) && !has_cookie {
        return expired();
    }

    let mode = state.refresh_mode.lock().unwrap().clone();
    match mode {
        RefreshMode::Issue(token) => {
            state.set_valid_token(&token);
            Json(json!({ "accessToken": token })).into_response()
        }
        RefreshMode::IssueRejected(token) => Json(json!({ "accessToken": token })).into_response(),
        RefreshMode::Expired => expired(),
        RefreshMode::Fail => error(StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": "Internal Server Error" })),
    }
}

async fn session_gone() -> Response {
    error(
        StatusCode::UNAUTHORIZED,
        json!({ "message": "리프레시 토큰이 만료되었습니다.", "errorCode": "REFRESH_TOKEN_EXPIRED" }),
    )
}

async fn other_unauthorized() -> Response {
    error(StatusCode::UNAUTHORIZED, json!({ "message": "권한이 없습니다.", "errorCode": "INVALID_TOKEN" }))
}

// =============================================================
// Users
// =============================================================

async fn signup(Json(body): Json<Value>) -> Response {
    if body["email"] == TAKEN_EMAIL {
        return error(StatusCode::CONFLICT, json!({ "message": "Duplicate email" }));
    }
    (StatusCode::CREATED, Json(json!({ "userId": 2 }))).into_response()
}

/// Same as `/users/me`, but answers 300ms after checking the token.
async fn slow_me(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    let checked = authorize(&state, &headers);
    tokio::time::sleep(Duration::from_millis(300)).await;
    if let Err(resp) = checked {
        return resp;
    }
    Json(profile(1, "neo")).into_response()
}

async fn me(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    if let Err(resp) = authorize(&state, &headers) {
        return resp;
    }
    Json(profile(1, "neo")).into_response()
}

async fn change_password(State(state): State<Arc<MockState>>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if let Err(resp) = authorize(&state, &headers) {
        return resp;
    }
    if body["originalPassword"] != PASSWORD {
        return error(StatusCode::BAD_REQUEST, json!({ "error": "Bad Request" }));
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn change_nickname(State(state): State<Arc<MockState>>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if let Err(resp) = authorize(&state, &headers) {
        return resp;
    }
    let nickname = body["nickname"].as_str().unwrap_or_default();
    Json(profile(1, nickname)).into_response()
}

async fn delete_account(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    if let Err(resp) = authorize(&state, &headers) {
        return resp;
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn check_available() -> Response {
    Json(json!({ "available": true })).into_response()
}

// =============================================================
// Posts & comments
// =============================================================

async fn list_posts(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    if let Err(resp) = authorize(&state, &headers) {
        return resp;
    }
    Json(json!({
        "posts": [post_json(2), post_json(1)],
        "cursor": { "id": 1, "createdAt": "2025-01-01T00:00:00", "hasNext": false }
    }))
    .into_response()
}

async fn get_post(Path(id): Path<i64>) -> Response {
    if id == 404 {
        return error(StatusCode::NOT_FOUND, json!({ "message": "게시글을 찾을 수 없습니다." }));
    }
    Json(post_json(id)).into_response()
}

async fn create_post(State(state): State<Arc<MockState>>, headers: HeaderMap, Json(_): Json<Value>) -> Response {
    if let Err(resp) = authorize(&state, &headers) {
        return resp;
    }
    (StatusCode::CREATED, Json(json!({ "postId": 42 }))).into_response()
}

async fn update_post(Path(id): Path<i64>, Json(body): Json<Value>) -> Response {
    if id == 403 {
        return error(StatusCode::FORBIDDEN, json!({ "error": "Forbidden" }));
    }
    Json(json!({ "id": id, "title": body["title"], "content": body["content"] })).into_response()
}

async fn delete_post(Path(_): Path<i64>) -> Response {
    StatusCode::NO_CONTENT.into_response()
}

async fn list_comments(Path(post_id): Path<i64>) -> Response {
    Json(json!({
        "comments": [
            { "id": 1, "content": format!("comment on {post_id}"), "authorNickname": "neo", "createdAt": "2025-01-01T00:00:00" }
        ],
        "cursor": null
    }))
    .into_response()
}

async fn create_comment(Path(_): Path<i64>, Json(_): Json<Value>) -> Response {
    (StatusCode::CREATED, Json(json!({ "commentId": 7 }))).into_response()
}

async fn update_comment(Path(id): Path<i64>, Json(body): Json<Value>) -> Response {
    Json(json!({ "id": id, "content": body["content"] })).into_response()
}

async fn delete_comment(Path(_): Path<i64>) -> Response {
    StatusCode::NO_CONTENT.into_response()
}

async fn upload(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    if let Err(resp) = authorize(&state, &headers) {
        return resp;
    }
    Json(json!({ "received": true })).into_response()
}
