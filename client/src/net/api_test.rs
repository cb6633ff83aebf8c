use serde_json::json;

use super::*;

// =============================================================
// parse_body
// =============================================================

#[test]
fn parse_body_no_content_is_none() {
    assert_eq!(parse_body(204, false, ""), None);
    assert_eq!(parse_body(204, true, "{\"ignored\":true}"), None);
}

#[test]
fn parse_body_empty_text_is_none() {
    assert_eq!(parse_body(200, true, ""), None);
}

#[test]
fn parse_body_json() {
    assert_eq!(parse_body(200, true, r#"{"id":1}"#), Some(json!({ "id": 1 })));
}

#[test]
fn parse_body_untyped_json_text_is_parsed() {
    assert_eq!(parse_body(200, false, "[1,2]"), Some(json!([1, 2])));
}

#[test]
fn parse_body_plain_text_is_kept_raw() {
    assert_eq!(parse_body(200, false, "pong"), Some(json!("pong")));
}

#[test]
fn parse_body_broken_json_falls_back_to_text() {
    assert_eq!(parse_body(500, true, "{oops"), Some(json!("{oops")));
}

// =============================================================
// envelope
// =============================================================

#[test]
fn envelope_success() {
    let resp = envelope(201, Some(json!({ "id": 3 })));
    assert!(resp.success);
    assert_eq!(resp.status, Some(201));
    assert_eq!(resp.data, Some(json!({ "id": 3 })));
    assert_eq!(resp.error, None);
}

#[test]
fn envelope_prefers_message_then_error() {
    let resp = envelope(400, Some(json!({ "message": "bad title", "error": "Bad Request" })));
    assert_eq!(resp.error.as_deref(), Some("bad title"));

    let resp = envelope(400, Some(json!({ "error": "Bad Request" })));
    assert_eq!(resp.error.as_deref(), Some("Bad Request"));
}

#[test]
fn envelope_falls_back_to_status_text() {
    let resp = envelope(502, Some(json!("gateway down")));
    assert!(!resp.success);
    assert_eq!(resp.error.as_deref(), Some("HTTP 502 에러"));

    let resp = envelope(404, None);
    assert_eq!(resp.error.as_deref(), Some("HTTP 404 에러"));
}

#[test]
fn envelope_empty_message_is_skipped() {
    let resp = envelope(409, Some(json!({ "message": "", "error": "Conflict" })));
    assert_eq!(resp.error.as_deref(), Some("Conflict"));
}

#[test]
fn envelope_carries_error_code() {
    let resp = envelope(401, Some(json!({ "message": "expired", "errorCode": "ACCESS_TOKEN_EXPIRED" })));
    assert_eq!(resp.status, Some(401));
    assert_eq!(resp.error_code.as_deref(), Some(ACCESS_TOKEN_EXPIRED));
    assert_eq!(resp.data, Some(json!({ "message": "expired", "errorCode": "ACCESS_TOKEN_EXPIRED" })));
}

#[test]
fn network_message_defaults_when_blank() {
    assert_eq!(network_error_message("  "), NETWORK_ERROR_MESSAGE);
    assert_eq!(network_error_message("connection refused"), "connection refused");
}

// =============================================================
// FormData
// =============================================================

#[test]
fn form_data_builder_keeps_parts() {
    let form = FormData::new()
        .text("title", "hello")
        .file("image", "a.png", Some("image/png"), vec![1, 2, 3]);
    assert_eq!(form.len(), 2);
    assert!(!form.is_empty());
    assert!(FormData::new().is_empty());
}
