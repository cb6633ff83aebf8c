//! User-facing error messages for failed envelopes.
//!
//! Backend messages are shown verbatim unless they are "technical" (the
//! transport's `HTTP nnn 에러` fallback and similar). Those are replaced by a
//! default, or by a message chosen from the status and the action the user
//! was attempting.

#[cfg(test)]
#[path = "error_message_test.rs"]
mod error_message_test;

use std::sync::LazyLock;

use regex::Regex;

use crate::net::types::ApiResponse;

pub const DEFAULT_ERROR_MESSAGE: &str = "오류가 발생했습니다.";
pub const NETWORK_CHECK_MESSAGE: &str = "네트워크 연결을 확인해주세요.";

static TECHNICAL_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [r"(?i)^HTTP \d{3} 에러$", r"(?i)^HTTP error", r"(?i)^\d{3} error$", r"(?i)^error \d{3}$"]
        .into_iter()
        .map(|pattern| Regex::new(pattern).expect("technical error pattern"))
        .collect()
});

/// True for messages that describe the transport rather than the problem.
#[must_use]
pub fn is_technical_error(message: &str) -> bool {
    let message = message.trim();
    TECHNICAL_PATTERNS.iter().any(|re| re.is_match(message))
}

/// Backend message if it is worth showing, else `None`.
fn readable_error<T>(response: &ApiResponse<T>) -> Option<&str> {
    response
        .error
        .as_deref()
        .filter(|message| !message.is_empty() && !is_technical_error(message))
}

/// Message for a failed envelope, falling back to `default`.
#[must_use]
pub fn error_message<T>(response: &ApiResponse<T>, default: &str) -> String {
    if response.status.is_none() {
        return NETWORK_CHECK_MESSAGE.to_owned();
    }
    readable_error(response).unwrap_or(default).to_owned()
}

/// Message for a failed envelope in the context of `action` (e.g. `"로그인"`).
#[must_use]
pub fn contextual_error_message<T>(response: &ApiResponse<T>, action: &str) -> String {
    let Some(status) = response.status else {
        return format!("{action} 중 네트워크 오류가 발생했습니다.");
    };
    if let Some(message) = readable_error(response) {
        return message.to_owned();
    }
    contextual_message(status, action).map_or_else(|| format!("{action} 중 오류가 발생했습니다."), str::to_owned)
}

fn contextual_message(status: u16, action: &str) -> Option<&'static str> {
    let message = match (status, action) {
        (404 | 401, "로그인") => "이메일 또는 비밀번호가 일치하지 않습니다.",
        (404, "게시글 불러오기") => "게시글을 찾을 수 없습니다. 삭제되었거나 존재하지 않을 수 있습니다.",
        (404, "게시글 삭제" | "게시글 수정" | "댓글 작성") => "게시글을 찾을 수 없습니다.",
        (404, "댓글 수정" | "댓글 삭제") => "댓글을 찾을 수 없습니다.",
        (404, "프로필 불러오기") => "사용자 정보를 찾을 수 없습니다.",
        (404, _) => "요청한 정보를 찾을 수 없습니다.",

        (401, _) => "로그인이 필요합니다.",

        (403, "게시글 삭제") => "작성자만 게시글을 삭제할 수 있습니다.",
        (403, "게시글 수정") => "작성자만 게시글을 수정할 수 있습니다.",
        (403, "댓글 수정") => "작성자만 댓글을 수정할 수 있습니다.",
        (403, "댓글 삭제") => "작성자만 댓글을 삭제할 수 있습니다.",
        (403, _) => "이 작업을 수행할 권한이 없습니다.",

        (409, "회원가입") => "이미 사용 중인 이메일 또는 닉네임입니다.",
        (409, "닉네임 수정") => "이미 사용 중인 닉네임입니다.",
        (409, _) => "이미 존재하는 정보입니다.",

        (400, "로그인") => "이메일과 비밀번호를 확인해주세요.",
        (400, "게시글 작성" | "게시글 수정") => "제목과 내용을 확인해주세요.",
        (400, "비밀번호 변경") => "현재 비밀번호가 일치하지 않습니다.",
        (400, _) => "입력 내용을 확인해주세요.",

        (500, _) => "서버 오류가 발생했습니다. 잠시 후 다시 시도해주세요.",
        _ => return None,
    };
    Some(message)
}
