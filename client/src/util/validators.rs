//! Form input validation.
//!
//! Every validator returns a [`Validation`]; `message` is empty when valid
//! and is the exact text a form shows next to the field otherwise.

#[cfg(test)]
#[path = "validators_test.rs"]
mod validators_test;

use std::sync::LazyLock;

use regex::Regex;

pub const PASSWORD_MIN_CHARS: usize = 8;
pub const PASSWORD_MAX_CHARS: usize = 20;
pub const NICKNAME_MAX_CHARS: usize = 10;
pub const POST_TITLE_MAX_CHARS: usize = 26;
pub const COMMENT_MAX_CHARS: usize = 500;

const PASSWORD_SPECIALS: &str = "!@#$%^&*()_+-=[]{};':\"\\|,.<>/?";

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validation {
    pub is_valid: bool,
    pub message: String,
}

impl Validation {
    #[must_use]
    pub fn ok() -> Self {
        Self { is_valid: true, message: String::new() }
    }

    #[must_use]
    pub fn invalid(message: impl Into<String>) -> Self {
        Self { is_valid: false, message: message.into() }
    }
}

#[must_use]
pub fn validate_email(email: &str) -> Validation {
    if email.trim().is_empty() {
        return Validation::invalid("이메일을 입력해주세요.");
    }
    if EMAIL_RE.is_match(email) {
        Validation::ok()
    } else {
        Validation::invalid("올바른 이메일 형식이 아닙니다.")
    }
}

/// 8-20 characters, no surrounding whitespace, and at least one lowercase,
/// uppercase, digit and special character.
#[must_use]
pub fn validate_password(password: &str) -> Validation {
    if password.is_empty() {
        return Validation::invalid("비밀번호를 입력해주세요.");
    }

    let len = password.chars().count();
    let padded = password.starts_with(char::is_whitespace) || password.ends_with(char::is_whitespace);
    let valid = (PASSWORD_MIN_CHARS..=PASSWORD_MAX_CHARS).contains(&len)
        && !padded
        && password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_digit())
        && password.chars().any(|c| PASSWORD_SPECIALS.contains(c));

    if valid {
        Validation::ok()
    } else {
        Validation::invalid("8-20자, 대문자/소문자/숫자/특수문자 각 1개 이상 포함해야 합니다.")
    }
}

#[must_use]
pub fn validate_password_confirm(password: &str, confirm: &str) -> Validation {
    if confirm.is_empty() {
        return Validation::invalid("비밀번호 확인을 입력해주세요.");
    }
    if password == confirm {
        Validation::ok()
    } else {
        Validation::invalid("비밀번호가 일치하지 않습니다.")
    }
}

#[must_use]
pub fn validate_nickname(nickname: &str) -> Validation {
    let trimmed = nickname.trim();
    if trimmed.is_empty() {
        return Validation::invalid("닉네임을 입력해주세요.");
    }
    if trimmed.chars().count() > NICKNAME_MAX_CHARS {
        return Validation::invalid("닉네임은 1자 이상 10자 이하로 입력해주세요.");
    }
    Validation::ok()
}

#[must_use]
pub fn validate_post_title(title: &str) -> Validation {
    if title.trim().is_empty() {
        return Validation::invalid("제목을 입력해주세요.");
    }
    if title.chars().count() > POST_TITLE_MAX_CHARS {
        return Validation::invalid(format!("제목은 최대 {POST_TITLE_MAX_CHARS}자까지 입력할 수 있습니다."));
    }
    Validation::ok()
}

#[must_use]
pub fn validate_post_content(content: &str) -> Validation {
    if content.trim().is_empty() {
        Validation::invalid("내용을 입력해주세요.")
    } else {
        Validation::ok()
    }
}

#[must_use]
pub fn validate_comment(content: &str) -> Validation {
    if content.trim().is_empty() {
        return Validation::invalid("댓글 내용을 입력해주세요.");
    }
    if content.chars().count() > COMMENT_MAX_CHARS {
        return Validation::invalid(format!("댓글은 최대 {COMMENT_MAX_CHARS}자까지 입력할 수 있습니다."));
    }
    Validation::ok()
}
