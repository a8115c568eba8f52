//! # エラーレスポンス（RFC 9457 Problem Details）
//!
//! API が返すエラーボディ `{type, title, status, detail}` を定義する。
//!
//! 問題の種類は [`ProblemType`] に集約し、`type` URI・`title`・`status` の
//! 組み合わせがずれないようにする。axum の `IntoResponse` 変換は API クレートが行う。

use serde::{Deserialize, Serialize};

/// `type` URI のベース
const PROBLEM_TYPE_BASE: &str = "https://sorrymail.example.com/errors";

/// 500 系で返す固定の detail
pub const INTERNAL_ERROR_DETAIL: &str = "内部エラーが発生しました";

/// 問題の種類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProblemType {
    ValidationError,
    Unauthorized,
    NotFound,
    RateLimited,
    InternalError,
}

impl ProblemType {
    pub const fn status(self) -> u16 {
        match self {
            Self::ValidationError => 400,
            Self::Unauthorized => 401,
            Self::NotFound => 404,
            Self::RateLimited => 429,
            Self::InternalError => 500,
        }
    }

    pub const fn title(self) -> &'static str {
        match self {
            Self::ValidationError => "Validation Error",
            Self::Unauthorized => "Unauthorized",
            Self::NotFound => "Not Found",
            Self::RateLimited => "Too Many Requests",
            Self::InternalError => "Internal Server Error",
        }
    }

    const fn slug(self) -> &'static str {
        match self {
            Self::ValidationError => "validation-error",
            Self::Unauthorized => "unauthorized",
            Self::NotFound => "not-found",
            Self::RateLimited => "rate-limited",
            Self::InternalError => "internal-error",
        }
    }

    pub fn uri(self) -> String {
        format!("{PROBLEM_TYPE_BASE}/{}", self.slug())
    }
}

/// エラーレスポンス
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    #[serde(rename = "type")]
    pub error_type: String,
    pub title:      String,
    pub status:     u16,
    pub detail:     String,
}

impl ErrorResponse {
    pub fn new(problem: ProblemType, detail: impl Into<String>) -> Self {
        Self {
            error_type: problem.uri(),
            title:      problem.title().to_string(),
            status:     problem.status(),
            detail:     detail.into(),
        }
    }

    pub fn validation_error(detail: impl Into<String>) -> Self {
        Self::new(ProblemType::ValidationError, detail)
    }

    pub fn unauthorized(detail: impl Into<String>) -> Self {
        Self::new(ProblemType::Unauthorized, detail)
    }

    pub fn not_found(detail: impl Into<String>) -> Self {
        Self::new(ProblemType::NotFound, detail)
    }

    pub fn rate_limited(detail: impl Into<String>) -> Self {
        Self::new(ProblemType::RateLimited, detail)
    }

    /// 500 Internal Server Error
    ///
    /// detail は常に [`INTERNAL_ERROR_DETAIL`]。原因はログにのみ出力する。
    pub fn internal_error() -> Self {
        Self::new(ProblemType::InternalError, INTERNAL_ERROR_DETAIL)
    }
}
