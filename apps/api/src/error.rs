//! # API エラー定義
//!
//! ユースケースで発生するエラーと、HTTP レスポンス（RFC 9457 Problem Details）への
//! 変換を定義する。
//!
//! 500 系のレスポンスは固定の detail のみを返し、内部情報はログにだけ出力する。

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sorrymail_domain::{
    DomainError,
    generation::GenerationError,
    notification::DeliveryError,
};
use sorrymail_infra::InfraError;
use sorrymail_shared::{ErrorResponse, event_log::error};
use thiserror::Error;

/// API で発生するエラー
#[derive(Debug, Error)]
pub enum ApiError {
    /// 入力値の不備（クライアントで修正可能）
    #[error("バリデーションエラー: {0}")]
    Validation(String),

    /// 同じ宛先へ 24 時間以内に送信済み
    #[error("レート制限中です")]
    RateLimited,

    /// 管理トークンが不正または未指定
    #[error("認証に失敗しました")]
    Unauthorized,

    /// リソースが存在しない
    #[error("{0}")]
    NotFound(String),

    /// 文章生成の失敗
    #[error("文章生成エラー: {0}")]
    Generation(#[from] GenerationError),

    /// メール配送の失敗
    #[error("配送エラー: {0}")]
    Delivery(#[from] DeliveryError),

    /// 保存・読み出しの失敗
    #[error("データベースエラー: {0}")]
    Persistence(#[from] InfraError),
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) => Self::Validation(msg),
            e @ DomainError::NotFound { .. } => Self::NotFound(e.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match &self {
            ApiError::Validation(msg) => ErrorResponse::validation_error(msg.clone()),
            ApiError::RateLimited => ErrorResponse::rate_limited(
                "この宛先には 24 時間以内に謝罪メールを送信済みです",
            ),
            ApiError::Unauthorized => ErrorResponse::unauthorized("管理トークンが不正です"),
            ApiError::NotFound(msg) => ErrorResponse::not_found(msg.clone()),
            ApiError::Generation(e) => {
                tracing::error!(
                    error.category = error::category::EXTERNAL_SERVICE,
                    error.kind = error::kind::GENERATION,
                    "文章生成エラー: {}",
                    e
                );
                ErrorResponse::internal_error()
            }
            ApiError::Delivery(e) => {
                tracing::error!(
                    error.category = error::category::EXTERNAL_SERVICE,
                    error.kind = error::kind::DELIVERY,
                    "配送エラー: {}",
                    e
                );
                ErrorResponse::internal_error()
            }
            ApiError::Persistence(e) => {
                tracing::error!(
                    error.category = error::category::INFRASTRUCTURE,
                    error.kind = error::kind::DATABASE,
                    span_trace = %e.span_trace(),
                    "データベースエラー: {}",
                    e
                );
                ErrorResponse::internal_error()
            }
        };

        let status =
            StatusCode::from_u16(body.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(body)).into_response()
    }
}
