//! # HTTP リクエストハンドラ
//!
//! axum のルートに対応するハンドラ関数を定義する。
//!
//! ## 設計方針
//!
//! - 各ハンドラはサブモジュールに配置
//! - 親モジュールで re-export し、フラットな API を提供
//! - ハンドラは薄く保ち、ビジネスロジックは usecase 層に委譲
//!
//! ## ハンドラ一覧
//!
//! - `health`: ヘルスチェック（liveness / readiness）
//! - `apology`: 謝罪メール送信
//! - `admin`: 管理トークンで保護された参照 API

pub mod admin;
pub mod apology;
pub mod health;

pub use admin::{
    ADMIN_TOKEN_HEADER,
    AdminState,
    AdminTokenQuery,
    ApologyDto,
    get_apology,
    list_apologies,
};
pub use apology::{ApologyState, SendApologyRequest, SendApologyResponse, send_apology};
pub use health::{ReadinessState, health_check, readiness_check};

use crate::error::ApiError;

/// 未定義ルートへのフォールバック
pub async fn fallback() -> ApiError {
    ApiError::NotFound("リソースが見つかりません".to_string())
}
