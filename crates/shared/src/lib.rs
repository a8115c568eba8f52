//! # SorryMail 共有ユーティリティ
//!
//! api / infra から使われる、ビジネスロジックを持たない部品。
//!
//! - [`error_response`]: Problem Details 形式のエラーボディ
//! - [`health`]: liveness / readiness のレスポンス型
//! - [`event_log`]: ビジネスイベントとエラーコンテキストのログ規約
//! - [`observability`]: トレーシング初期化、リクエストスパン、Request ID
//! - `canonical_log`: リクエストごとのサマリログ（`observability` feature）

#[cfg(feature = "observability")]
pub mod canonical_log;
pub mod error_response;
pub mod event_log;
pub mod health;
pub mod observability;

pub use error_response::{ErrorResponse, ProblemType};
pub use health::{CheckStatus, HealthResponse, ReadinessResponse, ReadinessStatus};
