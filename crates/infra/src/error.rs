//! # インフラ層エラー定義
//!
//! データベース操作で発生するエラーを表現する。
//! 文章生成・メール配送の失敗はドメイン層の
//! [`GenerationError`](sorrymail_domain::generation::GenerationError) /
//! [`DeliveryError`](sorrymail_domain::notification::DeliveryError) で表す。
//!
//! リポジトリのスパン（`find_recent` など）の中で生成されたエラーは、
//! ログ出力時に `span_trace` からどの操作で失敗したかを辿れる。

use derive_more::Display;
use thiserror::Error;
use tracing_error::SpanTrace;

/// インフラ層で発生するエラー
///
/// 生成時点のスパン情報を [`SpanTrace`] として持つ。
#[derive(Debug, Display)]
#[display("{kind}")]
pub struct InfraError {
    kind:       InfraErrorKind,
    span_trace: SpanTrace,
}

/// インフラ層エラーの種別
#[derive(Debug, Error)]
pub enum InfraErrorKind {
    /// 接続失敗、クエリ失敗、プール取得のタイムアウト
    #[error("データベースエラー: {0}")]
    Database(#[from] sqlx::Error),

    #[error("マイグレーションエラー: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// 保存済みの行がドメインモデルに復元できない
    #[error("不正な保存データ: {0}")]
    CorruptRecord(String),

    #[error("予期しないエラー: {0}")]
    Unexpected(String),
}

impl InfraError {
    /// 現在のスパンを記録してエラーを組み立てる
    fn capture(kind: InfraErrorKind) -> Self {
        Self {
            kind,
            span_trace: SpanTrace::capture(),
        }
    }

    pub fn kind(&self) -> &InfraErrorKind {
        &self.kind
    }

    pub fn span_trace(&self) -> &SpanTrace {
        &self.span_trace
    }

    pub fn corrupt_record(msg: impl Into<String>) -> Self {
        Self::capture(InfraErrorKind::CorruptRecord(msg.into()))
    }

    pub fn unexpected(msg: impl Into<String>) -> Self {
        Self::capture(InfraErrorKind::Unexpected(msg.into()))
    }
}

impl std::error::Error for InfraError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        std::error::Error::source(&self.kind)
    }
}

impl From<sqlx::Error> for InfraError {
    fn from(source: sqlx::Error) -> Self {
        Self::capture(source.into())
    }
}

impl From<sqlx::migrate::MigrateError> for InfraError {
    fn from(source: sqlx::migrate::MigrateError) -> Self {
        Self::capture(source.into())
    }
}
