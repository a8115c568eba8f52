//! # ドメインエラー
//!
//! 入力検証と ID 検索の失敗を表す。HTTP ステータスへの対応付けは API 層で行う
//! （`Validation` → 400、`NotFound` → 404）。

use thiserror::Error;

/// ドメイン層で発生するエラー
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    /// 必須フィールドの欠落、または文字数制限の超過
    #[error("バリデーションエラー: {0}")]
    Validation(String),

    #[error("{entity_type} が見つかりません: {id}")]
    NotFound {
        entity_type: &'static str,
        /// 検索に使った文字列そのまま（UUID として不正なものも含む）
        id:          String,
    },
}
