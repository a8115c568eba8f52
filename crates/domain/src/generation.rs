//! # 謝罪文の生成
//!
//! 文章生成プロバイダへの入力と失敗を表す型。
//! プロンプトの組み立てとプロバイダ呼び出しはインフラ層が担う。

use thiserror::Error;

use crate::apology::{SenderName, Tone, UserMessage};

/// 文章生成の入力
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub sender_name:  SenderName,
    pub tone:         Tone,
    pub user_message: Option<UserMessage>,
}

/// 文章生成エラー
#[derive(Debug, Error)]
pub enum GenerationError {
    /// プロバイダ呼び出しの失敗（通信・認証・レート制限など）
    #[error("文章生成プロバイダの呼び出しに失敗: {0}")]
    Provider(String),

    /// 応答に本文が含まれていない、または空白のみ
    #[error("文章生成プロバイダの応答が空です")]
    EmptyResponse,
}
