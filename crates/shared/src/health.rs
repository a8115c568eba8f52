//! # ヘルスチェックのレスポンス型
//!
//! - `/health`: プロセスが応答できるか（依存サービスは見ない）
//! - `/health/ready`: 依存サービス（データベース）に到達できるか

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Liveness レスポンス（`{"ok": true}`）
///
/// ```
/// use sorrymail_shared::HealthResponse;
///
/// assert!(HealthResponse::ok().ok);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub ok: bool,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self { ok: true }
    }
}

/// 個別チェックの結果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Ok,
    Error,
}

/// Readiness 全体の状態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadinessStatus {
    Ready,
    NotReady,
}

/// Readiness レスポンス
///
/// `checks` はチェック名の昇順で出力される。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadinessResponse {
    pub status: ReadinessStatus,
    pub checks: BTreeMap<String, CheckStatus>,
}

impl ReadinessResponse {
    /// 個別チェックから全体の状態を決める（1 つでも `Error` なら `NotReady`）
    pub fn from_checks<I, K>(checks: I) -> Self
    where
        I: IntoIterator<Item = (K, CheckStatus)>,
        K: Into<String>,
    {
        let checks: BTreeMap<String, CheckStatus> =
            checks.into_iter().map(|(k, v)| (k.into(), v)).collect();
        let status = if checks.values().all(|c| *c == CheckStatus::Ok) {
            ReadinessStatus::Ready
        } else {
            ReadinessStatus::NotReady
        };
        Self { status, checks }
    }

    pub fn is_ready(&self) -> bool {
        self.status == ReadinessStatus::Ready
    }
}
