//! # ヘルスチェックハンドラ
//!
//! - `/health` — Liveness Check（常に `{"ok": true}` を返す）
//! - `/health/ready` — Readiness Check（データベースの接続状態を確認）
//!
//! レスポンス型は [`sorrymail_shared::HealthResponse`] / [`sorrymail_shared::ReadinessResponse`] を参照。

use std::{sync::Arc, time::Duration};

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use sorrymail_infra::db;
use sorrymail_shared::{CheckStatus, HealthResponse, ReadinessResponse};
use sqlx::PgPool;

/// 依存サービス確認のタイムアウト
const CHECK_TIMEOUT: Duration = Duration::from_secs(5);

/// ヘルスチェックエンドポイント
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}

/// Readiness Check 用の State
pub struct ReadinessState {
    pub pool: PgPool,
}

/// Readiness Check エンドポイント
///
/// 全チェック OK → 200、1 つでも失敗 → 503。
#[tracing::instrument(skip_all)]
pub async fn readiness_check(State(state): State<Arc<ReadinessState>>) -> impl IntoResponse {
    let database = check_database(&state.pool).await;
    let response = ReadinessResponse::from_checks([("database", database)]);
    let http_status = if response.is_ready() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (http_status, Json(response))
}

/// データベースへの接続を `SELECT 1` で確認する
async fn check_database(pool: &PgPool) -> CheckStatus {
    match tokio::time::timeout(CHECK_TIMEOUT, db::ping(pool)).await {
        Ok(Ok(())) => CheckStatus::Ok,
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "readiness check: database ping failed");
            CheckStatus::Error
        }
        Err(_) => {
            tracing::warn!("readiness check: database ping timed out");
            CheckStatus::Error
        }
    }
}
