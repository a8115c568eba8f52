//! # PostgreSQL データベース接続管理
//!
//! 接続プールの作成、マイグレーションの適用、疎通確認を行う。
//!
//! ```rust,ignore
//! use sorrymail_infra::db;
//!
//! let pool = db::create_pool("postgres://localhost/sorrymail").await?;
//! db::run_migrations(&pool).await?;
//! ```

use std::time::Duration;

use sqlx::{PgPool, postgres::PgPoolOptions};

use crate::error::InfraError;

/// 最大接続数
const MAX_CONNECTIONS: u32 = 10;

/// 接続取得タイムアウト
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

/// PostgreSQL 接続プールを作成する
///
/// 起動時に一度だけ呼び出し、作成したプールをアプリケーション全体で共有する。
pub async fn create_pool(database_url: &str) -> Result<PgPool, InfraError> {
    let pool = PgPoolOptions::new()
        .max_connections(MAX_CONNECTIONS)
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .connect(database_url)
        .await?;
    Ok(pool)
}

/// 埋め込まれたマイグレーションを適用する
///
/// 適用済みのものはスキップされる。sqlx が advisory lock を取るため
/// 複数プロセスから同時に呼んでも安全。
pub async fn run_migrations(pool: &PgPool) -> Result<(), InfraError> {
    sqlx::migrate!("../../migrations").run(pool).await?;
    Ok(())
}

/// データベースの疎通確認（readiness 用）
#[tracing::instrument(skip_all, level = "debug")]
pub async fn ping(pool: &PgPool) -> Result<(), InfraError> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}
