//! # SorryMail インフラ層
//!
//! 外部システムとの接続・通信を担当する。
//!
//! - **データベース**: PostgreSQL 接続プールとマイグレーション、謝罪レコードのリポジトリ
//! - **文章生成**: OpenAI Chat Completions
//! - **メール配送**: Resend / SMTP / Noop
//!
//! ```text
//! api → infra → domain
//! ```
//!
//! ## モジュール構成
//!
//! - [`db`] - PostgreSQL 接続管理
//! - [`error`] - インフラ層エラー定義
//! - [`generation`] - 謝罪文生成クライアント
//! - [`notification`] - メール配送クライアント
//! - [`repository`] - リポジトリ実装
//!
//! ```rust,ignore
//! use sorrymail_infra::{db, repository::PostgresApologyRepository};
//!
//! let pool = db::create_pool("postgres://localhost/sorrymail").await?;
//! db::run_migrations(&pool).await?;
//! let repository = PostgresApologyRepository::new(pool);
//! ```

pub mod db;
pub mod error;
pub mod generation;
#[cfg(any(test, feature = "test-utils"))]
pub mod mock;
pub mod notification;
pub mod repository;

pub use error::{InfraError, InfraErrorKind};
