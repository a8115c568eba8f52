//! # SorryMail ドメイン層
//!
//! 謝罪メール送信のドメインモデルを定義する。
//!
//! ## 依存関係の方向
//!
//! ```text
//! api → infra → domain
//! ```
//!
//! ドメイン層はインフラ層（DB、文章生成・配送プロバイダ）に依存しない。
//!
//! ## モジュール構成
//!
//! - [`apology`] - 謝罪レコードと入力値の検証、レート制限ウィンドウ
//! - [`generation`] - 文章生成の入力とエラー
//! - [`notification`] - メールの組み立てと配送結果
//! - [`clock`] - 時刻プロバイダ
//! - [`error`] - ドメインエラー
//!
//! ```rust
//! use sorrymail_domain::{DomainError, apology::ApologySubmission};
//!
//! let result = ApologySubmission::parse(None, Some("x@example.com".into()), Some("sincere".into()), None);
//! assert!(matches!(result, Err(DomainError::Validation(_))));
//! ```

#[macro_use]
mod macros;

pub mod apology;
pub mod clock;
pub mod error;
pub mod generation;
pub mod notification;

pub use error::DomainError;
