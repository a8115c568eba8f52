//! # SorryMail API サーバー
//!
//! 謝罪メールを生成・送信し、送信記録を管理者向けに公開する HTTP サーバー。
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌──────────────┐
//! │  Frontend   │────▶│ SorryMail   │────▶│ OpenAI       │ 文章生成
//! │             │     │ API         │────▶│ Resend/SMTP  │ メール配送
//! └─────────────┘     └─────────────┘────▶│ PostgreSQL   │ 送信記録
//!                                         └──────────────┘
//! ```
//!
//! ## モジュール構成
//!
//! - [`config`]: 環境変数からの設定読み込み
//! - [`error`]: API エラーと HTTP レスポンスへの変換
//! - [`usecase`]: 送信フローと管理者向け参照
//! - [`handler`]: HTTP ハンドラ
//! - [`app_builder`]: ルーターとミドルウェアの組み立て

pub mod app_builder;
pub mod config;
pub mod error;
pub mod handler;
pub mod usecase;
