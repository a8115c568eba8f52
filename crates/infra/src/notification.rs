//! # メール配送
//!
//! 謝罪メールの配送を担当するインフラストラクチャモジュール。
//!
//! - `NotificationSender` trait で配送プロバイダを抽象化する
//! - Resend（本番）、SMTP（Mailpit 等の開発用）、Noop（ログのみ）の 3 実装
//! - `DELIVERY_BACKEND` 環境変数で起動時に選択する

mod noop;
mod resend;
mod smtp;

use async_trait::async_trait;
pub use noop::NoopNotificationSender;
pub use resend::ResendNotificationSender;
pub use smtp::SmtpNotificationSender;
use sorrymail_domain::notification::{DeliveryError, DeliveryReference, EmailMessage};

/// メール送信トレイト
#[async_trait]
pub trait NotificationSender: Send + Sync {
    /// メールを送信する
    ///
    /// 成功時はプロバイダのメッセージ ID を返す（返さないプロバイダもある）。
    async fn send_email(
        &self,
        email: &EmailMessage,
    ) -> Result<Option<DeliveryReference>, DeliveryError>;
}
