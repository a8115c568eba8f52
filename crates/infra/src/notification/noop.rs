//! 送信しない配送実装
//!
//! `DELIVERY_BACKEND=noop` のときに使う。件名と本文の長さだけをログに残す。

use async_trait::async_trait;
use sorrymail_domain::notification::{DeliveryError, DeliveryReference, EmailMessage};

use super::NotificationSender;

/// メールを送らずに成功を返す（配送参照は `None`）
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotificationSender;

#[async_trait]
impl NotificationSender for NoopNotificationSender {
    async fn send_email(
        &self,
        email: &EmailMessage,
    ) -> Result<Option<DeliveryReference>, DeliveryError> {
        tracing::info!(
            email.subject = %email.subject,
            email.body_chars = email.text_body.chars().count(),
            "配送を無効化しているため送信しません"
        );
        Ok(None)
    }
}
