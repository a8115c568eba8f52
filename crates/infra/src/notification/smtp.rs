//! SMTP 配送実装
//!
//! lettre の `AsyncSmtpTransport` でメールを送信する。
//! 開発環境では Mailpit（ローカル SMTP サーバー）に接続する。

use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport,
    AsyncTransport,
    Tokio1Executor,
    message::{Mailbox, Message, MultiPart, SinglePart, header::ContentType},
};
use sorrymail_domain::notification::{DeliveryError, DeliveryReference, EmailMessage};

use super::NotificationSender;

/// SMTP 配送
///
/// SMTP はプロバイダ ID を返さないため、送信前に `Message-ID` を採番して
/// それを配送参照として返す。
pub struct SmtpNotificationSender {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from:      Mailbox,
}

impl SmtpNotificationSender {
    /// # 引数
    ///
    /// - `host` / `port`: SMTP サーバー（例: `localhost:1025` で Mailpit）
    /// - `from_address`: 送信元メールアドレス
    pub fn new(host: &str, port: u16, from_address: &str) -> Result<Self, DeliveryError> {
        let from = from_address
            .parse::<Mailbox>()
            .map_err(|e| DeliveryError::SendFailed(format!("送信元アドレス不正: {e}")))?;

        // TLS なし（ローカル SMTP 向け）
        let transport = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host)
            .port(port)
            .build();

        Ok(Self { transport, from })
    }

    /// `<uuid@domain>` 形式の Message-ID を採番する
    fn new_message_id(&self) -> String {
        format!("<{}@{}>", uuid::Uuid::now_v7(), self.from.email.domain())
    }

    fn build_message(&self, email: &EmailMessage, message_id: &str) -> Result<Message, DeliveryError> {
        let to = email
            .to
            .parse::<Mailbox>()
            .map_err(|e| DeliveryError::SendFailed(format!("宛先アドレス不正: {e}")))?;

        Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(&email.subject)
            .message_id(Some(message_id.to_string()))
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(email.text_body.clone()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(email.html_body.clone()),
                    ),
            )
            .map_err(|e| DeliveryError::SendFailed(format!("メッセージ構築失敗: {e}")))
    }
}

#[async_trait]
impl NotificationSender for SmtpNotificationSender {
    #[tracing::instrument(skip_all, level = "debug")]
    async fn send_email(
        &self,
        email: &EmailMessage,
    ) -> Result<Option<DeliveryReference>, DeliveryError> {
        let message_id = self.new_message_id();
        let message = self.build_message(email, &message_id)?;

        self.transport
            .send(message)
            .await
            .map_err(|e| DeliveryError::SendFailed(format!("SMTP 送信失敗: {e}")))?;

        Ok(Some(DeliveryReference::new(message_id)))
    }
}
