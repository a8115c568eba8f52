//! Resend 配送実装
//!
//! Resend の HTTP API（`POST /emails`）を reqwest で呼び出す。
//! 成功時のレスポンス `{"id": "..."}` の `id` を配送参照として返す。

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sorrymail_domain::notification::{DeliveryError, DeliveryReference, EmailMessage};

use super::NotificationSender;

/// Resend API のデフォルトベース URL
pub const DEFAULT_RESEND_BASE_URL: &str = "https://api.resend.com";

/// HTTP リクエストのタイムアウト
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// `POST /emails` のリクエストボディ
#[derive(Debug, Serialize)]
struct SendEmailRequest<'a> {
    from:    &'a str,
    to:      [&'a str; 1],
    subject: &'a str,
    html:    &'a str,
    text:    &'a str,
}

/// 成功レスポンス
#[derive(Debug, Deserialize)]
struct SendEmailResponse {
    id: Option<String>,
}

/// エラーレスポンス（`{"statusCode": 422, "message": "...", "name": "..."}`）
#[derive(Debug, Deserialize)]
struct ResendErrorBody {
    message: Option<String>,
    name:    Option<String>,
}

/// Resend 配送
#[derive(Clone)]
pub struct ResendNotificationSender {
    base_url:     String,
    api_key:      String,
    from_address: String,
    client:       reqwest::Client,
}

impl ResendNotificationSender {
    pub fn new(
        api_key: impl Into<String>,
        from_address: impl Into<String>,
    ) -> Result<Self, DeliveryError> {
        Self::with_base_url(DEFAULT_RESEND_BASE_URL, api_key, from_address)
    }

    /// ベース URL を指定して作成する（スタブサーバー向け）
    pub fn with_base_url(
        base_url: &str,
        api_key: impl Into<String>,
        from_address: impl Into<String>,
    ) -> Result<Self, DeliveryError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| DeliveryError::SendFailed(format!("HTTP クライアント構築失敗: {e}")))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            from_address: from_address.into(),
            client,
        })
    }
}

/// Resend のレスポンスを配送結果に変換する
async fn handle_response(
    response: reqwest::Response,
) -> Result<Option<DeliveryReference>, DeliveryError> {
    let status = response.status();

    if status.is_success() {
        let body = response
            .json::<SendEmailResponse>()
            .await
            .map_err(|e| DeliveryError::SendFailed(format!("レスポンス解析失敗: {e}")))?;
        return Ok(body.id.filter(|id| !id.is_empty()).map(DeliveryReference::new));
    }

    let raw = response.text().await.unwrap_or_default();
    let message = match serde_json::from_str::<ResendErrorBody>(&raw) {
        Ok(ResendErrorBody {
            message: Some(message),
            name,
        }) => match name {
            Some(name) => format!("{name}: {message}"),
            None => message,
        },
        _ => raw,
    };

    Err(DeliveryError::Rejected {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl NotificationSender for ResendNotificationSender {
    #[tracing::instrument(skip_all, level = "debug")]
    async fn send_email(
        &self,
        email: &EmailMessage,
    ) -> Result<Option<DeliveryReference>, DeliveryError> {
        let url = format!("{}/emails", self.base_url);
        let body = SendEmailRequest {
            from:    &self.from_address,
            to:      [email.to.as_str()],
            subject: &email.subject,
            html:    &email.html_body,
            text:    &email.text_body,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| DeliveryError::SendFailed(format!("Resend 呼び出し失敗: {e}")))?;

        handle_response(response).await
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn make_response(status: u16, body: &str) -> reqwest::Response {
        let http_resp = http::Response::builder()
            .status(status)
            .header("content-type", "application/json")
            .body(body.to_string())
            .unwrap();
        reqwest::Response::from(http_resp)
    }

    #[test]
    fn トレイトはsendとsyncを実装している() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ResendNotificationSender>();
    }

    #[test]
    fn test_リクエストボディの形状() {
        let email = EmailMessage::apology("x@example.com", "sorry");
        let body = SendEmailRequest {
            from:    "me@example.com",
            to:      [email.to.as_str()],
            subject: &email.subject,
            html:    &email.html_body,
            text:    &email.text_body,
        };

        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(json["from"], "me@example.com");
        assert_eq!(json["to"], serde_json::json!(["x@example.com"]));
        assert_eq!(json["subject"], "i owe you an apology");
        assert_eq!(json["text"], "sorry");
    }

    #[tokio::test]
    async fn test_成功レスポンスのidを配送参照として返す() {
        let response = make_response(200, r#"{"id": "49a3999c-0ce1-4ea6-ab68-afcd6dc2e794"}"#);

        let result = handle_response(response).await.unwrap();

        assert_eq!(
            result.map(DeliveryReference::into_string),
            Some("49a3999c-0ce1-4ea6-ab68-afcd6dc2e794".to_string())
        );
    }

    #[tokio::test]
    async fn test_idがnullなら参照なしで成功する() {
        let response = make_response(200, r#"{"id": null}"#);

        let result = handle_response(response).await.unwrap();

        assert_eq!(result, None);
    }

    #[tokio::test]
    async fn test_エラーレスポンスのmessageを含むrejectedを返す() {
        let response = make_response(
            422,
            r#"{"statusCode": 422, "message": "Invalid `to` field.", "name": "validation_error"}"#,
        );

        let result = handle_response(response).await;

        match result {
            Err(DeliveryError::Rejected { status, message }) => {
                assert_eq!(status, 422);
                assert_eq!(message, "validation_error: Invalid `to` field.");
            }
            other => panic!("Rejected を期待: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_json以外のエラーボディはそのまま返す() {
        let response = make_response(502, "Bad Gateway");

        let result = handle_response(response).await;

        assert!(matches!(
            result,
            Err(DeliveryError::Rejected { status: 502, message }) if message == "Bad Gateway"
        ));
    }
}
