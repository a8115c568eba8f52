//! # メール配送
//!
//! 謝罪メールの組み立てと、配送結果を表す型を定義する。
//!
//! | 型 | 用途 |
//! |---|------|
//! | [`EmailMessage`] | 配送プロバイダに渡すメール（HTML 本文 + テキスト本文） |
//! | [`DeliveryReference`] | プロバイダが採番したメッセージ ID |
//! | [`DeliveryError`] | 配送失敗 |
//!
//! 本文は生成されたプレーンテキスト。HTML 版は [`plain_text_to_html`] で変換する。

use thiserror::Error;

/// 謝罪メールの件名（固定）
pub const APOLOGY_SUBJECT: &str = "i owe you an apology";

/// 配送プロバイダが返すメッセージ ID
///
/// プロバイダによっては返さないこともあるため、呼び出し側では `Option` で扱う。
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::From)]
#[display("{_0}")]
pub struct DeliveryReference(String);

impl DeliveryReference {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

/// 配送エラー
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// プロバイダがエラーを返した
    #[error("配送プロバイダがエラーを返しました（status={status}）: {message}")]
    Rejected { status: u16, message: String },

    /// 通信失敗・メッセージ組み立て失敗など
    #[error("メール送信に失敗: {0}")]
    SendFailed(String),
}

/// メールメッセージ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub to:        String,
    pub subject:   String,
    pub html_body: String,
    pub text_body: String,
}

impl EmailMessage {
    /// 生成済みの謝罪文から送信用メッセージを組み立てる
    pub fn apology(to: impl Into<String>, text: &str) -> Self {
        Self {
            to:        to.into(),
            subject:   APOLOGY_SUBJECT.to_string(),
            html_body: plain_text_to_html(text),
            text_body: text.to_string(),
        }
    }
}

/// プレーンテキストを HTML 本文に変換する
///
/// HTML 特殊文字をエスケープしたうえで改行（CRLF / CR / LF）を `<br>` に置き換え、
/// システムフォントのラッパー `div` で包む。
pub fn plain_text_to_html(text: &str) -> String {
    let mut body = String::with_capacity(text.len() + 64);
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '&' => body.push_str("&amp;"),
            '<' => body.push_str("&lt;"),
            '>' => body.push_str("&gt;"),
            '"' => body.push_str("&quot;"),
            '\'' => body.push_str("&#39;"),
            '\r' => {
                chars.next_if_eq(&'\n');
                body.push_str("<br>");
            }
            '\n' => body.push_str("<br>"),
            other => body.push(other),
        }
    }

    format!(r#"<div style="font-family: system-ui; line-height: 1.6;">{body}</div>"#)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    fn wrap(inner: &str) -> String {
        format!(r#"<div style="font-family: system-ui; line-height: 1.6;">{inner}</div>"#)
    }

    #[rstest]
    #[case("hello", "hello")]
    #[case("line one\nline two", "line one<br>line two")]
    #[case("line one\r\nline two", "line one<br>line two")]
    #[case("line one\rline two", "line one<br>line two")]
    #[case("a\n\nb", "a<br><br>b")]
    #[case("", "")]
    fn test_改行がbrに変換される(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(plain_text_to_html(input), wrap(expected));
    }

    #[test]
    fn test_html特殊文字がエスケープされる() {
        let html = plain_text_to_html("<script>alert('x')</script> & \"y\"");

        assert_eq!(
            html,
            wrap("&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt; &amp; &quot;y&quot;")
        );
    }

    #[test]
    fn test_apologyで固定件名とテキスト本文が設定される() {
        let message = EmailMessage::apology("x@example.com", "i'm sorry.\nreally.");

        assert_eq!(message.to, "x@example.com");
        assert_eq!(message.subject, "i owe you an apology");
        assert_eq!(message.text_body, "i'm sorry.\nreally.");
        assert_eq!(message.html_body, wrap("i&#39;m sorry.<br>really."));
    }

    #[test]
    fn test_delivery_errorのメッセージにプロバイダの詳細が含まれる() {
        let error = DeliveryError::Rejected {
            status:  422,
            message: "invalid `to` field".to_string(),
        };

        assert!(error.to_string().contains("invalid `to` field"));
        assert!(error.to_string().contains("422"));
    }
}
