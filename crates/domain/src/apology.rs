//! # 謝罪レコード
//!
//! 謝罪メール送信の入力（[`ApologySubmission`]）と、送信成功後に保存される
//! 記録（[`ApologyRecord`]）を定義する。
//!
//! ## 不変条件
//!
//! - レコードは文章生成と配送の両方が成功した後にのみ作られる
//! - 作成後は変更・削除されない（更新系のメソッドを持たない）
//! - 同じ宛先への送信は [`RATE_LIMIT_WINDOW_HOURS`] 時間に 1 回まで

use chrono::{DateTime, Duration, Utc};

use crate::{DomainError, notification::DeliveryReference};

/// 同一宛先への再送を禁止する期間（時間）
pub const RATE_LIMIT_WINDOW_HOURS: i64 = 24;

/// レート制限ウィンドウの開始時刻
///
/// `created_at >= rate_limit_window_start(now)` のレコードがあれば送信不可。
pub fn rate_limit_window_start(now: DateTime<Utc>) -> DateTime<Utc> {
    now - Duration::hours(RATE_LIMIT_WINDOW_HOURS)
}

define_uuid_id! {
    /// 謝罪レコード ID（UUID v7）
    pub struct ApologyId;
}

define_validated_string! {
    /// 送信者名
    pub struct SenderName {
        label: "senderName",
        max_length: 100,
    }
}

define_validated_string! {
    /// 宛先メールアドレス
    ///
    /// レート制限のキーとしてのみ扱い、形式は検証しない。
    pub struct RecipientEmail {
        label: "recipientEmail",
        max_length: 254,
        pii: true,
    }
}

define_validated_string! {
    /// 謝罪のトーン（例: `sincere`, `playful`）
    pub struct Tone {
        label: "tone",
        max_length: 50,
    }
}

define_validated_string! {
    /// 送信者が添える補足メッセージ
    pub struct UserMessage {
        label: "message",
        max_length: 2000,
    }
}

impl UserMessage {
    /// 任意フィールドとして検証する
    ///
    /// 未指定・空白のみの場合は `None`。
    pub fn parse_optional(value: Option<String>) -> Result<Option<Self>, DomainError> {
        match value {
            Some(v) if !v.trim().is_empty() => Self::new(v).map(Some),
            _ => Ok(None),
        }
    }
}

/// 検証済みの送信リクエスト
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApologySubmission {
    pub sender_name:     SenderName,
    pub recipient_email: RecipientEmail,
    pub tone:            Tone,
    pub user_message:    Option<UserMessage>,
}

impl ApologySubmission {
    /// 生の入力を検証する
    ///
    /// 必須フィールドは senderName, recipientEmail, tone の順に検証し、
    /// 最初に見つかった問題を返す。
    pub fn parse(
        sender_name: Option<String>,
        recipient_email: Option<String>,
        tone: Option<String>,
        message: Option<String>,
    ) -> Result<Self, DomainError> {
        Ok(Self {
            sender_name:     SenderName::from_optional(sender_name)?,
            recipient_email: RecipientEmail::from_optional(recipient_email)?,
            tone:            Tone::from_optional(tone)?,
            user_message:    UserMessage::parse_optional(message)?,
        })
    }
}

/// 謝罪レコード
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApologyRecord {
    id: ApologyId,
    sender_name: SenderName,
    recipient_email: RecipientEmail,
    tone: Tone,
    user_message: Option<UserMessage>,
    generated_message: String,
    delivery_reference: Option<DeliveryReference>,
    created_at: DateTime<Utc>,
}

impl ApologyRecord {
    /// 配送成功後にレコードを作成する
    ///
    /// ID は UUID v7 で採番し、`created_at` は呼び出し元から注入された `now`。
    pub fn new(
        submission: ApologySubmission,
        generated_message: String,
        delivery_reference: Option<DeliveryReference>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: ApologyId::new(),
            sender_name: submission.sender_name,
            recipient_email: submission.recipient_email,
            tone: submission.tone,
            user_message: submission.user_message,
            generated_message,
            delivery_reference,
            created_at: now,
        }
    }

    /// 既存のデータから復元する（データベースから取得時）
    #[allow(clippy::too_many_arguments)]
    pub fn from_db(
        id: ApologyId,
        sender_name: SenderName,
        recipient_email: RecipientEmail,
        tone: Tone,
        user_message: Option<UserMessage>,
        generated_message: String,
        delivery_reference: Option<DeliveryReference>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            sender_name,
            recipient_email,
            tone,
            user_message,
            generated_message,
            delivery_reference,
            created_at,
        }
    }

    pub fn id(&self) -> &ApologyId {
        &self.id
    }

    pub fn sender_name(&self) -> &SenderName {
        &self.sender_name
    }

    pub fn recipient_email(&self) -> &RecipientEmail {
        &self.recipient_email
    }

    pub fn tone(&self) -> &Tone {
        &self.tone
    }

    pub fn user_message(&self) -> Option<&UserMessage> {
        self.user_message.as_ref()
    }

    pub fn generated_message(&self) -> &str {
        &self.generated_message
    }

    pub fn delivery_reference(&self) -> Option<&DeliveryReference> {
        self.delivery_reference.as_ref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// `now` 時点でこのレコードがレート制限ウィンドウ内にあるか
    pub fn is_within_rate_limit_window(&self, now: DateTime<Utc>) -> bool {
        self.created_at >= rate_limit_window_start(now)
    }
}
