//! # ApologyRepository
//!
//! 謝罪レコードの永続化を担当するリポジトリ。
//!
//! - レコードは追記のみ（UPDATE / DELETE を持たない）
//! - レート制限チェックは `(recipient_email, created_at DESC)` インデックスを使う

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sorrymail_domain::{
    apology::{ApologyId, ApologyRecord, RecipientEmail, SenderName, Tone, UserMessage},
    notification::DeliveryReference,
};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::InfraError;

/// 謝罪レコードリポジトリトレイト
#[async_trait]
pub trait ApologyRepository: Send + Sync {
    /// 宛先ごとの直近レコードを取得する
    ///
    /// `created_at >= since` のレコードのうち最新の 1 件。なければ `None`。
    async fn find_recent(
        &self,
        recipient_email: &RecipientEmail,
        since: DateTime<Utc>,
    ) -> Result<Option<ApologyRecord>, InfraError>;

    /// レコードを挿入し、その ID を返す
    async fn insert(&self, record: &ApologyRecord) -> Result<ApologyId, InfraError>;

    /// 全レコードを `created_at` の降順で取得する
    async fn find_all(&self) -> Result<Vec<ApologyRecord>, InfraError>;

    /// ID でレコードを取得する
    async fn find_by_id(&self, id: &ApologyId) -> Result<Option<ApologyRecord>, InfraError>;
}

/// apologies テーブルの行
///
/// `TryFrom` で `ApologyRecord` への変換を一箇所に集約する。
#[derive(sqlx::FromRow)]
struct ApologyRow {
    id: Uuid,
    sender_name: String,
    recipient_email: String,
    tone: String,
    user_message: Option<String>,
    generated_message: String,
    delivery_reference: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<ApologyRow> for ApologyRecord {
    type Error = InfraError;

    fn try_from(row: ApologyRow) -> Result<Self, Self::Error> {
        let id = row.id;
        let corrupt = |e: sorrymail_domain::DomainError| {
            InfraError::corrupt_record(format!("apologies.id={id}: {e}"))
        };

        Ok(ApologyRecord::from_db(
            ApologyId::from_uuid(id),
            SenderName::new(&row.sender_name).map_err(corrupt)?,
            RecipientEmail::new(&row.recipient_email).map_err(corrupt)?,
            Tone::new(&row.tone).map_err(corrupt)?,
            UserMessage::parse_optional(row.user_message).map_err(corrupt)?,
            row.generated_message,
            row.delivery_reference.map(DeliveryReference::new),
            row.created_at,
        ))
    }
}

const SELECT_COLUMNS: &str = r#"
    SELECT
        id, sender_name, recipient_email, tone, user_message,
        generated_message, delivery_reference, created_at
    FROM apologies
"#;

/// PostgreSQL 実装の ApologyRepository
#[derive(Debug, Clone)]
pub struct PostgresApologyRepository {
    pool: PgPool,
}

impl PostgresApologyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ApologyRepository for PostgresApologyRepository {
    #[tracing::instrument(skip_all, level = "debug", fields(%since))]
    async fn find_recent(
        &self,
        recipient_email: &RecipientEmail,
        since: DateTime<Utc>,
    ) -> Result<Option<ApologyRecord>, InfraError> {
        let sql = format!(
            "{SELECT_COLUMNS} WHERE recipient_email = $1 AND created_at >= $2 \
             ORDER BY created_at DESC LIMIT 1"
        );
        let row = sqlx::query_as::<_, ApologyRow>(&sql)
            .bind(recipient_email.as_str())
            .bind(since)
            .fetch_optional(&self.pool)
            .await?;

        row.map(ApologyRecord::try_from).transpose()
    }

    #[tracing::instrument(skip_all, level = "debug", fields(id = %record.id()))]
    async fn insert(&self, record: &ApologyRecord) -> Result<ApologyId, InfraError> {
        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO apologies (
                id, sender_name, recipient_email, tone, user_message,
                generated_message, delivery_reference, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id
            "#,
        )
        .bind(record.id().as_uuid())
        .bind(record.sender_name().as_str())
        .bind(record.recipient_email().as_str())
        .bind(record.tone().as_str())
        .bind(record.user_message().map(UserMessage::as_str))
        .bind(record.generated_message())
        .bind(record.delivery_reference().map(DeliveryReference::as_str))
        .bind(record.created_at())
        .fetch_one(&self.pool)
        .await?;

        Ok(ApologyId::from_uuid(id))
    }

    #[tracing::instrument(skip_all, level = "debug")]
    async fn find_all(&self) -> Result<Vec<ApologyRecord>, InfraError> {
        let sql = format!("{SELECT_COLUMNS} ORDER BY created_at DESC, id DESC");
        let rows = sqlx::query_as::<_, ApologyRow>(&sql)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(ApologyRecord::try_from).collect()
    }

    #[tracing::instrument(skip_all, level = "debug", fields(%id))]
    async fn find_by_id(&self, id: &ApologyId) -> Result<Option<ApologyRecord>, InfraError> {
        let sql = format!("{SELECT_COLUMNS} WHERE id = $1");
        let row = sqlx::query_as::<_, ApologyRow>(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        row.map(ApologyRecord::try_from).transpose()
    }
}
