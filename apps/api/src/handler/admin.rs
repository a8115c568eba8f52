//! # 管理者向け参照ハンドラ
//!
//! ## エンドポイント
//!
//! - `GET /api/all` - 全レコードを作成日時の降順で返す
//! - `GET /api/{id}` - 指定 ID のレコードを返す
//!
//! 管理トークンは `x-admin-token` ヘッダーを優先し、
//! なければ `admin_token` クエリパラメータから取得する。

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State, rejection::QueryRejection},
    http::HeaderMap,
    response::IntoResponse,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sorrymail_domain::{apology::ApologyRecord, notification::DeliveryReference};
use uuid::Uuid;

use crate::{error::ApiError, usecase::AdminUseCase};

/// 管理トークンを渡すヘッダー名
pub const ADMIN_TOKEN_HEADER: &str = "x-admin-token";

/// 管理ハンドラの共有状態
pub struct AdminState {
    pub usecase: Arc<dyn AdminUseCase>,
}

/// 管理トークンのクエリパラメータ
#[derive(Debug, Default, Deserialize)]
pub struct AdminTokenQuery {
    pub admin_token: Option<String>,
}

/// 謝罪レコードのレスポンス
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApologyDto {
    pub id:                 Uuid,
    pub sender_name:        String,
    pub recipient_email:    String,
    pub tone:               String,
    pub user_message:       Option<String>,
    pub generated_message:  String,
    pub delivery_reference: Option<String>,
    pub created_at:         DateTime<Utc>,
}

impl From<&ApologyRecord> for ApologyDto {
    fn from(record: &ApologyRecord) -> Self {
        Self {
            id:                 *record.id().as_uuid(),
            sender_name:        record.sender_name().as_str().to_string(),
            recipient_email:    record.recipient_email().as_str().to_string(),
            tone:               record.tone().as_str().to_string(),
            user_message:       record.user_message().map(|m| m.as_str().to_string()),
            generated_message:  record.generated_message().to_string(),
            delivery_reference: record
                .delivery_reference()
                .map(DeliveryReference::as_str)
                .map(str::to_string),
            created_at:         record.created_at(),
        }
    }
}

/// ヘッダー、クエリの順に管理トークンを取り出す
///
/// 空のヘッダーは未指定として扱い、クエリを見る。
fn extract_admin_token(
    headers: &HeaderMap,
    query: Result<Query<AdminTokenQuery>, QueryRejection>,
) -> Option<String> {
    headers
        .get(ADMIN_TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .or_else(|| query.ok().and_then(|Query(q)| q.admin_token))
}

/// GET /api/all
pub async fn list_apologies(
    State(state): State<Arc<AdminState>>,
    headers: HeaderMap,
    query: Result<Query<AdminTokenQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let token = extract_admin_token(&headers, query);
    let records = state.usecase.list_all(token.as_deref()).await?;

    Ok(Json(
        records.iter().map(ApologyDto::from).collect::<Vec<_>>(),
    ))
}

/// GET /api/{id}
pub async fn get_apology(
    State(state): State<Arc<AdminState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
    query: Result<Query<AdminTokenQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let token = extract_admin_token(&headers, query);
    let record = state.usecase.get_by_id(token.as_deref(), &id).await?;

    Ok(Json(ApologyDto::from(&record)))
}
