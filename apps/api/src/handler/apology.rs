//! # 謝罪メール送信ハンドラ
//!
//! ## エンドポイント
//!
//! - `POST /api/send` - 謝罪文を生成して送信する
//!
//! リクエストは全フィールドを `Option` で受け取り、境界で値オブジェクトに検証する。
//! JSON として解釈できないボディも 400 として返す。

use std::sync::Arc;

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use sorrymail_domain::apology::ApologySubmission;
use uuid::Uuid;

use crate::{error::ApiError, usecase::ApologyUseCase};

/// 謝罪メール送信ハンドラの共有状態
pub struct ApologyState {
    pub usecase: Arc<dyn ApologyUseCase>,
}

/// 謝罪メール送信リクエスト
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendApologyRequest {
    pub sender_name:     Option<String>,
    pub recipient_email: Option<String>,
    pub tone:            Option<String>,
    pub message:         Option<String>,
}

/// 謝罪メール送信レスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct SendApologyResponse {
    pub success: bool,
    pub id:      Uuid,
}

/// POST /api/send
pub async fn send_apology(
    State(state): State<Arc<ApologyState>>,
    payload: Result<Json<SendApologyRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload.map_err(|rejection| {
        ApiError::Validation(format!(
            "リクエストボディが不正です: {}",
            rejection.body_text()
        ))
    })?;

    let submission =
        ApologySubmission::parse(req.sender_name, req.recipient_email, req.tone, req.message)?;
    let id = state.usecase.submit(submission).await?;

    Ok(Json(SendApologyResponse {
        success: true,
        id:      *id.as_uuid(),
    }))
}
