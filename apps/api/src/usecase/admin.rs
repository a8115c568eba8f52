//! # 管理者向け参照ユースケース
//!
//! 管理トークンで保護された一覧・詳細取得。
//! トークンの比較は `subtle` による定数時間比較で行う。

use std::sync::Arc;

use sorrymail_domain::{
    DomainError,
    apology::{ApologyId, ApologyRecord},
};
use sorrymail_infra::repository::ApologyRepository;
use sorrymail_shared::{
    event_log::{error, event},
    log_business_event,
};
use subtle::ConstantTimeEq;

use crate::error::ApiError;

/// 管理者向け参照ユースケースの実装
pub struct AdminUseCaseImpl {
    repository:  Arc<dyn ApologyRepository>,
    admin_token: String,
}

impl AdminUseCaseImpl {
    pub fn new(repository: Arc<dyn ApologyRepository>, admin_token: impl Into<String>) -> Self {
        Self {
            repository,
            admin_token: admin_token.into(),
        }
    }

    /// 管理トークンを検証する
    ///
    /// 未指定・空文字列のトークン、および空の設定値では常に `false`。
    pub fn authorize(&self, token: Option<&str>) -> bool {
        let Some(token) = token else {
            return false;
        };
        if token.is_empty() || self.admin_token.is_empty() {
            return false;
        }
        token.as_bytes().ct_eq(self.admin_token.as_bytes()).into()
    }

    fn require_authorized(&self, token: Option<&str>) -> Result<(), ApiError> {
        if self.authorize(token) {
            return Ok(());
        }
        log_business_event!(
            event.category = event::category::ADMIN,
            event.action = event::action::ADMIN_UNAUTHORIZED,
            event.result = event::result::FAILURE,
            error.category = error::category::SECURITY,
            error.kind = error::kind::AUTHORIZATION,
            token_present = token.is_some(),
            "管理 API への不正なアクセス"
        );
        Err(ApiError::Unauthorized)
    }

    /// 全レコードを作成日時の降順で取得する
    pub async fn list_all(&self, token: Option<&str>) -> Result<Vec<ApologyRecord>, ApiError> {
        self.require_authorized(token)?;
        Ok(self.repository.find_all().await?)
    }

    /// ID を指定してレコードを取得する
    pub async fn get_by_id(&self, token: Option<&str>, id: &str) -> Result<ApologyRecord, ApiError> {
        self.require_authorized(token)?;

        let not_found = || {
            ApiError::from(DomainError::NotFound {
                entity_type: "謝罪レコード",
                id:          id.to_string(),
            })
        };

        let apology_id = ApologyId::parse_str(id).ok_or_else(not_found)?;
        self.repository
            .find_by_id(&apology_id)
            .await?
            .ok_or_else(not_found)
    }
}
