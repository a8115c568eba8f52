//! # ユースケース層
//!
//! SorryMail のビジネスロジックを実装する。
//!
//! ## 設計方針
//!
//! - **トレイトベースの設計**: ハンドラからはトレイト経由で呼び出す
//! - **依存性注入**: リポジトリ・文章生成・メール配送・時計を外部から注入
//! - **薄いハンドラ**: ハンドラは入力の変換のみ行い、ロジックはユースケースに集約

pub mod admin;
pub mod apology;

pub use admin::AdminUseCaseImpl;
pub use apology::ApologyUseCaseImpl;
use async_trait::async_trait;
use sorrymail_domain::apology::{ApologyId, ApologyRecord, ApologySubmission};

use crate::error::ApiError;

/// 謝罪メール送信ユースケーストレイト
#[async_trait]
pub trait ApologyUseCase: Send + Sync {
    /// 謝罪メールを生成・送信し、記録を保存する
    ///
    /// 処理順序はレート制限の確認、文章生成、配送、保存で固定。
    /// いずれかが失敗した時点で後続は実行しない。
    ///
    /// ## 戻り値
    ///
    /// - `Ok(ApologyId)`: 保存されたレコードの ID
    /// - `Err(ApiError::RateLimited)`: 24 時間以内に同じ宛先へ送信済み
    /// - `Err(ApiError::Generation | Delivery | Persistence)`: 各段階の失敗
    async fn submit(&self, submission: ApologySubmission) -> Result<ApologyId, ApiError>;
}

/// 管理者向け参照ユースケーストレイト
///
/// すべての操作はトークン検証を先に行い、失敗時はストアに触れない。
#[async_trait]
pub trait AdminUseCase: Send + Sync {
    /// 管理トークンを検証する
    fn authorize(&self, token: Option<&str>) -> bool;

    /// 全レコードを作成日時の降順で取得する
    async fn list_all(&self, token: Option<&str>) -> Result<Vec<ApologyRecord>, ApiError>;

    /// ID を指定してレコードを取得する
    ///
    /// ID の形式が不正な場合も `NotFound` として扱う。
    async fn get_by_id(&self, token: Option<&str>, id: &str) -> Result<ApologyRecord, ApiError>;
}

#[async_trait]
impl ApologyUseCase for ApologyUseCaseImpl {
    async fn submit(&self, submission: ApologySubmission) -> Result<ApologyId, ApiError> {
        self.submit(submission).await
    }
}

#[async_trait]
impl AdminUseCase for AdminUseCaseImpl {
    fn authorize(&self, token: Option<&str>) -> bool {
        self.authorize(token)
    }

    async fn list_all(&self, token: Option<&str>) -> Result<Vec<ApologyRecord>, ApiError> {
        self.list_all(token).await
    }

    async fn get_by_id(&self, token: Option<&str>, id: &str) -> Result<ApologyRecord, ApiError> {
        self.get_by_id(token, id).await
    }
}
