//! # テスト用モック
//!
//! ユースケース・ハンドラのテストで使用するインメモリ実装。
//! `test-utils` feature を有効にすることで、他クレートからも利用可能。
//!
//! ```toml
//! [dev-dependencies]
//! sorrymail-infra = { workspace = true, features = ["test-utils"] }
//! ```
//!
//! 各モックは `Clone` で内部状態を共有する。テスト側で 1 つ clone して保持し、
//! ユースケースに渡した側の呼び出し結果を検証する。

use std::sync::{
    Arc,
    Mutex,
    atomic::{AtomicBool, AtomicUsize, Ordering},
};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sorrymail_domain::{
    apology::{ApologyId, ApologyRecord, RecipientEmail},
    generation::{GenerationError, GenerationRequest},
    notification::{DeliveryError, DeliveryReference, EmailMessage},
};

use crate::{
    error::InfraError,
    generation::{ApologyGenerator, normalize_generated_text},
    notification::NotificationSender,
    repository::ApologyRepository,
};

// ===== MockApologyRepository =====

#[derive(Clone, Default)]
pub struct MockApologyRepository {
    records:     Arc<Mutex<Vec<ApologyRecord>>>,
    fail_insert: Arc<AtomicBool>,
    fail_reads:  Arc<AtomicBool>,
    read_calls:  Arc<AtomicUsize>,
}

impl MockApologyRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// 既存レコードを直接追加する
    pub fn add_record(&self, record: ApologyRecord) {
        self.records.lock().unwrap().push(record);
    }

    /// 保存済みレコードのスナップショット
    pub fn records(&self) -> Vec<ApologyRecord> {
        self.records.lock().unwrap().clone()
    }

    /// 以降の insert を失敗させる
    pub fn fail_inserts(&self) {
        self.fail_insert.store(true, Ordering::SeqCst);
    }

    /// 以降の読み取り系を失敗させる
    pub fn fail_reads(&self) {
        self.fail_reads.store(true, Ordering::SeqCst);
    }

    /// 読み取り系メソッドの呼び出し回数
    pub fn read_calls(&self) -> usize {
        self.read_calls.load(Ordering::SeqCst)
    }

    fn begin_read(&self) -> Result<(), InfraError> {
        self.read_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(InfraError::unexpected("mock: 読み取り失敗"));
        }
        Ok(())
    }
}

#[async_trait]
impl ApologyRepository for MockApologyRepository {
    async fn find_recent(
        &self,
        recipient_email: &RecipientEmail,
        since: DateTime<Utc>,
    ) -> Result<Option<ApologyRecord>, InfraError> {
        self.begin_read()?;
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.recipient_email() == recipient_email && r.created_at() >= since)
            .max_by_key(|r| r.created_at())
            .cloned())
    }

    async fn insert(&self, record: &ApologyRecord) -> Result<ApologyId, InfraError> {
        if self.fail_insert.load(Ordering::SeqCst) {
            return Err(InfraError::unexpected("mock: 挿入失敗"));
        }
        self.records.lock().unwrap().push(record.clone());
        Ok(*record.id())
    }

    async fn find_all(&self) -> Result<Vec<ApologyRecord>, InfraError> {
        self.begin_read()?;
        let mut records = self.records.lock().unwrap().clone();
        records.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        Ok(records)
    }

    async fn find_by_id(&self, id: &ApologyId) -> Result<Option<ApologyRecord>, InfraError> {
        self.begin_read()?;
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id() == id)
            .cloned())
    }
}

// ===== MockApologyGenerator =====

/// 固定の応答を返す生成モック
///
/// 応答は実装と同じく正規化（trim + 小文字化）される。
#[derive(Clone)]
pub struct MockApologyGenerator {
    response: Arc<Mutex<Option<String>>>,
    requests: Arc<Mutex<Vec<GenerationRequest>>>,
    fail:     Arc<AtomicBool>,
}

impl Default for MockApologyGenerator {
    fn default() -> Self {
        Self::with_response("I'm Sorry. I should have been there.")
    }
}

impl MockApologyGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_response(response: impl Into<String>) -> Self {
        Self {
            response: Arc::new(Mutex::new(Some(response.into()))),
            requests: Arc::new(Mutex::new(Vec::new())),
            fail:     Arc::new(AtomicBool::new(false)),
        }
    }

    /// 以降の呼び出しをプロバイダエラーにする
    pub fn fail(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }

    /// 受け取ったリクエスト
    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl ApologyGenerator for MockApologyGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        self.requests.lock().unwrap().push(request.clone());
        if self.fail.load(Ordering::SeqCst) {
            return Err(GenerationError::Provider("mock: 生成失敗".to_string()));
        }
        let response = self.response.lock().unwrap().clone();
        normalize_generated_text(response.as_deref())
    }
}

// ===== MockNotificationSender =====

/// 送信内容を記録する配送モック
#[derive(Clone)]
pub struct MockNotificationSender {
    sent:      Arc<Mutex<Vec<EmailMessage>>>,
    reference: Arc<Mutex<Option<String>>>,
    fail:      Arc<AtomicBool>,
}

impl Default for MockNotificationSender {
    fn default() -> Self {
        Self {
            sent:      Arc::new(Mutex::new(Vec::new())),
            reference: Arc::new(Mutex::new(Some("mock-message-id".to_string()))),
            fail:      Arc::new(AtomicBool::new(false)),
        }
    }
}

impl MockNotificationSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// 配送参照を返さないプロバイダとして振る舞う
    pub fn without_reference(self) -> Self {
        *self.reference.lock().unwrap() = None;
        self
    }

    /// 以降の送信を失敗させる
    pub fn fail(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }

    /// 送信されたメール
    pub fn sent_emails(&self) -> Vec<EmailMessage> {
        self.sent.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl NotificationSender for MockNotificationSender {
    async fn send_email(
        &self,
        email: &EmailMessage,
    ) -> Result<Option<DeliveryReference>, DeliveryError> {
        self.sent.lock().unwrap().push(email.clone());
        if self.fail.load(Ordering::SeqCst) {
            return Err(DeliveryError::Rejected {
                status:  422,
                message: "mock: 配送失敗".to_string(),
            });
        }
        Ok(self
            .reference
            .lock()
            .unwrap()
            .clone()
            .map(DeliveryReference::new))
    }
}
