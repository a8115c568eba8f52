//! テスト共通フィクスチャ

// 各テストファイルが独立したクレートとしてコンパイルされるため、
// 使用しない関数に dead_code 警告が出る。モジュール全体で抑制する。
#![allow(dead_code)]

use chrono::{DateTime, Utc};
use sorrymail_domain::{
    apology::{ApologyRecord, ApologySubmission},
    notification::DeliveryReference,
};

/// テストの基準時刻
///
/// DB の TIMESTAMPTZ はマイクロ秒精度のため、秒単位の値を使う。
pub fn base_time() -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000, 0).unwrap()
}

/// 指定時刻に作成された謝罪レコード
pub fn record_at(recipient: &str, created_at: DateTime<Utc>) -> ApologyRecord {
    let submission = ApologySubmission::parse(
        Some("amogh".to_string()),
        Some(recipient.to_string()),
        Some("sincere".to_string()),
        Some("i forgot your birthday".to_string()),
    )
    .unwrap();

    ApologyRecord::new(
        submission,
        "i'm sorry.".to_string(),
        Some(DeliveryReference::new("re_123")),
        created_at,
    )
}
