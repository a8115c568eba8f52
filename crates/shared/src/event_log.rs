//! # ビジネスイベントログ
//!
//! 謝罪メールの送信結果や管理 API への不正アクセスなど、運用上追跡したい
//! 出来事を構造化ログとして出力するための規約。
//!
//! - ビジネスイベント: [`log_business_event!`] で出力し、`event.kind = "business_event"` が付く
//! - エラーコンテキスト: `tracing::error!` に `error.category` / `error.kind` を付ける
//!
//! JSON 出力ではドット区切りのフィールド名がそのままキーになるため、
//! `jq 'select(.["event.action"] == "apology.sent")'` のように抽出できる。

/// ビジネスイベントを INFO レベルで出力する
///
/// 呼び出し側のクレートが `tracing` に依存している必要がある。
///
/// ```ignore
/// use sorrymail_shared::{event_log::event, log_business_event};
///
/// log_business_event!(
///     event.category = event::category::APOLOGY,
///     event.action = event::action::APOLOGY_SENT,
///     event.entity_type = event::entity_type::APOLOGY,
///     event.entity_id = %id,
///     event.result = event::result::SUCCESS,
///     "謝罪メール送信完了"
/// );
/// ```
#[macro_export]
macro_rules! log_business_event {
    ($($args:tt)*) => {
        ::tracing::info!(
            event.kind = "business_event",
            $($args)*
        )
    };
}

/// イベントフィールドの定数
pub mod event {
    /// イベントカテゴリ
    pub mod category {
        pub const APOLOGY: &str = "apology";
        pub const ADMIN: &str = "admin";
    }

    /// イベントアクション
    pub mod action {
        // 謝罪メール
        pub const APOLOGY_SENT: &str = "apology.sent";
        pub const APOLOGY_RATE_LIMITED: &str = "apology.rate_limited";
        pub const APOLOGY_DELIVERY_FAILED: &str = "apology.delivery_failed";
        pub const APOLOGY_PERSISTENCE_FAILED: &str = "apology.persistence_failed";

        // 管理者
        pub const ADMIN_UNAUTHORIZED: &str = "admin.unauthorized";
    }

    /// エンティティ種別
    pub mod entity_type {
        pub const APOLOGY: &str = "apology";
    }

    /// イベント結果
    pub mod result {
        pub const SUCCESS: &str = "success";
        pub const FAILURE: &str = "failure";
    }
}

/// エラーコンテキストフィールドの定数
pub mod error {
    /// エラーカテゴリ
    pub mod category {
        /// インフラストラクチャ（DB）
        pub const INFRASTRUCTURE: &str = "infrastructure";
        /// 外部サービス呼び出し（文章生成、メール配送）
        pub const EXTERNAL_SERVICE: &str = "external_service";
        /// 認可
        pub const SECURITY: &str = "security";
    }

    /// エラー種別
    pub mod kind {
        pub const DATABASE: &str = "database";
        pub const GENERATION: &str = "generation";
        pub const DELIVERY: &str = "delivery";
        /// 配送成功後の保存失敗（メールは送信済み）
        pub const PERSISTENCE_AFTER_DELIVERY: &str = "persistence_after_delivery";
        pub const AUTHORIZATION: &str = "authorization";
    }
}
