//! # 謝罪メール送信ユースケース
//!
//! レート制限の確認、文章生成、配送、保存を順に実行する。
//!
//! ## 補償しない失敗
//!
//! - 生成成功後の配送失敗: 生成文は破棄し、`error.kind = "delivery"` で記録する
//! - 配送成功後の保存失敗: メールは送信済みのまま、
//!   `error.kind = "persistence_after_delivery"` で宛先と配送参照を記録する
//!
//! 同じ宛先への同時リクエストは確認と保存の間で競合しうる（ロックは取らない）。

use std::sync::Arc;

use sorrymail_domain::{
    apology::{ApologyId, ApologyRecord, ApologySubmission, rate_limit_window_start},
    clock::Clock,
    generation::GenerationRequest,
    notification::{DeliveryReference, EmailMessage},
};
use sorrymail_infra::{
    generation::ApologyGenerator,
    notification::NotificationSender,
    repository::ApologyRepository,
};
use sorrymail_shared::{
    event_log::{error, event},
    log_business_event,
};

use crate::error::ApiError;

/// 謝罪メール送信ユースケースの実装
pub struct ApologyUseCaseImpl {
    repository: Arc<dyn ApologyRepository>,
    generator:  Arc<dyn ApologyGenerator>,
    sender:     Arc<dyn NotificationSender>,
    clock:      Arc<dyn Clock>,
}

impl ApologyUseCaseImpl {
    pub fn new(
        repository: Arc<dyn ApologyRepository>,
        generator: Arc<dyn ApologyGenerator>,
        sender: Arc<dyn NotificationSender>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            generator,
            sender,
            clock,
        }
    }

    /// 謝罪メールを送信する
    pub async fn submit(&self, submission: ApologySubmission) -> Result<ApologyId, ApiError> {
        let since = rate_limit_window_start(self.clock.now());
        if let Some(existing) = self
            .repository
            .find_recent(&submission.recipient_email, since)
            .await?
        {
            log_business_event!(
                event.category = event::category::APOLOGY,
                event.action = event::action::APOLOGY_RATE_LIMITED,
                event.entity_type = event::entity_type::APOLOGY,
                event.entity_id = %existing.id(),
                event.result = event::result::FAILURE,
                "24 時間以内に送信済みの宛先のため拒否"
            );
            return Err(ApiError::RateLimited);
        }

        let request = GenerationRequest {
            sender_name:  submission.sender_name.clone(),
            tone:         submission.tone.clone(),
            user_message: submission.user_message.clone(),
        };
        let generated_message = self.generator.generate(&request).await?;

        let email = EmailMessage::apology(submission.recipient_email.as_str(), &generated_message);
        let delivery_reference = match self.sender.send_email(&email).await {
            Ok(reference) => reference,
            Err(e) => {
                log_business_event!(
                    event.category = event::category::APOLOGY,
                    event.action = event::action::APOLOGY_DELIVERY_FAILED,
                    event.entity_type = event::entity_type::APOLOGY,
                    event.result = event::result::FAILURE,
                    error = %e,
                    "謝罪メールの配送に失敗（生成文は破棄）"
                );
                return Err(e.into());
            }
        };

        let record = ApologyRecord::new(
            submission,
            generated_message,
            delivery_reference,
            self.clock.now(),
        );

        match self.repository.insert(&record).await {
            Ok(id) => {
                log_business_event!(
                    event.category = event::category::APOLOGY,
                    event.action = event::action::APOLOGY_SENT,
                    event.entity_type = event::entity_type::APOLOGY,
                    event.entity_id = %id,
                    event.result = event::result::SUCCESS,
                    "謝罪メール送信完了"
                );
                Ok(id)
            }
            Err(e) => {
                tracing::error!(
                    error.category = error::category::INFRASTRUCTURE,
                    error.kind = error::kind::PERSISTENCE_AFTER_DELIVERY,
                    apology.recipient = record.recipient_email().as_str(),
                    apology.delivery_reference =
                        record.delivery_reference().map(DeliveryReference::as_str),
                    "配送済みの謝罪レコードを保存できませんでした: {}",
                    e
                );
                log_business_event!(
                    event.category = event::category::APOLOGY,
                    event.action = event::action::APOLOGY_PERSISTENCE_FAILED,
                    event.entity_type = event::entity_type::APOLOGY,
                    event.entity_id = %record.id(),
                    event.result = event::result::FAILURE,
                    "謝罪レコードの保存に失敗"
                );
                Err(e.into())
            }
        }
    }
}
