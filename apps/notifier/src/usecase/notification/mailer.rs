//! # 通知メーラー
//!
//! ガード取得 → テンプレートレンダリング → メール送信 → 結果ログを統合する。
//!
//! ## 設計方針
//!
//! - **ガードは送信前に取得**: 同じ通知を複数の呼び出しが扱っても送信は 1 回だけ
//! - **失敗時はガードを解放**: ガードの不在が送信失敗の唯一の記録になる
//! - **エラーを返さない**: 呼び出し元はトリガーであり、失敗はログに残して終える
//! - **依存性注入**: `DocumentStore` と `NotificationSender` は trait で抽象化

use std::sync::Arc;

use pawcare_domain::notification::{Notification, SendReceipt};
use pawcare_infra::{DocumentStore, notification::NotificationSender};
use pawcare_shared::{
    event_log::{error as log_error, event},
    log_business_event,
};

use super::TemplateRenderer;

/// 配信結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// 送信に成功した
    Sent(SendReceipt),
    /// 別の呼び出しがガードを取得済み（何も送らない）
    AlreadyClaimed,
    /// ガードの取得・レンダリング・送信のいずれかに失敗した
    Failed,
}

impl DeliveryOutcome {
    pub fn is_sent(&self) -> bool {
        matches!(self, Self::Sent(_))
    }
}

/// 通知メーラー
pub struct Mailer {
    store:    Arc<dyn DocumentStore>,
    sender:   Arc<dyn NotificationSender>,
    renderer: Arc<TemplateRenderer>,
    base_url: String,
}

impl Mailer {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        sender: Arc<dyn NotificationSender>,
        renderer: Arc<TemplateRenderer>,
        base_url: String,
    ) -> Self {
        Self {
            store,
            sender,
            renderer,
            base_url,
        }
    }

    /// 通知を 1 回だけ配信する
    pub async fn deliver(&self, notification: Notification) -> DeliveryOutcome {
        let kind = notification.kind();
        let kind_str: &str = kind.into();
        let (collection, document_id) = notification.guard_target();
        let guard_field = notification.guard_field();
        let recipient = notification.recipient_email().to_string();

        match self
            .store
            .claim_guard(collection, document_id, guard_field)
            .await
        {
            Ok(true) => {}
            Ok(false) => {
                log_business_event!(
                    event.category = event::category::NOTIFICATION,
                    event.action = event::action::NOTIFICATION_SKIPPED,
                    event.entity_type = collection.name(),
                    event.entity_id = %document_id,
                    event.result = event::result::SKIPPED,
                    notification.kind = kind_str,
                    notification.guard = guard_field,
                    "ガード取得済みのため通知をスキップ"
                );
                return DeliveryOutcome::AlreadyClaimed;
            }
            Err(e) => {
                tracing::error!(
                    error.category = log_error::category::INFRASTRUCTURE,
                    error.kind = log_error::kind::DATABASE,
                    notification.kind = kind_str,
                    document_id = %document_id,
                    "ガードの取得に失敗: {}",
                    e
                );
                return DeliveryOutcome::Failed;
            }
        }

        let email = match self.renderer.render(&notification, &self.base_url) {
            Ok(email) => email,
            Err(e) => {
                tracing::error!(
                    error.category = log_error::category::INFRASTRUCTURE,
                    error.kind = log_error::kind::TEMPLATE,
                    notification.kind = kind_str,
                    "テンプレートレンダリングに失敗: {}",
                    e
                );
                self.release(&notification).await;
                return DeliveryOutcome::Failed;
            }
        };

        match self.sender.send_email(&email).await {
            Ok(receipt) => {
                log_business_event!(
                    event.category = event::category::NOTIFICATION,
                    event.action = event::action::NOTIFICATION_SENT,
                    event.entity_type = collection.name(),
                    event.entity_id = %document_id,
                    event.result = event::result::SUCCESS,
                    notification.kind = kind_str,
                    notification.recipient = %recipient,
                    notification.message_id = receipt.message_id.as_deref().unwrap_or(""),
                    "通知メール送信成功"
                );
                DeliveryOutcome::Sent(receipt)
            }
            Err(e) => {
                log_business_event!(
                    event.category = event::category::NOTIFICATION,
                    event.action = event::action::NOTIFICATION_FAILED,
                    event.entity_type = collection.name(),
                    event.entity_id = %document_id,
                    event.result = event::result::FAILURE,
                    notification.kind = kind_str,
                    notification.recipient = %recipient,
                    error = %e,
                    "通知メール送信失敗"
                );
                self.release(&notification).await;
                DeliveryOutcome::Failed
            }
        }
    }

    async fn release(&self, notification: &Notification) {
        let (collection, document_id) = notification.guard_target();
        if let Err(e) = self
            .store
            .release_guard(collection, document_id, notification.guard_field())
            .await
        {
            tracing::error!(
                error.category = log_error::category::INFRASTRUCTURE,
                error.kind = log_error::kind::DATABASE,
                document_id = %document_id,
                "ガードの解放に失敗: {}",
                e
            );
        }
    }
}
