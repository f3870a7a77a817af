//! # 予約送信メールのスイーパー
//!
//! 送信期限（`scheduledFor`）を過ぎた `pending` の予約送信メールを送り、
//! 結果を `sent` / `failed` として記録する。
//!
//! ## 設計方針
//!
//! - **起動は任意**: `SCHEDULED_EMAIL_SWEEP_SECS` が設定されたときだけ周期実行する
//! - **二重送信の防止**: 送信はメーラー経由で、ガード `dispatchClaimed` を取得した 1 回だけ
//! - **1 件の失敗で止めない**: 失敗は件数に数えて次のレコードへ進む

use std::{sync::Arc, time::Duration};

use pawcare_domain::{
    clock::Clock,
    collection::Collection,
    document::fields,
    notification::Notification,
    scheduled_email::{ScheduledEmail, ScheduledEmailStatus},
};
use pawcare_infra::DocumentStore;
use serde::Serialize;
use serde_json::json;
use tokio::task::JoinHandle;

use super::notification::{DeliveryOutcome, Mailer};
use crate::error::NotifierError;

/// 1 回のスイープの結果
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SweepReport {
    /// 期限到来で送信を試みた件数
    pub due:     usize,
    pub sent:    usize,
    pub failed:  usize,
    /// 他の呼び出しが処理中だった件数
    pub skipped: usize,
    /// ガードが立ったまま `pending` に残っている ID
    ///
    /// 送信中に停止したインスタンスのガードはどのスイープでも解放されない。
    pub claimed_ids: Vec<String>,
}

/// 予約送信メールのスイーパー
pub struct ScheduledEmailSweeper {
    store:  Arc<dyn DocumentStore>,
    mailer: Arc<Mailer>,
    clock:  Arc<dyn Clock>,
}

impl ScheduledEmailSweeper {
    pub fn new(store: Arc<dyn DocumentStore>, mailer: Arc<Mailer>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            mailer,
            clock,
        }
    }

    /// 期限到来分を 1 回だけ処理する
    pub async fn sweep_once(&self) -> Result<SweepReport, NotifierError> {
        let now = self.clock.now();
        let pending_filter = fields(json!({ "status": ScheduledEmailStatus::Pending }));
        let documents = self
            .store
            .query(Collection::ScheduledEmails, &pending_filter)
            .await?;

        let mut report = SweepReport::default();
        for document in &documents {
            let scheduled = match ScheduledEmail::from_document(document) {
                Ok(scheduled) => scheduled,
                Err(e) => {
                    tracing::warn!(scheduled_email_id = %document.id, "予約送信メールを読み込めません: {}", e);
                    continue;
                }
            };
            if !scheduled.is_due(now) {
                continue;
            }
            report.due += 1;

            let id = scheduled.id.clone();
            let notification = Notification::BookingRatingReminder {
                recipient: scheduled.user_email.clone(),
                scheduled,
            };
            let status_update = match self.mailer.deliver(notification).await {
                DeliveryOutcome::Sent(_) => {
                    report.sent += 1;
                    json!({ "status": ScheduledEmailStatus::Sent, "sentAt": now.to_rfc3339() })
                }
                DeliveryOutcome::Failed => {
                    report.failed += 1;
                    json!({ "status": ScheduledEmailStatus::Failed, "failedAt": now.to_rfc3339() })
                }
                DeliveryOutcome::AlreadyClaimed => {
                    tracing::warn!(
                        scheduled_email_id = %id,
                        "ガードが立ったまま pending の予約送信メールをスキップ"
                    );
                    report.skipped += 1;
                    report.claimed_ids.push(id);
                    continue;
                }
            };
            if let Err(e) = self
                .store
                .update_fields(Collection::ScheduledEmails, &id, fields(status_update))
                .await
            {
                tracing::error!(scheduled_email_id = %id, "予約送信メールの状態更新に失敗: {}", e);
            }
        }

        if report.due > 0 {
            tracing::info!(
                due = report.due,
                sent = report.sent,
                failed = report.failed,
                skipped = report.skipped,
                "予約送信メールのスイープ完了"
            );
        }
        Ok(report)
    }

    /// 指定間隔で周期実行する
    pub async fn run(self, period: Duration) {
        tracing::info!(period_secs = period.as_secs(), "予約送信メールのスイーパーを開始しました");
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            if let Err(e) = self.sweep_once().await {
                tracing::error!("予約送信メールのスイープに失敗: {}", e);
            }
        }
    }

    /// バックグラウンドタスクとして起動する
    pub fn spawn(self, period: Duration) -> JoinHandle<()> {
        tokio::spawn(self.run(period))
    }
}
