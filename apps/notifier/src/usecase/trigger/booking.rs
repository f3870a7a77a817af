//! トリミング・預かり予約トリガー
//!
//! 確定・完了・キャンセルで 1 通ずつ送る。到着（arrived）は通知しない。
//! 確定メールの送信後は評価依頼メールを予約し、完了メールの送信後はレビュー依頼を作成する。

use pawcare_domain::{
    booking::Booking,
    collection::Collection,
    notification::{BookingStatusNotice, Notification},
    review_request::ReviewRequest,
    scheduled_email::ScheduledEmail,
};
use pawcare_shared::{event_log::event, log_business_event};

use super::NotificationTriggers;

impl NotificationTriggers {
    pub(super) async fn on_booking_status_changed(&self, booking: Booking) {
        let Some(notice) = booking.status().and_then(BookingStatusNotice::from_status) else {
            return;
        };
        let Some(recipient) = booking.contact_email().map(str::to_string) else {
            tracing::info!(
                booking_id = %booking.id,
                booking_kind = %booking.kind,
                "userEmail が無いため予約通知をスキップ"
            );
            return;
        };

        let outcome = self
            .mailer
            .deliver(Notification::for_booking(
                notice,
                recipient.clone(),
                booking.clone(),
            ))
            .await;
        if !outcome.is_sent() {
            return;
        }

        match notice {
            BookingStatusNotice::Confirmed => {
                self.schedule_rating_request(&booking, &recipient).await;
            }
            BookingStatusNotice::Completed => {
                self.create_review_request(&booking, &recipient).await;
            }
            BookingStatusNotice::Cancelled => {}
        }
    }

    async fn schedule_rating_request(&self, booking: &Booking, recipient: &str) {
        let scheduled = ScheduledEmail::rating_request(booking, recipient, self.clock.now());
        match self
            .store
            .create(Collection::ScheduledEmails, scheduled.to_fields())
            .await
        {
            Ok(document) => {
                log_business_event!(
                    event.category = event::category::NOTIFICATION,
                    event.action = event::action::SCHEDULED_EMAIL_CREATED,
                    event.entity_type = event::entity_type::SCHEDULED_EMAIL,
                    event.entity_id = %document.id,
                    event.result = event::result::SUCCESS,
                    booking_id = %booking.id,
                    scheduled_for = %scheduled.scheduled_for.to_rfc3339(),
                    "評価依頼メールを予約"
                );
            }
            Err(e) => {
                tracing::error!(booking_id = %booking.id, "評価依頼メールの予約に失敗: {}", e);
            }
        }
    }

    async fn create_review_request(&self, booking: &Booking, recipient: &str) {
        let request = ReviewRequest::for_completed_booking(booking, recipient, self.clock.now());
        match self
            .store
            .create(Collection::ReviewRequests, request.to_fields())
            .await
        {
            Ok(document) => {
                log_business_event!(
                    event.category = event::category::REVIEW,
                    event.action = event::action::REVIEW_REQUESTED,
                    event.entity_type = event::entity_type::REVIEW_REQUEST,
                    event.entity_id = %document.id,
                    event.result = event::result::SUCCESS,
                    booking_id = %booking.id,
                    "レビュー依頼を作成"
                );
            }
            Err(e) => {
                tracing::error!(booking_id = %booking.id, "レビュー依頼の作成に失敗: {}", e);
            }
        }
    }
}
