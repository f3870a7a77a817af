//! # 通知トリガー
//!
//! ドキュメントの作成・更新イベントを受け取り、通知が必要かを判定して送信する。
//!
//! ## 設計方針
//!
//! - **トリガーはエラーを返さない**: 呼び出し元はチェンジフィードであり、
//!   失敗はログに残して終える
//! - **送信はトリガーに集約**: ステータス変更 API はドキュメントを書き込むだけで、
//!   メールはこの層だけが送る
//! - **ステータス未変更は何もしない**: 更新イベントは更新前後の `status` が異なる場合だけ扱う
//!
//! ## モジュール構成
//!
//! - `order`: 注文の作成・ステータス変更
//! - `appointment`: 診察予約の作成・ステータス変更
//! - `prescription`: 処方箋の作成
//! - `booking`: トリミング・預かり予約のステータス変更
//! - [`dispatcher`]: チェンジフィードの購読とイベントごとのタスク起動

mod appointment;
mod booking;
pub mod dispatcher;
mod order;
mod prescription;

use std::sync::Arc;

use pawcare_domain::{
    clock::Clock,
    document::{Document, DocumentEvent, DocumentEventKind},
    record::Record,
};
use pawcare_infra::DocumentStore;

pub use self::dispatcher::TriggerDispatcher;
use super::notification::Mailer;

/// 通知トリガー
pub struct NotificationTriggers {
    store:          Arc<dyn DocumentStore>,
    mailer:         Arc<Mailer>,
    business_email: String,
    clock:          Arc<dyn Clock>,
}

impl NotificationTriggers {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        mailer: Arc<Mailer>,
        business_email: String,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            mailer,
            business_email,
            clock,
        }
    }

    /// ドキュメントイベントを処理する
    pub async fn handle(&self, event: DocumentEvent) {
        let DocumentEvent {
            collection,
            document_id,
            kind,
        } = event;

        match kind {
            DocumentEventKind::Created { data } => {
                let document = Document::new(document_id, data);
                match Record::decode(collection, &document) {
                    Some(Record::Order(order)) => self.on_order_created(order).await,
                    Some(Record::Appointment(appointment)) => {
                        self.on_appointment_created(appointment).await;
                    }
                    Some(Record::Prescription(prescription)) => {
                        self.on_prescription_created(prescription).await;
                    }
                    Some(Record::Booking(_)) | None => {}
                }
            }
            DocumentEventKind::Updated { before, after } => {
                let before = Record::decode(collection, &Document::new(document_id.clone(), before));
                let after = Record::decode(collection, &Document::new(document_id, after));
                let (Some(before), Some(after)) = (before, after) else {
                    return;
                };
                if before.raw_status().map(str::trim) == after.raw_status().map(str::trim) {
                    return;
                }

                match after {
                    Record::Order(order) => self.on_order_status_changed(order).await,
                    Record::Appointment(appointment) => {
                        self.on_appointment_status_changed(appointment).await;
                    }
                    Record::Booking(booking) => self.on_booking_status_changed(booking).await,
                    Record::Prescription(_) => {}
                }
            }
        }
    }
}
