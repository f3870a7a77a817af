//! # レコード作成ユースケース
//!
//! 顧客向けフォームからの注文・診察予約・処方箋・予約の作成を扱う。
//! 作成イベントはチェンジフィード経由で作成トリガーを起動する。

use std::sync::Arc;

use pawcare_domain::{
    clock::Clock,
    collection::{BookingKind, Collection},
    document::{Document, Fields},
    status::{AppointmentStatus, BookingStatus, OrderStatus, StatusLifecycle, require_status},
};
use pawcare_infra::DocumentStore;
use serde_json::Value;

use crate::error::NotifierError;

/// 作成できるレコードの種類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NewRecord {
    Order,
    Appointment,
    Prescription,
    Booking(BookingKind),
}

impl NewRecord {
    fn collection(self) -> Collection {
        match self {
            Self::Order => Collection::Orders,
            Self::Appointment => Collection::Appointments,
            Self::Prescription => Collection::DoctorPrescriptions,
            Self::Booking(kind) => kind.collection(),
        }
    }

    /// `status` 未指定時の初期ステータス。処方箋はステータスを持たない
    fn initial_status(self) -> Option<&'static str> {
        match self {
            Self::Order => Some(OrderStatus::Pending.as_str()),
            Self::Appointment => Some(AppointmentStatus::Pending.as_str()),
            Self::Booking(_) => Some(BookingStatus::Pending.as_str()),
            Self::Prescription => None,
        }
    }

    /// 初期ステータスを検証する。処方箋はステータスを持たない
    fn validate_status(self, raw: &str) -> Result<(), NotifierError> {
        match self {
            Self::Order => require_status::<OrderStatus>(raw).map(|_| ()),
            Self::Appointment => require_status::<AppointmentStatus>(raw).map(|_| ()),
            Self::Booking(_) => require_status::<BookingStatus>(raw).map(|_| ()),
            Self::Prescription => Ok(()),
        }
        .map_err(NotifierError::from)
    }
}

/// レコード作成ユースケース
pub struct RecordUseCaseImpl {
    store: Arc<dyn DocumentStore>,
    clock: Arc<dyn Clock>,
}

impl RecordUseCaseImpl {
    pub fn new(store: Arc<dyn DocumentStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// レコードを作成する
    ///
    /// `status` が無ければ `pending` を設定する。`createdAt` は常にサーバー時刻で上書きする。
    pub async fn create(&self, record: NewRecord, mut data: Fields) -> Result<Document, NotifierError> {
        if let Some(initial) = record.initial_status() {
            match data.get("status") {
                None | Some(Value::Null) => {
                    data.insert("status".to_string(), Value::String(initial.to_string()));
                }
                Some(Value::String(raw)) => record.validate_status(raw)?,
                Some(other) => {
                    return Err(NotifierError::BadRequest(format!(
                        "status は文字列である必要があります: {other}"
                    )));
                }
            }
        }
        data.insert(
            "createdAt".to_string(),
            Value::String(self.clock.now().to_rfc3339()),
        );

        let document = self
            .store
            .create(record.collection(), data)
            .await
            .map_err(NotifierError::from_store)?;
        tracing::info!(
            collection = %record.collection(),
            document_id = %document.id,
            "レコードを作成しました"
        );
        Ok(document)
    }
}
