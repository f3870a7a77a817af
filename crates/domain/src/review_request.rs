//! # レビュー依頼
//!
//! 予約が `completed` に達し、完了メールの送信に成功したときに 1 件だけ作成される派生レコード。
//! 管理画面で「依頼済み／回答済み」を表示するためだけに存在し、トリガーの起点にはならない。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    DomainError,
    booking::Booking,
    collection::BookingKind,
    document::{Document, Fields, fields},
};

/// レビュー依頼
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRequest {
    #[serde(skip)]
    pub id:           String,
    pub booking_id:   String,
    pub booking_type: BookingKind,
    #[serde(default)]
    pub center_id:    Option<String>,
    pub user_email:   String,
    pub sent_at:      DateTime<Utc>,
    #[serde(default)]
    pub responded:    bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responded_at: Option<DateTime<Utc>>,
}

impl ReviewRequest {
    /// 完了メール送信済みの予約からレビュー依頼を作る
    ///
    /// ID はドキュメントストアが採番するため空のまま。
    pub fn for_completed_booking(
        booking: &Booking,
        user_email: &str,
        sent_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: String::new(),
            booking_id: booking.id.clone(),
            booking_type: booking.kind,
            center_id: booking.center_id.clone(),
            user_email: user_email.to_string(),
            sent_at,
            responded: false,
            responded_at: None,
        }
    }

    pub fn from_document(document: &Document) -> Result<Self, DomainError> {
        let request: Self = serde_json::from_value(serde_json::Value::Object(document.data.clone()))
            .map_err(|e| {
                DomainError::Validation(format!("ReviewRequest をデコードできません: {e}"))
            })?;
        Ok(Self {
            id: document.id.clone(),
            ..request
        })
    }

    /// ドキュメントストアに書き込むフィールド
    pub fn to_fields(&self) -> Fields {
        fields(serde_json::to_value(self).unwrap_or_default())
    }

    /// 回答済みにする
    pub fn mark_responded(&mut self, at: DateTime<Utc>) {
        self.responded = true;
        self.responded_at = Some(at);
    }
}
