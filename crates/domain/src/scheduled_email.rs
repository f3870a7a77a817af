//! # 予約送信メール
//!
//! 予約が `confirmed` になったときに作成される「体験の評価をお願いします」メールの予約レコード。
//! `scheduledFor`（チェックイン + 24 時間）を過ぎた `pending` のレコードを
//! スイーパーが送信し、`sent` / `failed` に更新する。

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use strum::IntoStaticStr;

use crate::{
    DomainError,
    booking::Booking,
    collection::BookingKind,
    document::{Document, Fields, fields},
};

/// 予約送信の遅延（チェックインからの経過時間）
pub const RATING_REQUEST_DELAY_HOURS: i64 = 24;

/// 予約送信メールの種類
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    IntoStaticStr,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ScheduledEmailKind {
    /// 利用体験の評価依頼
    RatingRequest,
}

/// 予約送信メールの状態
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    IntoStaticStr,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ScheduledEmailStatus {
    Pending,
    Sent,
    Failed,
}

/// 予約送信メール
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledEmail {
    #[serde(skip)]
    pub id:            String,
    pub kind:          ScheduledEmailKind,
    pub booking_id:    String,
    pub booking_type:  BookingKind,
    pub user_email:    String,
    #[serde(default)]
    pub user_name:     Option<String>,
    #[serde(default)]
    pub center_name:   Option<String>,
    pub scheduled_for: DateTime<Utc>,
    pub status:        ScheduledEmailStatus,
    pub created_at:    DateTime<Utc>,
}

impl ScheduledEmail {
    /// 確定した予約の評価依頼を作る
    ///
    /// チェックイン日時が解釈できない場合は作成時刻を起点にする。
    pub fn rating_request(booking: &Booking, user_email: &str, now: DateTime<Utc>) -> Self {
        let base = booking.check_in_at().unwrap_or(now);
        Self {
            id:            String::new(),
            kind:          ScheduledEmailKind::RatingRequest,
            booking_id:    booking.id.clone(),
            booking_type:  booking.kind,
            user_email:    user_email.to_string(),
            user_name:     booking.user_name.clone(),
            center_name:   booking.center_name.clone(),
            scheduled_for: base + Duration::hours(RATING_REQUEST_DELAY_HOURS),
            status:        ScheduledEmailStatus::Pending,
            created_at:    now,
        }
    }

    pub fn from_document(document: &Document) -> Result<Self, DomainError> {
        let email: Self = serde_json::from_value(serde_json::Value::Object(document.data.clone()))
            .map_err(|e| {
                DomainError::Validation(format!("ScheduledEmail をデコードできません: {e}"))
            })?;
        Ok(Self {
            id: document.id.clone(),
            ..email
        })
    }

    pub fn to_fields(&self) -> Fields {
        fields(serde_json::to_value(self).unwrap_or_default())
    }

    /// 送信期限を過ぎた未送信レコードか
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.status == ScheduledEmailStatus::Pending && self.scheduled_for <= now
    }
}
