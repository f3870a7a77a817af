//! # 予約（トリミング・預かり）
//!
//! `groomingBookings` / `boardingBookings` コレクション。
//! 両者は同じ構造を持ち、[`BookingKind`] で区別する。
//!
//! 日付は書き込み元で名前が揺れる。
//!
//! | アクセサ | 優先 | フォールバック |
//! |---------|------|---------------|
//! | [`Booking::check_in`] | `dateFrom` | `date` |
//! | [`Booking::check_out`] | `dateTo` | `time` |

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;

use crate::{
    collection::BookingKind,
    document::Document,
    lenient::{opt_f64, opt_string},
    status::{BookingStatus, parse_status},
};

/// 予約
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Booking {
    #[serde(skip)]
    pub id:          String,
    #[serde(skip)]
    pub kind:        BookingKind,
    #[serde(deserialize_with = "opt_string")]
    pub status:      Option<String>,
    #[serde(deserialize_with = "opt_string")]
    pub user_email:  Option<String>,
    #[serde(deserialize_with = "opt_string")]
    pub user_name:   Option<String>,
    #[serde(deserialize_with = "opt_string")]
    pub center_id:   Option<String>,
    #[serde(deserialize_with = "opt_string")]
    pub center_name: Option<String>,
    #[serde(deserialize_with = "opt_string")]
    pub date_from:   Option<String>,
    #[serde(deserialize_with = "opt_string")]
    pub date:        Option<String>,
    #[serde(deserialize_with = "opt_string")]
    pub date_to:     Option<String>,
    #[serde(deserialize_with = "opt_string")]
    pub time:        Option<String>,
    #[serde(deserialize_with = "opt_string")]
    pub pet_name:    Option<String>,
    #[serde(deserialize_with = "opt_string")]
    pub pet_type:    Option<String>,
    #[serde(deserialize_with = "opt_string")]
    pub pet_breed:   Option<String>,
    #[serde(deserialize_with = "opt_string")]
    pub service:     Option<String>,
    #[serde(deserialize_with = "opt_f64")]
    pub total_cost:  Option<f64>,
}

impl Booking {
    pub fn from_document(kind: BookingKind, document: &Document) -> Self {
        Self {
            id: document.id.clone(),
            kind,
            ..crate::record::decode_fields(document)
        }
    }

    /// 通知先メールアドレス
    pub fn contact_email(&self) -> Option<&str> {
        self.user_email.as_deref()
    }

    pub fn status(&self) -> Option<BookingStatus> {
        self.status.as_deref().and_then(parse_status)
    }

    /// チェックイン日（預かり）または予約日（トリミング）
    pub fn check_in(&self) -> Option<&str> {
        self.date_from.as_deref().or(self.date.as_deref())
    }

    /// チェックアウト日（預かり）または予約時刻（トリミング）
    pub fn check_out(&self) -> Option<&str> {
        self.date_to.as_deref().or(self.time.as_deref())
    }

    /// チェックイン日時
    ///
    /// RFC 3339 の日時、または `YYYY-MM-DD`（UTC の 0 時とみなす）を受け付ける。
    pub fn check_in_at(&self) -> Option<DateTime<Utc>> {
        let raw = self.check_in()?;
        if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
            return Some(at.with_timezone(&Utc));
        }
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|naive| naive.and_utc())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::document::fields;

    fn booking(data: serde_json::Value) -> Booking {
        Booking::from_document(BookingKind::Boarding, &Document::new("b1", fields(data)))
    }

    #[test]
    fn test_チェックイン日はdate_fromを優先しdateにフォールバックする() {
        assert_eq!(
            booking(json!({"dateFrom": "2026-03-01", "date": "2026-02-01"})).check_in(),
            Some("2026-03-01")
        );
        assert_eq!(
            booking(json!({"date": "2026-02-01", "time": "10:30"})).check_in(),
            Some("2026-02-01")
        );
        assert_eq!(booking(json!({"time": "10:30"})).check_out(), Some("10:30"));
    }

    #[test]
    fn test_日付のみのチェックインはutcの0時() {
        let at = booking(json!({"dateFrom": "2026-03-01"})).check_in_at().unwrap();

        assert_eq!(at.to_rfc3339(), "2026-03-01T00:00:00+00:00");
    }

    #[test]
    fn test_rfc3339のチェックインはutcに変換される() {
        let at = booking(json!({"dateFrom": "2026-03-01T10:00:00+05:30"}))
            .check_in_at()
            .unwrap();

        assert_eq!(at.to_rfc3339(), "2026-03-01T04:30:00+00:00");
    }

    #[test]
    fn test_解釈できないチェックインはnone() {
        assert_eq!(booking(json!({"dateFrom": "next monday"})).check_in_at(), None);
        assert_eq!(booking(json!({})).check_in_at(), None);
    }

    #[test]
    fn test_予約種別はデコード時に与えたもの() {
        let b = booking(json!({"status": "arrived", "totalCost": "1250.5"}));

        assert_eq!(b.kind, BookingKind::Boarding);
        assert_eq!(b.status(), Some(BookingStatus::Arrived));
        assert_eq!(b.total_cost, Some(1250.5));
    }
}
