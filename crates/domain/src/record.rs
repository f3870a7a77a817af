//! # レコード
//!
//! 通知の起点になるコレクションのドキュメントを、コレクションごとのバリアントに
//! デコードしたタグ付き共用体。
//!
//! 「通知先メールアドレス」はコレクションごとにフィールド名が異なる
//! （`customerEmail` / `userEmail` / `patientEmail`）。呼び出し側が生のマップを
//! 探索せずに済むよう、[`Record::contact_email`] で解決する。

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{
    appointment::Appointment,
    booking::Booking,
    collection::{BookingKind, Collection},
    document::Document,
    order::Order,
    prescription::Prescription,
};

/// 通知の起点になるレコード
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    Order(Order),
    Appointment(Appointment),
    Prescription(Prescription),
    Booking(Booking),
}

impl Record {
    /// コレクションに応じてデコードする
    ///
    /// 通知の起点にならないコレクション（`products` など）は `None`。
    pub fn decode(collection: Collection, document: &Document) -> Option<Self> {
        match collection {
            Collection::Orders => Some(Self::Order(Order::from_document(document))),
            Collection::Appointments => {
                Some(Self::Appointment(Appointment::from_document(document)))
            }
            Collection::DoctorPrescriptions => {
                Some(Self::Prescription(Prescription::from_document(document)))
            }
            Collection::GroomingBookings | Collection::BoardingBookings => {
                BookingKind::from_collection(collection)
                    .map(|kind| Self::Booking(Booking::from_document(kind, document)))
            }
            Collection::Products | Collection::ReviewRequests | Collection::ScheduledEmails => None,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Self::Order(o) => &o.id,
            Self::Appointment(a) => &a.id,
            Self::Prescription(p) => &p.id,
            Self::Booking(b) => &b.id,
        }
    }

    /// 通知先メールアドレス
    ///
    /// 処方箋は自身に連絡先を持たない（親の診察予約から解決する）ため `None`。
    pub fn contact_email(&self) -> Option<&str> {
        match self {
            Self::Order(o) => o.contact_email(),
            Self::Appointment(a) => a.contact_email(),
            Self::Prescription(_) => None,
            Self::Booking(b) => b.contact_email(),
        }
    }

    /// 生のステータス文字列
    pub fn raw_status(&self) -> Option<&str> {
        match self {
            Self::Order(o) => o.status.as_deref(),
            Self::Appointment(a) => a.status.as_deref(),
            Self::Prescription(_) => None,
            Self::Booking(b) => b.status.as_deref(),
        }
    }
}

/// ドキュメントのフィールドを寛容にデコードする
///
/// デコードに失敗した場合は既定値を返す。
pub(crate) fn decode_fields<T>(document: &Document) -> T
where
    T: DeserializeOwned + Default,
{
    serde_json::from_value(Value::Object(document.data.clone())).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    use super::*;
    use crate::document::fields;

    #[rstest]
    #[case(Collection::Orders, json!({"customerEmail": "c@example.com", "userEmail": "u@example.com"}), Some("c@example.com"))]
    #[case(Collection::Orders, json!({"userEmail": "u@example.com"}), Some("u@example.com"))]
    #[case(Collection::Appointments, json!({"patientEmail": "p@example.com", "userEmail": "u@example.com"}), Some("p@example.com"))]
    #[case(Collection::GroomingBookings, json!({"userEmail": "u@example.com"}), Some("u@example.com"))]
    #[case(Collection::BoardingBookings, json!({"customerEmail": "c@example.com"}), None)]
    #[case(Collection::DoctorPrescriptions, json!({"patientEmail": "p@example.com"}), None)]
    fn test_コレクションごとに通知先を解決する(
        #[case] collection: Collection,
        #[case] data: Value,
        #[case] expected: Option<&str>,
    ) {
        let record = Record::decode(collection, &Document::new("r1", fields(data))).unwrap();

        assert_eq!(record.contact_email(), expected);
        assert_eq!(record.id(), "r1");
    }

    #[test]
    fn test_通知の起点にならないコレクションはデコードしない() {
        let document = Document::new("p1", fields(json!({"name": "Leash"})));

        assert_eq!(Record::decode(Collection::Products, &document), None);
    }

    #[test]
    fn test_予約はコレクションから種別が決まる() {
        let document = Document::new("b1", fields(json!({"status": "confirmed"})));

        let Some(Record::Booking(booking)) = Record::decode(Collection::BoardingBookings, &document)
        else {
            panic!("予約としてデコードされるべき");
        };
        assert_eq!(booking.kind, BookingKind::Boarding);
        assert_eq!(Record::Booking(booking).raw_status(), Some("confirmed"));
    }
}
