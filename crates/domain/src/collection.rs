//! # コレクション
//!
//! ドキュメントストア上のコレクション名。文字列で散らばらないよう enum に集約する。

use serde::{Deserialize, Serialize};
use strum::IntoStaticStr;

use crate::DomainError;

/// コレクション
///
/// 文字列表現はドキュメントストア上の実際のコレクション名（camelCase）。
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    IntoStaticStr,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum Collection {
    Orders,
    Appointments,
    DoctorPrescriptions,
    GroomingBookings,
    BoardingBookings,
    Products,
    ReviewRequests,
    ScheduledEmails,
}

impl Collection {
    /// コレクション名を返す
    pub fn name(self) -> &'static str {
        self.into()
    }
}

/// 予約の種類
///
/// トリミング（grooming）と預かり（boarding）は同じ予約ライフサイクルを持ち、
/// 格納先のコレクションだけが異なる。
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    IntoStaticStr,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum BookingKind {
    #[default]
    Grooming,
    Boarding,
}

impl BookingKind {
    /// 格納先のコレクション
    pub fn collection(self) -> Collection {
        match self {
            Self::Grooming => Collection::GroomingBookings,
            Self::Boarding => Collection::BoardingBookings,
        }
    }

    /// コレクションから予約種別を逆引きする
    pub fn from_collection(collection: Collection) -> Option<Self> {
        match collection {
            Collection::GroomingBookings => Some(Self::Grooming),
            Collection::BoardingBookings => Some(Self::Boarding),
            _ => None,
        }
    }

    /// メール件名・本文用の表示名
    pub fn label(self) -> &'static str {
        match self {
            Self::Grooming => "Grooming",
            Self::Boarding => "Boarding",
        }
    }

    /// パスパラメータなどの文字列からパースする
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        raw.parse()
            .map_err(|_| DomainError::Validation(format!("不正な予約種別: {raw}")))
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(Collection::Orders, "orders")]
    #[case(Collection::DoctorPrescriptions, "doctorPrescriptions")]
    #[case(Collection::GroomingBookings, "groomingBookings")]
    #[case(Collection::ReviewRequests, "reviewRequests")]
    fn test_コレクション名がストア上の名前と一致する(
        #[case] collection: Collection,
        #[case] expected: &str,
    ) {
        assert_eq!(collection.name(), expected);
        assert_eq!(Collection::from_str(expected).unwrap(), collection);
    }

    #[test]
    fn test_予約種別とコレクションが相互に変換できる() {
        for kind in [BookingKind::Grooming, BookingKind::Boarding] {
            assert_eq!(BookingKind::from_collection(kind.collection()), Some(kind));
        }
        assert_eq!(BookingKind::from_collection(Collection::Orders), None);
    }

    #[test]
    fn test_不正な予約種別はバリデーションエラー() {
        assert!(matches!(
            BookingKind::parse("daycare"),
            Err(DomainError::Validation(_))
        ));
    }
}
