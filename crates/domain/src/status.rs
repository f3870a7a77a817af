//! # ステータスと状態遷移
//!
//! 注文・予約・診察予約のステータスと、その遷移規則を定義する。
//!
//! ## 状態遷移
//!
//! ```text
//! Order:        pending → confirmed → dispatched → delivered
//!                  └──────────┴───────────┴──→ cancelled
//!
//! Booking:      pending → confirmed → arrived → completed
//!                  │          └─────────────────↗
//!                  └──────────┴──→ cancelled
//!
//! Appointment:  pending → confirmed → completed
//!                  └──────────┴──→ cancelled
//! ```
//!
//! `delivered` / `completed` / `cancelled` は終端状態。
//!
//! ## 設計方針
//!
//! - ドキュメントに保存される文字列は小文字。未知の値は [`parse_status`] が `None` を返し、
//!   通知レイヤーでは「何もしない」として扱う
//! - 遷移規則は [`StatusLifecycle::can_transition_to`] に集約し、
//!   単体更新と一括更新で同じ判定を使う

use serde::{Deserialize, Serialize};
use strum::IntoStaticStr;

use crate::DomainError;

/// ステータス共通の振る舞い
pub trait StatusLifecycle:
    Copy + Eq + std::fmt::Display + std::str::FromStr + Into<&'static str>
{
    /// エラーメッセージ等で使うレコード種別名
    const ENTITY_TYPE: &'static str;

    /// `self` から `next` への遷移が許可されているか
    fn can_transition_to(self, next: Self) -> bool;

    /// 終端状態か
    fn is_terminal(self) -> bool;

    /// 文字列表現
    fn as_str(self) -> &'static str {
        self.into()
    }

    /// 遷移を検証する
    ///
    /// 同一ステータスへの変更は「変更なし」として呼び出し側で扱うため、ここでは拒否する。
    fn ensure_transition(self, next: Self) -> Result<(), DomainError> {
        if self.can_transition_to(next) {
            Ok(())
        } else {
            Err(DomainError::InvalidTransition {
                entity_type: Self::ENTITY_TYPE,
                from:        self.to_string(),
                to:          next.to_string(),
            })
        }
    }
}

/// 文字列をステータスにパースする。未知の値は `None`
pub fn parse_status<S: StatusLifecycle>(raw: &str) -> Option<S> {
    raw.trim().parse::<S>().ok()
}

/// API 入力のステータスを検証付きでパースする
pub fn require_status<S: StatusLifecycle>(raw: &str) -> Result<S, DomainError> {
    parse_status(raw).ok_or_else(|| {
        DomainError::Validation(format!("{} の不正なステータス: {raw}", S::ENTITY_TYPE))
    })
}

/// 注文ステータス
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    IntoStaticStr,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Dispatched,
    Delivered,
    Cancelled,
}

impl StatusLifecycle for OrderStatus {
    const ENTITY_TYPE: &'static str = "Order";

    fn can_transition_to(self, next: Self) -> bool {
        use OrderStatus::*;
        matches!(
            (self, next),
            (Pending, Confirmed)
                | (Confirmed, Dispatched)
                | (Dispatched, Delivered)
                | (Pending | Confirmed | Dispatched, Cancelled)
        )
    }

    fn is_terminal(self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }
}

/// 予約（トリミング・預かり）ステータス
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    IntoStaticStr,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Arrived,
    Completed,
    Cancelled,
}

impl StatusLifecycle for BookingStatus {
    const ENTITY_TYPE: &'static str = "Booking";

    fn can_transition_to(self, next: Self) -> bool {
        use BookingStatus::*;
        matches!(
            (self, next),
            (Pending, Confirmed)
                | (Confirmed, Arrived)
                | (Confirmed | Arrived, Completed)
                | (Pending | Confirmed, Cancelled)
        )
    }

    fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

/// 診察予約ステータス
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    IntoStaticStr,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

impl StatusLifecycle for AppointmentStatus {
    const ENTITY_TYPE: &'static str = "Appointment";

    fn can_transition_to(self, next: Self) -> bool {
        use AppointmentStatus::*;
        matches!(
            (self, next),
            (Pending, Confirmed) | (Confirmed, Completed) | (Pending | Confirmed, Cancelled)
        )
    }

    fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}
