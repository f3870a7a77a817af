//! # 通知
//!
//! メール通知に関するドメインモデルを定義する。
//!
//! ## ドメイン用語
//!
//! | 型 | ドメイン用語 | 説明 |
//! |---|------------|------|
//! | [`Notification`] | 通知イベント | 1 通のメールに対応する。受信者とレコードを保持する |
//! | [`NotificationKind`] | 通知種別 | テンプレート名とガードフィールドを決める |
//! | [`EmailMessage`] | メールメッセージ | テンプレートレンダリングの出力 |
//!
//! ## 設計方針
//!
//! - **通知ごとに 1 つのガードフィールド**: 送信前に [`Notification::guard_target`] の
//!   ドキュメントへ [`NotificationKind::guard_field`] を条件付きで書き込み、
//!   書き込めた呼び出しだけが送信する
//! - **テンプレート分離**: 通知イベントとメール生成は分離（TemplateRenderer は notifier）

use serde::{Deserialize, Serialize};
use strum::IntoStaticStr;
use thiserror::Error;

use crate::{
    appointment::Appointment,
    booking::Booking,
    collection::Collection,
    order::{Order, OrderLine},
    prescription::Prescription,
    scheduled_email::ScheduledEmail,
    status::{BookingStatus, OrderStatus},
};

/// 通知送信エラー
#[derive(Debug, Error)]
pub enum NotificationError {
    /// メール送信に失敗
    #[error("メール送信に失敗: {0}")]
    SendFailed(String),

    /// テンプレートレンダリングに失敗
    #[error("テンプレートレンダリングに失敗: {0}")]
    TemplateFailed(String),
}

/// 通知種別
///
/// snake_case の文字列表現がそのままテンプレート名になる。
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
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum NotificationKind {
    OrderPlaced,
    NewOrderAlert,
    OrderConfirmed,
    OrderDispatched,
    OrderDelivered,
    OrderCancelled,
    AppointmentBooked,
    AppointmentConfirmed,
    AppointmentCompleted,
    PrescriptionAvailable,
    BookingConfirmed,
    BookingCompleted,
    BookingCancelled,
    BookingRatingReminder,
}

impl NotificationKind {
    /// 送信済みを示すガードフィールド名
    ///
    /// 書き込み先のドキュメントは通知ごとに異なる（[`Notification::guard_target`]）。
    pub fn guard_field(self) -> &'static str {
        match self {
            Self::OrderPlaced => "orderPlacedEmailSent",
            Self::NewOrderAlert => "businessAlertSent",
            Self::OrderConfirmed => "confirmedEmailSent",
            Self::OrderDispatched => "dispatchedEmailSent",
            Self::OrderDelivered => "deliveredEmailSent",
            Self::OrderCancelled => "cancelledEmailSent",
            Self::AppointmentBooked => "appointmentCreatedEmailSent",
            Self::AppointmentConfirmed | Self::BookingConfirmed => "confirmationEmailSent",
            Self::AppointmentCompleted | Self::BookingCompleted => "completionEmailSent",
            Self::PrescriptionAvailable => "notificationSent",
            Self::BookingCancelled => "cancellationEmailSent",
            Self::BookingRatingReminder => "dispatchClaimed",
        }
    }
}

/// 注文ステータス変更の通知対象
///
/// `pending` への変更はメールを送らない。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatusNotice {
    Confirmed,
    Dispatched,
    Delivered,
    Cancelled,
}

impl OrderStatusNotice {
    pub fn from_status(status: OrderStatus) -> Option<Self> {
        match status {
            OrderStatus::Pending => None,
            OrderStatus::Confirmed => Some(Self::Confirmed),
            OrderStatus::Dispatched => Some(Self::Dispatched),
            OrderStatus::Delivered => Some(Self::Delivered),
            OrderStatus::Cancelled => Some(Self::Cancelled),
        }
    }

    pub fn kind(self) -> NotificationKind {
        match self {
            Self::Confirmed => NotificationKind::OrderConfirmed,
            Self::Dispatched => NotificationKind::OrderDispatched,
            Self::Delivered => NotificationKind::OrderDelivered,
            Self::Cancelled => NotificationKind::OrderCancelled,
        }
    }
}

/// 予約ステータス変更の通知対象
///
/// `arrived` と `pending` はメールを送らない。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingStatusNotice {
    Confirmed,
    Completed,
    Cancelled,
}

impl BookingStatusNotice {
    pub fn from_status(status: BookingStatus) -> Option<Self> {
        match status {
            BookingStatus::Pending | BookingStatus::Arrived => None,
            BookingStatus::Confirmed => Some(Self::Confirmed),
            BookingStatus::Completed => Some(Self::Completed),
            BookingStatus::Cancelled => Some(Self::Cancelled),
        }
    }
}

/// メールメッセージ
///
/// テンプレートレンダリングの出力。NotificationSender に渡される。
#[derive(Debug, Clone, PartialEq)]
pub struct EmailMessage {
    /// 送信先メールアドレス
    pub to:        String,
    /// CC
    pub cc:        Vec<String>,
    /// 件名
    pub subject:   String,
    /// HTML 本文
    pub html_body: String,
    /// プレーンテキスト本文（無い場合は HTML のみ送る）
    pub text_body: Option<String>,
}

impl EmailMessage {
    /// HTML 本文のみのメッセージ
    pub fn html(to: impl Into<String>, subject: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            to:        to.into(),
            cc:        Vec::new(),
            subject:   subject.into(),
            html_body: html.into(),
            text_body: None,
        }
    }
}

/// 送信結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SendReceipt {
    /// トランスポートが採番したメッセージ ID
    pub message_id: Option<String>,
    /// トランスポートの応答（SMTP の応答行など）
    pub response:   String,
}

/// 通知イベント
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    /// 注文受付: 顧客に送信
    OrderPlaced {
        recipient: String,
        order:     Order,
        lines:     Vec<OrderLine>,
    },
    /// 新規注文アラート: 事業者アドレスに送信
    NewOrderAlert {
        recipient: String,
        order:     Order,
        lines:     Vec<OrderLine>,
    },
    /// 注文ステータス変更: 顧客に送信
    OrderStatusChanged {
        recipient: String,
        notice:    OrderStatusNotice,
        order:     Order,
    },
    AppointmentBooked {
        recipient:   String,
        appointment: Appointment,
    },
    AppointmentConfirmed {
        recipient:   String,
        appointment: Appointment,
    },
    AppointmentCompleted {
        recipient:   String,
        appointment: Appointment,
    },
    /// 処方箋発行: 親の診察予約の患者に送信
    PrescriptionAvailable {
        recipient:    String,
        prescription: Prescription,
        appointment:  Appointment,
    },
    BookingConfirmed {
        recipient: String,
        booking:   Booking,
    },
    /// 予約完了: レビューリンクを含む
    BookingCompleted {
        recipient: String,
        booking:   Booking,
    },
    BookingCancelled {
        recipient: String,
        booking:   Booking,
    },
    /// 利用体験の評価依頼: 予約送信メールから送る
    BookingRatingReminder {
        recipient: String,
        scheduled: ScheduledEmail,
    },
}

impl Notification {
    /// 予約ステータス変更から通知を作る
    pub fn for_booking(notice: BookingStatusNotice, recipient: String, booking: Booking) -> Self {
        match notice {
            BookingStatusNotice::Confirmed => Self::BookingConfirmed { recipient, booking },
            BookingStatusNotice::Completed => Self::BookingCompleted { recipient, booking },
            BookingStatusNotice::Cancelled => Self::BookingCancelled { recipient, booking },
        }
    }

    /// 通知種別を返す
    pub fn kind(&self) -> NotificationKind {
        match self {
            Self::OrderPlaced { .. } => NotificationKind::OrderPlaced,
            Self::NewOrderAlert { .. } => NotificationKind::NewOrderAlert,
            Self::OrderStatusChanged { notice, .. } => notice.kind(),
            Self::AppointmentBooked { .. } => NotificationKind::AppointmentBooked,
            Self::AppointmentConfirmed { .. } => NotificationKind::AppointmentConfirmed,
            Self::AppointmentCompleted { .. } => NotificationKind::AppointmentCompleted,
            Self::PrescriptionAvailable { .. } => NotificationKind::PrescriptionAvailable,
            Self::BookingConfirmed { .. } => NotificationKind::BookingConfirmed,
            Self::BookingCompleted { .. } => NotificationKind::BookingCompleted,
            Self::BookingCancelled { .. } => NotificationKind::BookingCancelled,
            Self::BookingRatingReminder { .. } => NotificationKind::BookingRatingReminder,
        }
    }

    /// 受信者のメールアドレスを返す
    pub fn recipient_email(&self) -> &str {
        match self {
            Self::OrderPlaced { recipient, .. }
            | Self::NewOrderAlert { recipient, .. }
            | Self::OrderStatusChanged { recipient, .. }
            | Self::AppointmentBooked { recipient, .. }
            | Self::AppointmentConfirmed { recipient, .. }
            | Self::AppointmentCompleted { recipient, .. }
            | Self::PrescriptionAvailable { recipient, .. }
            | Self::BookingConfirmed { recipient, .. }
            | Self::BookingCompleted { recipient, .. }
            | Self::BookingCancelled { recipient, .. }
            | Self::BookingRatingReminder { recipient, .. } => recipient,
        }
    }

    /// ガードフィールドを書き込むドキュメント
    pub fn guard_target(&self) -> (Collection, &str) {
        match self {
            Self::OrderPlaced { order, .. }
            | Self::NewOrderAlert { order, .. }
            | Self::OrderStatusChanged { order, .. } => (Collection::Orders, &order.id),
            Self::AppointmentBooked { appointment, .. }
            | Self::AppointmentConfirmed { appointment, .. }
            | Self::AppointmentCompleted { appointment, .. } => {
                (Collection::Appointments, &appointment.id)
            }
            Self::PrescriptionAvailable { prescription, .. } => {
                (Collection::DoctorPrescriptions, &prescription.id)
            }
            Self::BookingConfirmed { booking, .. }
            | Self::BookingCompleted { booking, .. }
            | Self::BookingCancelled { booking, .. } => (booking.kind.collection(), &booking.id),
            Self::BookingRatingReminder { scheduled, .. } => {
                (Collection::ScheduledEmails, &scheduled.id)
            }
        }
    }

    /// ガードフィールド名
    pub fn guard_field(&self) -> &'static str {
        self.kind().guard_field()
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;
    use crate::collection::BookingKind;

    #[test]
    fn notification_kind_の文字列変換が正しい() {
        assert_eq!(NotificationKind::OrderPlaced.to_string(), "order_placed");
        assert_eq!(
            NotificationKind::BookingRatingReminder.to_string(),
            "booking_rating_reminder"
        );
        assert_eq!(
            NotificationKind::from_str("new_order_alert").unwrap(),
            NotificationKind::NewOrderAlert
        );
    }

    #[rstest]
    #[case(OrderStatus::Pending, None)]
    #[case(OrderStatus::Confirmed, Some("confirmedEmailSent"))]
    #[case(OrderStatus::Dispatched, Some("dispatchedEmailSent"))]
    #[case(OrderStatus::Delivered, Some("deliveredEmailSent"))]
    #[case(OrderStatus::Cancelled, Some("cancelledEmailSent"))]
    fn 注文ステータスごとのガードフィールド(
        #[case] status: OrderStatus,
        #[case] expected: Option<&str>,
    ) {
        let guard = OrderStatusNotice::from_status(status).map(|n| n.kind().guard_field());

        assert_eq!(guard, expected);
    }

    #[test]
    fn 予約の到着はメールを送らない() {
        assert_eq!(BookingStatusNotice::from_status(BookingStatus::Arrived), None);
        assert_eq!(BookingStatusNotice::from_status(BookingStatus::Pending), None);
    }

    #[test]
    fn 予約通知のガード先は予約種別のコレクション() {
        let booking = Booking {
            id: "bk-1".to_string(),
            kind: BookingKind::Boarding,
            ..Default::default()
        };
        let notification = Notification::for_booking(
            BookingStatusNotice::Cancelled,
            "owner@example.com".to_string(),
            booking,
        );

        assert_eq!(notification.kind(), NotificationKind::BookingCancelled);
        assert_eq!(
            notification.guard_target(),
            (Collection::BoardingBookings, "bk-1")
        );
        assert_eq!(notification.guard_field(), "cancellationEmailSent");
        assert_eq!(notification.recipient_email(), "owner@example.com");
    }

    #[test]
    fn 注文受付と事業者アラートは別々のガードを持つ() {
        let order = Order {
            id: "abc123".to_string(),
            ..Default::default()
        };
        let placed = Notification::OrderPlaced {
            recipient: "a@b.com".to_string(),
            order:     order.clone(),
            lines:     Vec::new(),
        };
        let alert = Notification::NewOrderAlert {
            recipient: "ops@example.com".to_string(),
            order,
            lines: Vec::new(),
        };

        assert_eq!(placed.guard_target(), alert.guard_target());
        assert_ne!(placed.guard_field(), alert.guard_field());
    }
}
