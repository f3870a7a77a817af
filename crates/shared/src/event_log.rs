//! # ビジネスイベントログ
//!
//! `jq` で調査しやすいよう、ログフィールドの命名規約とヘルパーマクロを提供する。
//!
//! [`log_business_event!`] で出力したログには `event.kind = "business_event"` が付与され、
//! `jq 'select(.["event.kind"] == "business_event")'` で抽出できる。
//!
//! ## フィールド命名規約
//!
//! ドット記法（`event.category`、`event.action`）を使用する。JSON 出力ではフラットなキーになる。

/// ビジネスイベントを構造化ログとして出力する。
///
/// `event.kind = "business_event"` マーカーを自動付与し、`tracing::info!` レベルで出力する。
///
/// ## 必須フィールド（慣例）
///
/// - `event.category`: イベントカテゴリ（[`event::category`] の定数）
/// - `event.action`: アクション名（[`event::action`] の定数）
/// - `event.result`: 結果（[`event::result`] の定数）
///
/// ## 推奨フィールド
///
/// - `event.entity_type`: エンティティ種別（[`event::entity_type`] の定数）
/// - `event.entity_id`: ドキュメント ID
#[macro_export]
macro_rules! log_business_event {
    ($($args:tt)*) => {
        ::tracing::info!(
            event.kind = "business_event",
            $($args)*
        )
    };
}

/// イベントフィールドの定数
pub mod event {
    /// イベントカテゴリ
    pub mod category {
        pub const NOTIFICATION: &str = "notification";
        pub const STATUS: &str = "status";
        pub const REVIEW: &str = "review";
    }

    /// イベントアクション
    pub mod action {
        // 通知
        pub const NOTIFICATION_SENT: &str = "notification.sent";
        pub const NOTIFICATION_FAILED: &str = "notification.failed";
        pub const NOTIFICATION_SKIPPED: &str = "notification.skipped";
        pub const ORDER_ITEM_SKIPPED: &str = "notification.order_item_skipped";
        pub const SCHEDULED_EMAIL_CREATED: &str = "notification.scheduled_email_created";

        // ステータス変更
        pub const STATUS_CHANGED: &str = "status.changed";
        pub const BULK_STATUS_CHANGED: &str = "status.bulk_changed";

        // レビュー
        pub const REVIEW_REQUESTED: &str = "review.requested";
        pub const REVIEW_RESPONDED: &str = "review.responded";
    }

    /// エンティティ種別
    pub mod entity_type {
        pub const ORDER: &str = "order";
        pub const APPOINTMENT: &str = "appointment";
        pub const PRESCRIPTION: &str = "prescription";
        pub const BOOKING: &str = "booking";
        pub const REVIEW_REQUEST: &str = "review_request";
        pub const SCHEDULED_EMAIL: &str = "scheduled_email";
    }

    /// イベント結果
    pub mod result {
        pub const SUCCESS: &str = "success";
        pub const FAILURE: &str = "failure";
        pub const SKIPPED: &str = "skipped";
    }
}

/// エラーコンテキストフィールドの定数
///
/// `tracing::error!` に `error.category` と `error.kind` を直接追加する。
pub mod error {
    /// エラーカテゴリ
    pub mod category {
        /// ドキュメントストア
        pub const INFRASTRUCTURE: &str = "infrastructure";
        /// メールトランスポート
        pub const EXTERNAL_SERVICE: &str = "external_service";
    }

    /// エラー種別
    pub mod kind {
        pub const DATABASE: &str = "database";
        pub const MAIL_TRANSPORT: &str = "mail_transport";
        pub const TEMPLATE: &str = "template";
        pub const INTERNAL: &str = "internal";
    }
}

#[cfg(test)]
mod tests {
    use std::{
        io,
        sync::{Arc, Mutex},
    };

    use tracing_subscriber::fmt::MakeWriter;

    use super::event;

    #[derive(Clone, Default)]
    struct Buffer(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Buffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for Buffer {
        type Writer = Buffer;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    #[test]
    fn test_business_eventマーカーが付与される() {
        let buffer = Buffer::default();
        let subscriber = tracing_subscriber::fmt()
            .json()
            .flatten_event(true)
            .with_writer(buffer.clone())
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            crate::log_business_event!(
                event.category = event::category::NOTIFICATION,
                event.action = event::action::NOTIFICATION_SENT,
                event.result = event::result::SUCCESS,
                "通知を送信"
            );
        });

        let output = String::from_utf8(buffer.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains(r#""event.kind":"business_event""#));
        assert!(output.contains(r#""event.action":"notification.sent""#));
    }
}
