//! # 通知送信
//!
//! メール通知の送信を担当するインフラストラクチャモジュール。
//!
//! ## 設計方針
//!
//! - **trait による抽象化**: `NotificationSender` trait でメール送信を抽象化
//! - **3 つの実装**: SMTP（メールアカウント / Mailpit）、SES（本番用）、Noop（ログのみ）
//! - **起動時に 1 つだけ構築**: `NOTIFICATION_BACKEND` で選んだ実装を `Arc` で各コンポーネントに渡す

mod noop;
mod ses;
mod smtp;

use async_trait::async_trait;
pub use noop::NoopNotificationSender;
use pawcare_domain::notification::{EmailMessage, NotificationError, SendReceipt};
pub use ses::SesNotificationSender;
pub use smtp::{SmtpNotificationSender, SmtpSettings};

/// メール送信トレイト
#[async_trait]
pub trait NotificationSender: Send + Sync {
    /// メールを送信する
    ///
    /// 成功時はトランスポートのメッセージ ID と応答を返す。
    async fn send_email(&self, email: &EmailMessage) -> Result<SendReceipt, NotificationError>;
}
