//! # ユースケース層
//!
//! Notifier のビジネスロジックを実装する。
//!
//! ## 設計方針
//!
//! - **依存性注入**: ドキュメントストアとメール送信を `Arc<dyn Trait>` で外部から注入
//! - **薄いハンドラ**: ハンドラは薄く保ち、ロジックはユースケースに集約
//! - **送信はトリガーだけが行う**: ステータス変更はドキュメントを書き換えるだけで、
//!   メールはチェンジフィード経由のトリガーが送る
//!
//! ## モジュール構成
//!
//! - `notification`: テンプレートレンダリングとガード付き配信
//! - `trigger`: ドキュメントイベントから通知を起こす
//! - `status`: 管理画面からのステータス変更
//! - `record`: 顧客向けのレコード作成
//! - `review`: レビュー依頼
//! - `dashboard`: 注文の集計
//! - `sweeper`: 予約送信メールの周期送信
//! - `email`: 任意メール送信

pub mod dashboard;
pub mod email;
pub mod notification;
pub mod record;
pub mod review;
pub mod status;
pub mod sweeper;
pub mod trigger;

pub use dashboard::{DashboardUseCaseImpl, OrderSummary};
pub use email::{CustomEmailRequest, EmailError, EmailUseCaseImpl, TemplateEmailRequest};
pub use notification::{DeliveryOutcome, Mailer, TemplateRenderer};
pub use record::{NewRecord, RecordUseCaseImpl};
pub use review::ReviewUseCaseImpl;
pub use status::{BulkStatusReport, StatusChangeOutcome, StatusUseCaseImpl};
pub use sweeper::{ScheduledEmailSweeper, SweepReport};
pub use trigger::{NotificationTriggers, TriggerDispatcher};
