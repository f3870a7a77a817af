//! # PawCare ドメイン層
//!
//! ペットサービスマーケットプレイスの通知パイプラインが扱うレコードと、
//! その状態遷移ルールを定義する。
//!
//! ## 設計方針
//!
//! - **レコードはドキュメントストアの所有物**: スキーマはこのクレートが所有しない。
//!   必要なフィールドだけを寛容にデコードし、欠損は `None` として扱う
//! - **コレクションごとのタグ付き共用体**: [`record::Record`] が
//!   「通知先メールアドレス」などの揺れのあるフィールドを明示的なアクセサで解決する
//! - **ADT ベースの状態遷移**: [`status::StatusLifecycle`] で各レコード種別の遷移規則を表現する
//!
//! ## 依存関係の方向
//!
//! ```text
//! notifier → infra → domain
//!     ↘                ↑
//!       shared ────────┘ (なし)
//! ```
//!
//! ドメイン層は I/O を一切持たない。
//!
//! ## モジュール構成
//!
//! - [`collection`] - 監視対象のコレクション名
//! - [`document`] - ドキュメントとドキュメントイベント
//! - [`order`], [`appointment`], [`prescription`], [`booking`] - 各レコード
//! - [`review_request`], [`scheduled_email`] - 通知に付随して作成される派生レコード
//! - [`notification`] - 通知イベントとメールメッセージ
//! - [`status`] - ステータスと状態遷移

pub mod appointment;
pub mod booking;
pub mod clock;
pub mod collection;
pub mod document;
pub mod error;
mod lenient;
pub mod money;
pub mod notification;
pub mod order;
pub mod prescription;
pub mod record;
pub mod review_request;
pub mod scheduled_email;
pub mod status;

pub use error::DomainError;
