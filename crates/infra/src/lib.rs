//! # PawCare インフラ層
//!
//! 外部システムとの接続・通信を担当するインフラストラクチャ層。
//!
//! ## 責務
//!
//! - **ドキュメントストア**: PostgreSQL（JSONB）上のコレクション単位のドキュメント
//! - **チェンジフィード**: 書き込み確定後のドキュメントイベント配信
//! - **メール送信**: SMTP / SES / Noop
//!
//! ## 依存関係
//!
//! ```text
//! notifier → infra → domain
//! ```
//!
//! ドメイン層はインフラ層に依存しない。
//!
//! ## モジュール構成
//!
//! - [`db`] - PostgreSQL 接続プールとマイグレーション
//! - [`document_store`] - ドキュメントストアトレイトと PostgreSQL 実装
//! - [`change_feed`] - ドキュメントイベントの配信
//! - [`notification`] - メール送信
//! - [`error`] - インフラ層エラー定義

pub mod change_feed;
pub mod db;
pub mod document_store;
pub mod error;
#[cfg(any(test, feature = "test-utils"))]
pub mod mock;
pub mod notification;

pub use change_feed::{ChangeFeed, ChangeStream};
pub use document_store::{DocumentStore, PostgresDocumentStore};
pub use error::InfraError;
