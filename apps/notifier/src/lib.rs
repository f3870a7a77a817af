//! # PawCare Notifier ライブラリ
//!
//! ペット用品の注文・診察予約・処方箋・トリミング/預かり予約のステータス遷移に応じて
//! 顧客と事業者へメールを送るサービス。
//!
//! 統合テストから Router・ユースケースを利用できるようにライブラリとして公開する。
//!
//! ## モジュール構成
//!
//! - [`app_builder`] - State とルーターの組み立て
//! - [`config`] - 環境変数からの設定読み込み
//! - [`error`] - API エラーと HTTP レスポンスへの変換
//! - [`handler`] - HTTP ハンドラ
//! - [`usecase`] - トリガー・ステータス変更・スイーパーなどのビジネスロジック

pub mod app_builder;
pub mod config;
pub mod error;
pub mod handler;
pub mod usecase;
