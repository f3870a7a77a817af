//! # 通知ユースケース
//!
//! 通知イベントのメール生成・送信・ガード管理を統合する。
//!
//! ## モジュール構成
//!
//! - [`template_renderer`] - tera テンプレートエンジンによるメール生成
//! - [`mailer`] - ガード取得 + レンダリング + 送信の統合

pub mod mailer;
pub mod template_renderer;

pub use mailer::{DeliveryOutcome, Mailer};
pub use template_renderer::TemplateRenderer;
