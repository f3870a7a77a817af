//! # HTTP リクエストハンドラ
//!
//! axum のルートに対応するハンドラ関数を定義する。
//!
//! ## 設計方針
//!
//! - 各ハンドラはサブモジュールに配置
//! - 親モジュール（この `handler.rs`）で re-export し、フラットな API を提供
//! - ハンドラは薄く保ち、ロジックはユースケースに委譲
//! - メール送信エンドポイントはプレーンテキストのエラーを返し、それ以外は RFC 9457 の
//!   Problem Details を返す

pub mod dashboard;
pub mod email;
pub mod health;
pub mod record;
pub mod review;
pub mod status;

pub use dashboard::{DashboardState, get_order_summary};
pub use email::{EmailState, send_custom_email, send_template_email};
pub use health::health_check;
pub use record::{RecordState, create_appointment, create_booking, create_order, create_prescription};
pub use review::{ReviewState, list_review_requests, respond_review_request};
pub use status::{
    StatusState,
    bulk_update_order_status,
    update_appointment_status,
    update_booking_status,
    update_order_status,
};
