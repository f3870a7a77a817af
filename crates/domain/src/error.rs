//! # ドメイン層エラー定義
//!
//! ビジネスルール違反を表現するエラー型。
//!
//! ## エラーの種類と HTTP ステータスの対応
//!
//! | エラー種別 | HTTP ステータス | 用途 |
//! |-----------|----------------|------|
//! | `Validation` | 400 Bad Request | 不正なステータス値、必須項目の欠落 |
//! | `NotFound` | 404 Not Found | レコードが存在しない |
//! | `InvalidTransition` | 409 Conflict | 状態遷移規則に反する変更 |

use thiserror::Error;

/// ドメイン層で発生するエラー
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    /// バリデーションエラー
    #[error("バリデーションエラー: {0}")]
    Validation(String),

    /// レコードが見つからない
    #[error("{entity_type} が見つかりません: {id}")]
    NotFound {
        /// レコードの種類（"Order", "Booking" など）
        entity_type: &'static str,
        /// 検索に使用した識別子
        id:          String,
    },

    /// 状態遷移規則違反
    ///
    /// 例: `delivered` の注文を `cancelled` に戻そうとした。
    #[error("{entity_type} のステータスを {from} から {to} に変更できません")]
    InvalidTransition {
        entity_type: &'static str,
        from:        String,
        to:          String,
    },
}
