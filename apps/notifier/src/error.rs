//! # Notifier エラー定義
//!
//! 管理 API・レコード作成 API のエラーと、HTTP レスポンスへの変換を定義する。
//! メール送信エンドポイントはプレーンテキストで応答するため
//! [`crate::handler::email`] で個別に変換する。

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use pawcare_domain::DomainError;
use pawcare_infra::InfraError;
use pawcare_shared::{ErrorResponse, event_log::error as log_error};
use thiserror::Error;

/// Notifier で発生するエラー
#[derive(Debug, Error)]
pub enum NotifierError {
    /// リソースが見つからない
    #[error("リソースが見つかりません: {0}")]
    NotFound(String),

    /// 不正なリクエスト
    #[error("不正なリクエスト: {0}")]
    BadRequest(String),

    /// 状態遷移の競合
    #[error("競合が発生しました: {0}")]
    Conflict(String),

    /// データベースエラー
    #[error("データベースエラー: {0}")]
    Database(#[from] InfraError),

    /// 内部エラー
    #[error("内部エラー: {0}")]
    Internal(String),
}

impl From<DomainError> for NotifierError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) => Self::BadRequest(msg),
            DomainError::NotFound { .. } => Self::NotFound(err.to_string()),
            DomainError::InvalidTransition { .. } => Self::Conflict(err.to_string()),
        }
    }
}

impl NotifierError {
    /// ストアの NotFound を 404 に寄せる
    pub fn from_store(err: InfraError) -> Self {
        if err.is_not_found() {
            Self::NotFound(err.to_string())
        } else {
            Self::Database(err)
        }
    }
}

impl IntoResponse for NotifierError {
    fn into_response(self) -> Response {
        let body = match &self {
            NotifierError::NotFound(msg) => ErrorResponse::not_found(msg.clone()),
            NotifierError::BadRequest(msg) => ErrorResponse::bad_request(msg.clone()),
            NotifierError::Conflict(msg) => {
                ErrorResponse::new("invalid-transition", "Invalid Transition", 409, msg.clone())
            }
            NotifierError::Database(e) => {
                tracing::error!(
                    error.category = log_error::category::INFRASTRUCTURE,
                    error.kind = log_error::kind::DATABASE,
                    "データベースエラー: {}\n{}",
                    e,
                    e.span_trace()
                );
                ErrorResponse::internal_error()
            }
            NotifierError::Internal(msg) => {
                tracing::error!(
                    error.category = log_error::category::INFRASTRUCTURE,
                    error.kind = log_error::kind::INTERNAL,
                    "内部エラー: {}",
                    msg
                );
                ErrorResponse::internal_error()
            }
        };

        let status =
            StatusCode::from_u16(body.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(NotifierError::NotFound("注文".to_string()), StatusCode::NOT_FOUND)]
    #[case(NotifierError::BadRequest("status".to_string()), StatusCode::BAD_REQUEST)]
    #[case(NotifierError::Conflict("delivered".to_string()), StatusCode::CONFLICT)]
    #[case(NotifierError::Internal("boom".to_string()), StatusCode::INTERNAL_SERVER_ERROR)]
    fn test_エラー種別ごとのステータスコード(
        #[case] error: NotifierError,
        #[case] expected: StatusCode,
    ) {
        assert_eq!(error.into_response().status(), expected);
    }

    #[test]
    fn test_不正な遷移は409になる() {
        let err: NotifierError = DomainError::InvalidTransition {
            entity_type: "Order",
            from:        "delivered".to_string(),
            to:          "pending".to_string(),
        }
        .into();

        assert!(matches!(err, NotifierError::Conflict(_)));
    }

    #[test]
    fn test_ストアのnot_foundは404に寄せる() {
        let err = NotifierError::from_store(InfraError::not_found("orders", "o1"));

        assert!(matches!(err, NotifierError::NotFound(_)));
    }
}
