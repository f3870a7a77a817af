//! # メール送信ハンドラ
//!
//! ブラウザのクライアントから直接呼ばれる送信エンドポイント。
//!
//! ```text
//! POST /sendCustomEmail    {to, subject, html, cc?}
//! POST /sendTemplateEmail  {to, subject, templateId, dynamic_template_data?, cc?}
//! ```
//!
//! 応答コードは 200 / 400 / 405 / 500 のみ。エラー本文はプレーンテキスト。
//! 405 はルーターが `post` 以外のメソッドに対して返す。

use std::sync::Arc;

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use pawcare_domain::notification::SendReceipt;
use serde::{Serialize, de::DeserializeOwned};

use crate::usecase::{CustomEmailRequest, EmailError, EmailUseCaseImpl, TemplateEmailRequest};

/// メール送信ハンドラーの State
pub struct EmailState {
    pub usecase: EmailUseCaseImpl,
}

/// 送信成功レスポンス
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendEmailResponse {
    pub success:    bool,
    pub message_id: Option<String>,
    pub response:   String,
}

impl From<SendReceipt> for SendEmailResponse {
    fn from(receipt: SendReceipt) -> Self {
        Self {
            success:    true,
            message_id: receipt.message_id,
            response:   receipt.response,
        }
    }
}

impl IntoResponse for EmailError {
    fn into_response(self) -> Response {
        let status = match self {
            EmailError::Invalid(_) => StatusCode::BAD_REQUEST,
            EmailError::Transport(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, self.to_string()).into_response()
    }
}

/// 本文を JSON として読む
///
/// `Json` エクストラクタは Content-Type を要求し独自のエラー本文を返すため、文字列で受けて解釈する。
fn parse_body<T: DeserializeOwned>(body: &str) -> Result<T, EmailError> {
    serde_json::from_str(body).map_err(|e| EmailError::Invalid(format!("Invalid JSON body: {e}")))
}

/// カスタムメールを送信する
#[tracing::instrument(skip_all)]
pub async fn send_custom_email(
    State(state): State<Arc<EmailState>>,
    body: String,
) -> Result<Json<SendEmailResponse>, EmailError> {
    let request: CustomEmailRequest = parse_body(&body)?;
    let receipt = state.usecase.send_custom(request).await?;
    Ok(Json(receipt.into()))
}

/// テンプレートメールを送信する
#[tracing::instrument(skip_all)]
pub async fn send_template_email(
    State(state): State<Arc<EmailState>>,
    body: String,
) -> Result<Json<SendEmailResponse>, EmailError> {
    let request: TemplateEmailRequest = parse_body(&body)?;
    let receipt = state.usecase.send_template(request).await?;
    Ok(Json(receipt.into()))
}
