//! # 任意メール送信ユースケース
//!
//! 管理画面・クライアントから呼ばれる `/sendCustomEmail` と `/sendTemplateEmail` の本体。
//! ガードは使わず、呼ばれた回数だけ送信する。

use std::sync::Arc;

use pawcare_domain::notification::{EmailMessage, NotificationError, SendReceipt};
use pawcare_infra::notification::NotificationSender;
use pawcare_shared::{
    event_log::{error as log_error, event},
    log_business_event,
};
use serde::Deserialize;
use serde_json::Value;

use super::notification::TemplateRenderer;

/// 任意メール送信のエラー
#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    /// 必須項目の欠落や不正なテンプレート ID
    #[error("{0}")]
    Invalid(String),

    /// トランスポートの送信失敗
    #[error("{0}")]
    Transport(String),
}

/// CC 指定
///
/// 文字列（カンマ区切り可）と文字列配列のどちらも受け付ける。
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum CcList {
    #[default]
    None,
    One(String),
    Many(Vec<String>),
}

impl CcList {
    fn into_addresses(self) -> Vec<String> {
        let raw = match self {
            Self::None => Vec::new(),
            Self::One(s) => s.split(',').map(str::to_string).collect(),
            Self::Many(v) => v,
        };
        raw.into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

/// `/sendCustomEmail` のリクエスト
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CustomEmailRequest {
    #[serde(default)]
    pub to:      Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub html:    Option<String>,
    #[serde(default)]
    pub cc:      Option<CcList>,
}

/// `/sendTemplateEmail` のリクエスト
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateEmailRequest {
    #[serde(default)]
    pub to:                    Option<String>,
    #[serde(default)]
    pub subject:               Option<String>,
    #[serde(default)]
    pub template_id:           Option<String>,
    #[serde(default, rename = "dynamic_template_data")]
    pub dynamic_template_data: Option<Value>,
    #[serde(default)]
    pub cc:                    Option<CcList>,
}

fn required(value: Option<String>, name: &str) -> Result<String, EmailError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| EmailError::Invalid(format!("Missing required field: {name}")))
}

/// 任意メール送信ユースケース
pub struct EmailUseCaseImpl {
    sender:   Arc<dyn NotificationSender>,
    renderer: Arc<TemplateRenderer>,
}

impl EmailUseCaseImpl {
    pub fn new(sender: Arc<dyn NotificationSender>, renderer: Arc<TemplateRenderer>) -> Self {
        Self { sender, renderer }
    }

    /// 呼び出し元が用意した HTML をそのまま送る
    pub async fn send_custom(&self, request: CustomEmailRequest) -> Result<SendReceipt, EmailError> {
        let to = required(request.to, "to")?;
        let subject = required(request.subject, "subject")?;
        let html = required(request.html, "html")?;

        let email = EmailMessage {
            cc: request.cc.unwrap_or_default().into_addresses(),
            ..EmailMessage::html(to, subject, html)
        };
        self.send(email, "custom").await
    }

    /// 登録済みテンプレートを `dynamic_template_data` でレンダリングして送る
    pub async fn send_template(
        &self,
        request: TemplateEmailRequest,
    ) -> Result<SendReceipt, EmailError> {
        let to = required(request.to, "to")?;
        let subject = required(request.subject, "subject")?;
        let template_id = required(request.template_id, "templateId")?;
        if !self.renderer.has_custom_template(&template_id) {
            return Err(EmailError::Invalid(format!("Unknown templateId: {template_id}")));
        }

        let data = request.dynamic_template_data.unwrap_or(Value::Null);
        let html = self
            .renderer
            .render_custom(&template_id, &data)
            .map_err(|e| {
                tracing::error!(
                    error.category = log_error::category::INFRASTRUCTURE,
                    error.kind = log_error::kind::TEMPLATE,
                    template_id = %template_id,
                    "テンプレートレンダリングに失敗: {}",
                    e
                );
                EmailError::Transport(e.to_string())
            })?;

        let email = EmailMessage {
            cc: request.cc.unwrap_or_default().into_addresses(),
            ..EmailMessage::html(to, subject, html)
        };
        self.send(email, &template_id).await
    }

    async fn send(&self, email: EmailMessage, template: &str) -> Result<SendReceipt, EmailError> {
        match self.sender.send_email(&email).await {
            Ok(receipt) => {
                log_business_event!(
                    event.category = event::category::NOTIFICATION,
                    event.action = event::action::NOTIFICATION_SENT,
                    event.result = event::result::SUCCESS,
                    notification.kind = template,
                    notification.recipient = %email.to,
                    notification.message_id = receipt.message_id.as_deref().unwrap_or(""),
                    "メール送信成功"
                );
                Ok(receipt)
            }
            Err(e) => {
                log_business_event!(
                    event.category = event::category::NOTIFICATION,
                    event.action = event::action::NOTIFICATION_FAILED,
                    event.result = event::result::FAILURE,
                    notification.kind = template,
                    notification.recipient = %email.to,
                    error.category = log_error::category::EXTERNAL_SERVICE,
                    error.kind = log_error::kind::MAIL_TRANSPORT,
                    "メール送信失敗: {}",
                    e
                );
                let message = match e {
                    NotificationError::SendFailed(msg) | NotificationError::TemplateFailed(msg) => msg,
                };
                Err(EmailError::Transport(message))
            }
        }
    }
}
