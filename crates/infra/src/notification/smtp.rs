//! SMTP 通知送信実装
//!
//! lettre の `AsyncSmtpTransport` を使用してメールを送信する。
//! 本番ではメールアカウントの SMTP リレー（STARTTLS + 認証）、
//! 開発環境では Mailpit（TLS なし）に接続する。

use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport,
    AsyncTransport,
    Tokio1Executor,
    message::{Mailbox, Message, MultiPart, SinglePart, header::ContentType},
    transport::smtp::authentication::Credentials,
};
use pawcare_domain::notification::{EmailMessage, NotificationError, SendReceipt};
use uuid::Uuid;

use super::NotificationSender;

/// SMTP 接続設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpSettings {
    pub host:     String,
    pub port:     u16,
    pub username: Option<String>,
    pub password: Option<String>,
    /// `false` の場合は TLS なしで接続する（Mailpit 等）
    pub tls:      bool,
}

/// SMTP 通知送信
///
/// `lettre::AsyncSmtpTransport<Tokio1Executor>` をラップする。
pub struct SmtpNotificationSender {
    transport:    AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
}

impl SmtpNotificationSender {
    /// 新しい SMTP 送信インスタンスを作成
    ///
    /// # 引数
    ///
    /// - `settings`: 接続先と認証情報
    /// - `from_address`: 送信元メールアドレス
    pub fn new(settings: &SmtpSettings, from_address: String) -> Result<Self, NotificationError> {
        let builder = if settings.tls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host)
                .map_err(|e| NotificationError::SendFailed(format!("SMTP リレー設定失敗: {e}")))?
        } else {
            // builder_dangerous: TLS なしで接続（Mailpit 等のローカル SMTP 向け）
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&settings.host)
        };
        let builder = builder.port(settings.port);
        let builder = match (&settings.username, &settings.password) {
            (Some(username), Some(password)) => {
                builder.credentials(Credentials::new(username.clone(), password.clone()))
            }
            _ => builder,
        };

        Ok(Self {
            transport: builder.build(),
            from_address,
        })
    }

    fn build_message(
        &self,
        email: &EmailMessage,
        message_id: &str,
    ) -> Result<Message, NotificationError> {
        let from: Mailbox = self
            .from_address
            .parse()
            .map_err(|e| NotificationError::SendFailed(format!("送信元アドレス不正: {e}")))?;
        let to: Mailbox = email
            .to
            .parse()
            .map_err(|e| NotificationError::SendFailed(format!("宛先アドレス不正: {e}")))?;

        let mut builder = Message::builder()
            .from(from)
            .to(to)
            .subject(&email.subject)
            .message_id(Some(message_id.to_string()));
        for cc in &email.cc {
            let mailbox: Mailbox = cc
                .parse()
                .map_err(|e| NotificationError::SendFailed(format!("CC アドレス不正: {e}")))?;
            builder = builder.cc(mailbox);
        }

        let html = SinglePart::builder()
            .header(ContentType::TEXT_HTML)
            .body(email.html_body.clone());
        let message = match &email.text_body {
            Some(text) => builder.multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(text.clone()),
                    )
                    .singlepart(html),
            ),
            None => builder.singlepart(html),
        };

        message.map_err(|e| NotificationError::SendFailed(format!("メッセージ構築失敗: {e}")))
    }
}

#[async_trait]
impl NotificationSender for SmtpNotificationSender {
    async fn send_email(&self, email: &EmailMessage) -> Result<SendReceipt, NotificationError> {
        let message_id = format!("<{}@pawcare>", Uuid::new_v4());
        let message = self.build_message(email, &message_id)?;

        let response = self
            .transport
            .send(message)
            .await
            .map_err(|e| NotificationError::SendFailed(format!("SMTP 送信失敗: {e}")))?;

        Ok(SendReceipt {
            message_id: Some(message_id),
            response:   format!(
                "{} {}",
                response.code(),
                response.message().collect::<Vec<_>>().join(" ")
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local_sender() -> SmtpNotificationSender {
        let settings = SmtpSettings {
            host:     "localhost".to_string(),
            port:     1025,
            username: None,
            password: None,
            tls:      false,
        };
        SmtpNotificationSender::new(&settings, "PawCare <noreply@pawcare.example.com>".to_string())
            .unwrap()
    }

    #[test]
    fn トレイトはsendとsyncを実装している() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SmtpNotificationSender>();
    }

    #[tokio::test]
    async fn 不正な宛先はメッセージ構築で失敗する() {
        let sender = local_sender();
        let email = EmailMessage::html("not-an-address", "件名", "<p>本文</p>");

        let result = sender.build_message(&email, "<id@pawcare>");

        assert!(matches!(result, Err(NotificationError::SendFailed(msg)) if msg.contains("宛先")));
    }

    #[tokio::test]
    async fn ccを含むメッセージを構築できる() {
        let sender = local_sender();
        let mut email = EmailMessage::html("owner@example.com", "件名", "<p>本文</p>");
        email.cc = vec!["vet@example.com".to_string()];
        email.text_body = Some("本文".to_string());

        let message = sender.build_message(&email, "<id@pawcare>").unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();

        assert!(raw.contains("Cc: vet@example.com"));
        assert!(raw.contains("Message-ID: <id@pawcare>"));
    }
}
