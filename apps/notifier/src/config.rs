//! # Notifier 設定
//!
//! 環境変数から Notifier サーバーの設定を読み込む。
//!
//! 必須の値が欠けている場合は起動時に [`ConfigError`] で失敗する。

use std::{env, time::Duration};

use pawcare_infra::notification::SmtpSettings;
use thiserror::Error;

/// 設定の読み込みエラー
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} が設定されていません")]
    Missing(&'static str),

    #[error("{name} の値が不正です: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Notifier サーバーの設定
#[derive(Debug, Clone)]
pub struct NotifierConfig {
    /// バインドアドレス
    pub host: String,
    /// ポート番号
    pub port: u16,
    /// データベース接続 URL
    pub database_url: String,
    /// 新規注文アラートの送信先（事業者）
    pub business_email: String,
    /// 通知設定
    pub notification: NotificationConfig,
    /// 予約済みメールの送信間隔（未設定なら送信しない）
    pub sweep_interval: Option<Duration>,
}

/// メール送信バックエンド
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationBackend {
    /// SMTP リレー（本番はメールアカウント、開発は Mailpit）
    Smtp(SmtpSettings),
    /// Amazon SES v2
    Ses,
    /// 送信しない（ログ出力のみ）
    Noop,
}

/// 通知機能の設定
///
/// `NOTIFICATION_BACKEND` 環境変数で送信バックエンドを切り替える:
/// - `smtp`: SMTP サーバー経由で送信（既定）
/// - `ses`: Amazon SES v2 経由で送信
/// - `noop`: 送信しない（ログ出力のみ）
#[derive(Debug, Clone)]
pub struct NotificationConfig {
    pub backend:      NotificationBackend,
    /// 送信元メールアドレス
    pub from_address: String,
    /// メール内リンクのベース URL
    pub base_url:     String,
}

impl NotifierConfig {
    /// 環境変数から設定を読み込む
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// 任意の参照関数から設定を読み込む
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &'static str| lookup(name).filter(|v| !v.trim().is_empty());
        let require = |name: &'static str| get(name).ok_or(ConfigError::Missing(name));

        let sweep_interval = get("SCHEDULED_EMAIL_SWEEP_SECS")
            .map(|raw| parse_number::<u64>("SCHEDULED_EMAIL_SWEEP_SECS", &raw))
            .transpose()?
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);

        Ok(Self {
            host: get("NOTIFIER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_number("NOTIFIER_PORT", &require("NOTIFIER_PORT")?)?,
            database_url: require("DATABASE_URL")?,
            business_email: require("BUSINESS_EMAIL")?,
            notification: NotificationConfig {
                backend:      backend_from(&get)?,
                from_address: require("NOTIFICATION_FROM_ADDRESS")?,
                base_url:     get("NOTIFICATION_BASE_URL")
                    .unwrap_or_else(|| "http://localhost:5173".to_string()),
            },
            sweep_interval,
        })
    }
}

fn backend_from(
    get: &impl Fn(&'static str) -> Option<String>,
) -> Result<NotificationBackend, ConfigError> {
    let backend = get("NOTIFICATION_BACKEND").unwrap_or_else(|| "smtp".to_string());
    match backend.as_str() {
        "smtp" => {
            let port = match get("SMTP_PORT") {
                Some(raw) => parse_number("SMTP_PORT", &raw)?,
                None => 587,
            };
            let tls = match get("SMTP_TLS").as_deref() {
                None | Some("true") => true,
                Some("false") => false,
                Some(other) => {
                    return Err(ConfigError::Invalid {
                        name:  "SMTP_TLS",
                        value: other.to_string(),
                    });
                }
            };
            Ok(NotificationBackend::Smtp(SmtpSettings {
                host: get("SMTP_HOST").ok_or(ConfigError::Missing("SMTP_HOST"))?,
                port,
                username: Some(get("SMTP_USERNAME").ok_or(ConfigError::Missing("SMTP_USERNAME"))?),
                password: Some(get("SMTP_PASSWORD").ok_or(ConfigError::Missing("SMTP_PASSWORD"))?),
                tls,
            }))
        }
        "ses" => Ok(NotificationBackend::Ses),
        "noop" => Ok(NotificationBackend::Noop),
        other => Err(ConfigError::Invalid {
            name:  "NOTIFICATION_BACKEND",
            value: other.to_string(),
        }),
    }
}

fn parse_number<T: std::str::FromStr>(name: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::Invalid {
        name,
        value: raw.to_string(),
    })
}
