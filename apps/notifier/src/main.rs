//! # Notifier サーバー
//!
//! HTTP API の提供に加え、チェンジフィードを購読するトリガーディスパッチャーと
//! （有効な場合）予約送信メールのスイーパーをバックグラウンドで動かす。
//!
//! ```text
//! ┌──────────┐  書き込み  ┌───────────────┐  イベント  ┌──────────────┐  送信  ┌──────────┐
//! │ HTTP API │──────────▶│ DocumentStore │──────────▶│   Triggers   │──────▶│  Mailer  │
//! └──────────┘           └───────────────┘           └──────────────┘       └──────────┘
//! ```
//!
//! ## 環境変数
//!
//! | 変数名 | 必須 | 説明 |
//! |--------|------|------|
//! | `NOTIFIER_HOST` | No | バインドアドレス（デフォルト: `0.0.0.0`） |
//! | `NOTIFIER_PORT` | **Yes** | ポート番号 |
//! | `DATABASE_URL` | **Yes** | PostgreSQL 接続 URL |
//! | `BUSINESS_EMAIL` | **Yes** | 新規注文アラートの送信先 |
//! | `NOTIFICATION_FROM_ADDRESS` | **Yes** | 送信元アドレス |
//! | `NOTIFICATION_BACKEND` | No | `smtp`（デフォルト） / `ses` / `noop` |
//! | `SCHEDULED_EMAIL_SWEEP_SECS` | No | 予約送信メールのスイープ間隔（秒） |
//!
//! ## 起動方法
//!
//! ```bash
//! NOTIFIER_PORT=3100 DATABASE_URL=postgres://... cargo run -p pawcare-notifier
//! ```

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use pawcare_domain::clock::{Clock, SystemClock};
use pawcare_infra::{
    ChangeFeed,
    DocumentStore,
    PostgresDocumentStore,
    db,
    notification::{
        NoopNotificationSender,
        NotificationSender,
        SesNotificationSender,
        SmtpNotificationSender,
    },
};
use pawcare_notifier::{
    app_builder::{AppDependencies, build_app},
    config::{NotificationBackend, NotificationConfig, NotifierConfig},
    usecase::{
        Mailer,
        NotificationTriggers,
        ScheduledEmailSweeper,
        TemplateRenderer,
        TriggerDispatcher,
    },
};
use pawcare_shared::observability::{TracingConfig, init_tracing};
use tokio::net::TcpListener;

/// 設定に応じたメール送信実装を構築する
async fn build_sender(config: &NotificationConfig) -> anyhow::Result<Arc<dyn NotificationSender>> {
    let sender: Arc<dyn NotificationSender> = match &config.backend {
        NotificationBackend::Smtp(settings) => {
            tracing::info!(host = %settings.host, port = settings.port, "SMTP で送信します");
            Arc::new(
                SmtpNotificationSender::new(settings, config.from_address.clone())
                    .context("SMTP トランスポートの構築に失敗しました")?,
            )
        }
        NotificationBackend::Ses => {
            tracing::info!("Amazon SES で送信します");
            let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
            let client = aws_sdk_sesv2::Client::new(&aws_config);
            Arc::new(SesNotificationSender::new(client, config.from_address.clone()))
        }
        NotificationBackend::Noop => {
            tracing::warn!("NOTIFICATION_BACKEND=noop: メールは送信されません");
            Arc::new(NoopNotificationSender)
        }
    };
    Ok(sender)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env ファイルを読み込む（存在する場合）
    dotenvy::dotenv().ok();

    // トレーシング初期化
    init_tracing(TracingConfig::from_env("notifier"));
    let _tracing_guard = tracing::info_span!("app", service = "notifier").entered();

    // 設定読み込み
    let config = NotifierConfig::from_env().context("設定の読み込みに失敗しました")?;

    tracing::info!(
        "Notifier サーバーを起動します: {}:{}",
        config.host,
        config.port
    );

    // データベース接続とマイグレーション
    let pool = db::create_pool(&config.database_url)
        .await
        .context("データベース接続に失敗しました")?;
    db::run_migrations(&pool)
        .await
        .context("マイグレーションに失敗しました")?;
    tracing::info!("データベースに接続しました");

    // 依存コンポーネントを初期化
    let (feed, stream) = ChangeFeed::channel();
    let store: Arc<dyn DocumentStore> = Arc::new(PostgresDocumentStore::new(pool, feed));
    let sender = build_sender(&config.notification).await?;
    let renderer = Arc::new(TemplateRenderer::new().context("テンプレートの読み込みに失敗しました")?);
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let mailer = Arc::new(Mailer::new(
        store.clone(),
        sender.clone(),
        renderer.clone(),
        config.notification.base_url.clone(),
    ));

    // トリガーディスパッチャー
    let triggers = Arc::new(NotificationTriggers::new(
        store.clone(),
        mailer.clone(),
        config.business_email.clone(),
        clock.clone(),
    ));
    let _dispatcher = TriggerDispatcher::new(triggers).spawn(stream);

    // 予約送信メールのスイーパー（任意）
    match config.sweep_interval {
        Some(period) => {
            ScheduledEmailSweeper::new(store.clone(), mailer, clock.clone()).spawn(period);
        }
        None => tracing::info!("SCHEDULED_EMAIL_SWEEP_SECS 未設定のためスイーパーは起動しません"),
    }

    let app = build_app(AppDependencies {
        store,
        sender,
        renderer,
        clock,
    });

    // サーバー起動
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("アドレスのパースに失敗しました")?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Notifier サーバーが起動しました: {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
