//! # トリガーディスパッチャー
//!
//! チェンジフィードを購読し、イベントごとに独立したタスクでトリガーを起動する。
//! 1 件の処理の遅延・失敗が後続のイベントを止めない。

use std::sync::Arc;

use pawcare_infra::ChangeStream;
use tokio::task::JoinHandle;
use tracing::Instrument;

use super::NotificationTriggers;

/// トリガーディスパッチャー
pub struct TriggerDispatcher {
    triggers: Arc<NotificationTriggers>,
}

impl TriggerDispatcher {
    pub fn new(triggers: Arc<NotificationTriggers>) -> Self {
        Self { triggers }
    }

    /// ストリームが閉じるまでイベントを処理する
    pub async fn run(self, mut stream: ChangeStream) {
        tracing::info!("トリガーディスパッチャーを開始しました");
        while let Some(event) = stream.next().await {
            let span = tracing::info_span!(
                "trigger",
                collection = %event.collection,
                document_id = %event.document_id,
            );
            let triggers = Arc::clone(&self.triggers);
            tokio::spawn(async move { triggers.handle(event).await }.instrument(span));
        }
        tracing::info!("チェンジフィードが閉じたためトリガーディスパッチャーを終了します");
    }

    /// バックグラウンドタスクとして起動する
    pub fn spawn(self, stream: ChangeStream) -> JoinHandle<()> {
        tokio::spawn(self.run(stream))
    }
}
