//! # チェンジフィード
//!
//! ドキュメントストアへの書き込みが確定した後に [`DocumentEvent`] を配信する。
//! 作成・更新トリガーはこのストリームを購読して起動される。
//!
//! ## 設計方針
//!
//! - **書き込み後に配信**: 購読側が失敗しても書き込みは取り消されない
//! - **非ブロッキング**: 配信は unbounded チャネルへの送信のみで、書き込み側を待たせない
//! - **ガード書き込みは配信しない**: `claim_guard` / `release_guard` はイベントを発行しないため、
//!   ガードの書き込みがトリガーを再起動することはない

use pawcare_domain::document::DocumentEvent;
use tokio::sync::mpsc;

/// イベントの送信側
///
/// ドキュメントストアが保持する。`Clone` で複数の書き込み元から共有できる。
#[derive(Debug, Clone)]
pub struct ChangeFeed {
    sender: mpsc::UnboundedSender<DocumentEvent>,
}

/// イベントの受信側
///
/// トリガーランタイムが 1 つだけ保持する。
#[derive(Debug)]
pub struct ChangeStream {
    receiver: mpsc::UnboundedReceiver<DocumentEvent>,
}

impl ChangeFeed {
    /// 送信側と受信側の組を作成する
    pub fn channel() -> (Self, ChangeStream) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, ChangeStream { receiver })
    }

    /// イベントを配信する
    ///
    /// 受信側が終了している場合はログを出して破棄する。
    pub fn publish(&self, event: DocumentEvent) {
        if let Err(e) = self.sender.send(event) {
            tracing::warn!(
                collection = %e.0.collection,
                document_id = %e.0.document_id,
                "チェンジフィードの購読者がいないためイベントを破棄"
            );
        }
    }
}

impl ChangeStream {
    /// 次のイベントを待つ。すべての送信側がドロップされると `None`
    pub async fn next(&mut self) -> Option<DocumentEvent> {
        self.receiver.recv().await
    }

    /// 待たずに次のイベントを取り出す。配信済みのイベントが無ければ `None`
    pub fn try_next(&mut self) -> Option<DocumentEvent> {
        self.receiver.try_recv().ok()
    }
}
