//! # テスト用モック
//!
//! ユースケーステストで使用するインメモリのドキュメントストアと通知送信。
//! `test-utils` feature を有効にすることで、他クレートからも利用可能。
//!
//! ```toml
//! [dev-dependencies]
//! pawcare-infra = { workspace = true, features = ["test-utils"] }
//! ```

use std::{
    collections::{BTreeMap, HashSet},
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use chrono::Utc;
use pawcare_domain::{
    collection::Collection,
    document::{Document, DocumentChange, DocumentEvent, Fields},
    notification::{EmailMessage, NotificationError, SendReceipt},
};
use serde_json::Value;

use crate::{
    change_feed::ChangeFeed,
    document_store::{DocumentStore, guard_timestamp_field},
    error::InfraError,
    notification::NotificationSender,
};

// ===== InMemoryDocumentStore =====

type DocumentKey = (Collection, String);

/// インメモリのドキュメントストア
///
/// `with_change_feed` でチェンジフィードを接続すると、PostgreSQL 実装と同じく
/// 作成・更新のたびにイベントを配信する。
#[derive(Clone, Default)]
pub struct InMemoryDocumentStore {
    documents:      Arc<Mutex<BTreeMap<DocumentKey, Fields>>>,
    feed:           Option<ChangeFeed>,
    failing_writes: Arc<Mutex<HashSet<DocumentKey>>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// チェンジフィードを接続したストアを作成する
    pub fn with_change_feed(feed: ChangeFeed) -> Self {
        Self {
            feed: Some(feed),
            ..Self::default()
        }
    }

    /// イベントを配信せずにドキュメントを投入する
    pub fn seed(&self, collection: Collection, id: &str, data: Fields) {
        self.documents
            .lock()
            .unwrap()
            .insert((collection, id.to_string()), data);
    }

    /// ドキュメントを直接参照する
    pub fn document(&self, collection: Collection, id: &str) -> Option<Document> {
        self.documents
            .lock()
            .unwrap()
            .get(&(collection, id.to_string()))
            .map(|data| Document::new(id, data.clone()))
    }

    /// コレクションの全ドキュメント
    pub fn documents(&self, collection: Collection) -> Vec<Document> {
        self.documents
            .lock()
            .unwrap()
            .iter()
            .filter(|((c, _), _)| *c == collection)
            .map(|((_, id), data)| Document::new(id.clone(), data.clone()))
            .collect()
    }

    /// 指定したドキュメントへの `update_fields` を失敗させる
    pub fn fail_writes_to(&self, collection: Collection, id: &str) {
        self.failing_writes
            .lock()
            .unwrap()
            .insert((collection, id.to_string()));
    }

    fn publish(&self, event: DocumentEvent) {
        if let Some(feed) = &self.feed {
            feed.publish(event);
        }
    }
}

fn matches_filter(data: &Fields, filter: &Fields) -> bool {
    filter
        .iter()
        .all(|(key, expected)| data.get(key) == Some(expected))
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn get(&self, collection: Collection, id: &str) -> Result<Option<Document>, InfraError> {
        Ok(self.document(collection, id))
    }

    async fn query(
        &self,
        collection: Collection,
        filter: &Fields,
    ) -> Result<Vec<Document>, InfraError> {
        Ok(self
            .documents(collection)
            .into_iter()
            .filter(|doc| matches_filter(&doc.data, filter))
            .collect())
    }

    async fn create_with_id(
        &self,
        collection: Collection,
        id: &str,
        data: Fields,
    ) -> Result<Document, InfraError> {
        {
            let mut documents = self.documents.lock().unwrap();
            let key = (collection, id.to_string());
            if documents.contains_key(&key) {
                return Err(InfraError::conflict(collection.name(), id));
            }
            documents.insert(key, data.clone());
        }
        let document = Document::new(id, data);
        self.publish(DocumentEvent::created(collection, &document));
        Ok(document)
    }

    async fn update_fields(
        &self,
        collection: Collection,
        id: &str,
        fields: Fields,
    ) -> Result<DocumentChange, InfraError> {
        let key = (collection, id.to_string());
        if self.failing_writes.lock().unwrap().contains(&key) {
            return Err(InfraError::unexpected("書き込み失敗（モック）"));
        }
        let change = {
            let mut documents = self.documents.lock().unwrap();
            let Some(current) = documents.get_mut(&key) else {
                return Err(InfraError::not_found(collection.name(), id));
            };
            let before = current.clone();
            current.extend(fields);
            DocumentChange {
                before: Document::new(id, before),
                after:  Document::new(id, current.clone()),
            }
        };
        self.publish(DocumentEvent::updated(collection, &change));
        Ok(change)
    }

    async fn claim_guard(
        &self,
        collection: Collection,
        id: &str,
        field: &str,
    ) -> Result<bool, InfraError> {
        let mut documents = self.documents.lock().unwrap();
        let Some(data) = documents.get_mut(&(collection, id.to_string())) else {
            return Ok(false);
        };
        if data.get(field) == Some(&Value::Bool(true)) {
            return Ok(false);
        }
        data.insert(field.to_string(), Value::Bool(true));
        data.insert(
            guard_timestamp_field(field),
            Value::String(Utc::now().to_rfc3339()),
        );
        Ok(true)
    }

    async fn release_guard(
        &self,
        collection: Collection,
        id: &str,
        field: &str,
    ) -> Result<(), InfraError> {
        let mut documents = self.documents.lock().unwrap();
        if let Some(data) = documents.get_mut(&(collection, id.to_string())) {
            data.remove(field);
            data.remove(&guard_timestamp_field(field));
        }
        Ok(())
    }
}

// ===== MockNotificationSender =====

/// 送信したメールを記録するモック
///
/// `fail_for` で指定した宛先への送信は失敗する。
#[derive(Clone, Default)]
pub struct MockNotificationSender {
    sent:    Arc<Mutex<Vec<EmailMessage>>>,
    failing: Arc<Mutex<HashSet<String>>>,
}

impl MockNotificationSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// 指定した宛先への送信を失敗させる
    pub fn fail_for(&self, recipient: &str) {
        self.failing.lock().unwrap().insert(recipient.to_string());
    }

    /// 送信に成功したメール
    pub fn sent_emails(&self) -> Vec<EmailMessage> {
        self.sent.lock().unwrap().clone()
    }

    /// 指定した宛先に送信したメール
    pub fn sent_to(&self, recipient: &str) -> Vec<EmailMessage> {
        self.sent_emails()
            .into_iter()
            .filter(|email| email.to == recipient)
            .collect()
    }
}

#[async_trait]
impl NotificationSender for MockNotificationSender {
    async fn send_email(&self, email: &EmailMessage) -> Result<SendReceipt, NotificationError> {
        if self.failing.lock().unwrap().contains(&email.to) {
            return Err(NotificationError::SendFailed(format!(
                "送信失敗（モック）: {}",
                email.to
            )));
        }
        let mut sent = self.sent.lock().unwrap();
        sent.push(email.clone());
        Ok(SendReceipt {
            message_id: Some(format!("<mock-{}@pawcare.test>", sent.len())),
            response:   "250 OK".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use pawcare_domain::document::fields;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn test_ガードは一度だけ取得できる() {
        let store = InMemoryDocumentStore::new();
        store.seed(Collection::Appointments, "a1", fields(json!({"status": "pending"})));

        let first = store
            .claim_guard(Collection::Appointments, "a1", "confirmationEmailSent")
            .await
            .unwrap();
        let second = store
            .claim_guard(Collection::Appointments, "a1", "confirmationEmailSent")
            .await
            .unwrap();

        assert!(first);
        assert!(!second);
        let doc = store.document(Collection::Appointments, "a1").unwrap();
        assert!(doc.flag("confirmationEmailSent"));
        assert!(doc.data.contains_key("confirmationEmailSentAt"));
    }

    #[tokio::test]
    async fn test_解放したガードは再取得できる() {
        let store = InMemoryDocumentStore::new();
        store.seed(Collection::Orders, "o1", Fields::new());
        store
            .claim_guard(Collection::Orders, "o1", "orderPlacedEmailSent")
            .await
            .unwrap();

        store
            .release_guard(Collection::Orders, "o1", "orderPlacedEmailSent")
            .await
            .unwrap();

        let doc = store.document(Collection::Orders, "o1").unwrap();
        assert_eq!(doc.data, Fields::new());
        assert!(
            store
                .claim_guard(Collection::Orders, "o1", "orderPlacedEmailSent")
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn test_存在しないドキュメントのガードは取得できない() {
        let store = InMemoryDocumentStore::new();

        let claimed = store
            .claim_guard(Collection::Orders, "missing", "orderPlacedEmailSent")
            .await
            .unwrap();

        assert!(!claimed);
        assert!(store.documents(Collection::Orders).is_empty());
    }

    #[tokio::test]
    async fn test_更新は浅いマージで更新前後を返しイベントを配信する() {
        let (feed, mut stream) = ChangeFeed::channel();
        let store = InMemoryDocumentStore::with_change_feed(feed);
        store.seed(
            Collection::Orders,
            "o1",
            fields(json!({"status": "pending", "subtotal": 600})),
        );

        let change = store
            .update_fields(Collection::Orders, "o1", fields(json!({"status": "confirmed"})))
            .await
            .unwrap();

        assert_eq!(change.before.data, fields(json!({"status": "pending", "subtotal": 600})));
        assert_eq!(change.after.data, fields(json!({"status": "confirmed", "subtotal": 600})));
        let event = stream.next().await.unwrap();
        assert_eq!(event, DocumentEvent::updated(Collection::Orders, &change));
    }

    #[tokio::test]
    async fn test_存在しないドキュメントの更新はnot_found() {
        let store = InMemoryDocumentStore::new();

        let err = store
            .update_fields(Collection::Orders, "missing", Fields::new())
            .await
            .unwrap_err();

        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_等値フィルタで検索できる() {
        let store = InMemoryDocumentStore::new();
        store.seed(Collection::ScheduledEmails, "s1", fields(json!({"status": "pending"})));
        store.seed(Collection::ScheduledEmails, "s2", fields(json!({"status": "sent"})));

        let pending = store
            .query(
                Collection::ScheduledEmails,
                &fields(json!({"status": "pending"})),
            )
            .await
            .unwrap();

        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, "s1");
    }

    #[tokio::test]
    async fn test_同じidの作成はconflict() {
        let store = InMemoryDocumentStore::new();
        store
            .create_with_id(Collection::Products, "p1", Fields::new())
            .await
            .unwrap();

        let result = store
            .create_with_id(Collection::Products, "p1", Fields::new())
            .await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_モック送信は失敗指定の宛先だけ失敗する() {
        let sender = MockNotificationSender::new();
        sender.fail_for("bad@example.com");

        let ok = sender
            .send_email(&EmailMessage::html("good@example.com", "s", "<p>b</p>"))
            .await;
        let ng = sender
            .send_email(&EmailMessage::html("bad@example.com", "s", "<p>b</p>"))
            .await;

        tokio_test::assert_ok!(ok);
        tokio_test::assert_err!(ng);
        assert_eq!(sender.sent_emails().len(), 1);
        assert_eq!(sender.sent_to("good@example.com").len(), 1);
    }
}
