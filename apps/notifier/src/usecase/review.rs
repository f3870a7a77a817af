//! # レビュー依頼ユースケース
//!
//! 完了した予約に対して作成されたレビュー依頼の一覧と回答登録を扱う。

use std::sync::Arc;

use pawcare_domain::{
    DomainError,
    clock::Clock,
    collection::Collection,
    document::{Fields, fields},
    review_request::ReviewRequest,
};
use pawcare_infra::DocumentStore;
use pawcare_shared::{event_log::event, log_business_event};
use serde_json::json;

use crate::error::NotifierError;

/// レビュー依頼ユースケース
pub struct ReviewUseCaseImpl {
    store: Arc<dyn DocumentStore>,
    clock: Arc<dyn Clock>,
}

impl ReviewUseCaseImpl {
    pub fn new(store: Arc<dyn DocumentStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// レビュー依頼を一覧する
    ///
    /// `responded` を指定すると回答済み／未回答で絞り込む。デコードできない依頼は除外する。
    pub async fn list(&self, responded: Option<bool>) -> Result<Vec<ReviewRequest>, NotifierError> {
        let filter = match responded {
            Some(responded) => fields(json!({ "responded": responded })),
            None => Fields::new(),
        };
        let documents = self
            .store
            .query(Collection::ReviewRequests, &filter)
            .await?;

        Ok(documents
            .iter()
            .filter_map(|document| match ReviewRequest::from_document(document) {
                Ok(request) => Some(request),
                Err(e) => {
                    tracing::warn!(review_request_id = %document.id, "レビュー依頼を読み込めません: {}", e);
                    None
                }
            })
            .collect())
    }

    /// レビュー依頼に回答済みを記録する
    ///
    /// 回答済みの依頼はそのまま返す。
    pub async fn respond(&self, id: &str) -> Result<ReviewRequest, NotifierError> {
        let document = self
            .store
            .get(Collection::ReviewRequests, id)
            .await?
            .ok_or_else(|| DomainError::NotFound {
                entity_type: "ReviewRequest",
                id:          id.to_string(),
            })?;
        let mut request = ReviewRequest::from_document(&document)?;
        if request.responded {
            return Ok(request);
        }

        request.mark_responded(self.clock.now());
        let update = fields(json!({
            "responded": true,
            "respondedAt": request.responded_at,
        }));
        self.store
            .update_fields(Collection::ReviewRequests, id, update)
            .await
            .map_err(NotifierError::from_store)?;

        log_business_event!(
            event.category = event::category::REVIEW,
            event.action = event::action::REVIEW_RESPONDED,
            event.entity_type = event::entity_type::REVIEW_REQUEST,
            event.entity_id = %id,
            event.result = event::result::SUCCESS,
            booking_id = %request.booking_id,
            "レビュー依頼に回答"
        );
        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use pawcare_domain::clock::FixedClock;
    use pawcare_infra::mock::InMemoryDocumentStore;
    use pretty_assertions::assert_eq;

    use super::*;

    fn seed_request(store: &InMemoryDocumentStore, id: &str, responded: bool) {
        store.seed(
            Collection::ReviewRequests,
            id,
            fields(json!({
                "bookingId": format!("bk-{id}"),
                "bookingType": "grooming",
                "userEmail": "owner@example.com",
                "sentAt": "2026-01-20T10:00:00Z",
                "responded": responded,
            })),
        );
    }

    fn make_usecase(store: &InMemoryDocumentStore) -> ReviewUseCaseImpl {
        ReviewUseCaseImpl::new(
            Arc::new(store.clone()),
            Arc::new(FixedClock::at_timestamp(1_769_904_000)),
        )
    }

    #[tokio::test]
    async fn 未回答だけに絞り込める() {
        let store = InMemoryDocumentStore::new();
        seed_request(&store, "r1", false);
        seed_request(&store, "r2", true);
        store.seed(Collection::ReviewRequests, "broken", fields(json!({"responded": false})));
        let usecase = make_usecase(&store);

        let pending = usecase.list(Some(false)).await.unwrap();
        let all = usecase.list(None).await.unwrap();

        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, "r1");
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn 回答を記録する() {
        let store = InMemoryDocumentStore::new();
        seed_request(&store, "r1", false);
        let usecase = make_usecase(&store);

        let request = usecase.respond("r1").await.unwrap();

        assert!(request.responded);
        let doc = store.document(Collection::ReviewRequests, "r1").unwrap();
        assert!(doc.flag("responded"));
        assert_eq!(doc.str_field("respondedAt"), Some("2026-02-01T00:00:00Z"));
    }

    #[tokio::test]
    async fn 回答済みの依頼はそのまま返す() {
        let store = InMemoryDocumentStore::new();
        seed_request(&store, "r1", true);
        let usecase = make_usecase(&store);

        let request = tokio_test::assert_ok!(usecase.respond("r1").await);

        assert!(request.responded);
        let doc = store.document(Collection::ReviewRequests, "r1").unwrap();
        assert!(!doc.data.contains_key("respondedAt"));
    }

    #[tokio::test]
    async fn 存在しない依頼はnot_found() {
        let usecase = make_usecase(&InMemoryDocumentStore::new());

        let result = usecase.respond("missing").await;

        assert!(matches!(result, Err(NotifierError::NotFound(_))));
    }
}
