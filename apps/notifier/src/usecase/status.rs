//! # ステータス変更ユースケース
//!
//! 管理画面からの注文・予約・診察予約のステータス変更を扱う。
//!
//! ## 設計方針
//!
//! - **メールは送らない**: 書き込みだけを行い、通知は更新イベントを受けたトリガーが送る
//! - **遷移規則はドメインに委譲**: [`StatusLifecycle::ensure_transition`] で検証する
//! - **同一ステータスは書き込まない**: `Unchanged` を返し、更新イベントも発生しない
//! - **発送には配送情報が必須**: 揃っていなければ書き込まずに `CourierDetailsRequired` を返す

use std::sync::Arc;

use pawcare_domain::{
    DomainError,
    clock::Clock,
    collection::{BookingKind, Collection},
    document::{Fields, fields},
    order::CourierDetails,
    status::{AppointmentStatus, BookingStatus, OrderStatus, StatusLifecycle, parse_status, require_status},
};
use pawcare_infra::DocumentStore;
use pawcare_shared::{event_log::event, log_business_event};
use serde::Serialize;
use serde_json::{Value, json};

use crate::error::NotifierError;

/// 単体のステータス変更結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum StatusChangeOutcome {
    /// 書き込んだ
    Updated { from: String, to: String },
    /// 現在と同じステータスのため書き込んでいない
    Unchanged { status: String },
    /// 発送に配送情報が必要（書き込んでいない）
    CourierDetailsRequired,
}

/// 一括ステータス変更の集計
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkStatusReport {
    pub requested: usize,
    pub updated:   usize,
    pub skipped:   usize,
    pub failed:    usize,
}

/// ステータス変更ユースケース
pub struct StatusUseCaseImpl {
    store: Arc<dyn DocumentStore>,
    clock: Arc<dyn Clock>,
}

impl StatusUseCaseImpl {
    pub fn new(store: Arc<dyn DocumentStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// 注文のステータスを変更する
    pub async fn set_order_status(
        &self,
        id: &str,
        raw_status: &str,
        courier: Option<CourierDetails>,
    ) -> Result<StatusChangeOutcome, NotifierError> {
        let next = require_status::<OrderStatus>(raw_status)?;
        self.apply_order_status(id, next, courier).await
    }

    /// 複数の注文のステータスを一括で変更する
    ///
    /// 現在のステータスから遷移できない注文（配送情報を伴えない一括発送を含む）はスキップし、
    /// 存在しない注文と書き込みに失敗した注文は失敗として数える。
    pub async fn bulk_set_order_status(
        &self,
        ids: &[String],
        raw_status: &str,
    ) -> Result<BulkStatusReport, NotifierError> {
        let next = require_status::<OrderStatus>(raw_status)?;
        let mut report = BulkStatusReport {
            requested: ids.len(),
            ..Default::default()
        };

        for id in ids {
            match self.apply_order_status(id, next, None).await {
                Ok(StatusChangeOutcome::Updated { .. }) => report.updated += 1,
                Ok(StatusChangeOutcome::Unchanged { .. } | StatusChangeOutcome::CourierDetailsRequired)
                | Err(NotifierError::Conflict(_)) => report.skipped += 1,
                Err(e) => {
                    tracing::warn!(order_id = %id, "一括ステータス変更に失敗: {}", e);
                    report.failed += 1;
                }
            }
        }

        log_business_event!(
            event.category = event::category::STATUS,
            event.action = event::action::BULK_STATUS_CHANGED,
            event.entity_type = event::entity_type::ORDER,
            event.result = event::result::SUCCESS,
            status = next.as_str(),
            requested = report.requested,
            updated = report.updated,
            skipped = report.skipped,
            failed = report.failed,
            "注文ステータスを一括変更"
        );
        Ok(report)
    }

    /// トリミング・預かり予約のステータスを変更する
    pub async fn set_booking_status(
        &self,
        kind: BookingKind,
        id: &str,
        raw_status: &str,
    ) -> Result<StatusChangeOutcome, NotifierError> {
        let next = require_status::<BookingStatus>(raw_status)?;
        self.apply_transition(kind.collection(), id, next, Fields::new())
            .await
    }

    /// 診察予約のステータスを変更する
    pub async fn set_appointment_status(
        &self,
        id: &str,
        raw_status: &str,
    ) -> Result<StatusChangeOutcome, NotifierError> {
        let next = require_status::<AppointmentStatus>(raw_status)?;
        self.apply_transition(Collection::Appointments, id, next, Fields::new())
            .await
    }

    async fn apply_order_status(
        &self,
        id: &str,
        next: OrderStatus,
        courier: Option<CourierDetails>,
    ) -> Result<StatusChangeOutcome, NotifierError> {
        let mut extra = Fields::new();
        if next == OrderStatus::Dispatched {
            let current = self.current_status::<OrderStatus>(Collection::Orders, id).await?;
            if current == next {
                return Ok(StatusChangeOutcome::Unchanged {
                    status: next.to_string(),
                });
            }
            // 遷移できない注文に配送情報を求めない
            current.ensure_transition(next)?;
            let Some(courier) = courier.filter(CourierDetails::is_complete) else {
                return Ok(StatusChangeOutcome::CourierDetailsRequired);
            };
            extra.insert(
                "courierDetails".to_string(),
                serde_json::to_value(&courier).unwrap_or(Value::Null),
            );
        }
        self.apply_transition(Collection::Orders, id, next, extra)
            .await
    }

    /// 遷移を検証して書き込む
    async fn apply_transition<S: StatusLifecycle>(
        &self,
        collection: Collection,
        id: &str,
        next: S,
        extra: Fields,
    ) -> Result<StatusChangeOutcome, NotifierError> {
        let current = self.current_status::<S>(collection, id).await?;
        if current == next {
            return Ok(StatusChangeOutcome::Unchanged {
                status: next.to_string(),
            });
        }
        current.ensure_transition(next)?;

        let mut update = fields(json!({
            "status": next.as_str(),
            "updatedAt": self.clock.now().to_rfc3339(),
        }));
        update.extend(extra);
        self.store
            .update_fields(collection, id, update)
            .await
            .map_err(NotifierError::from_store)?;

        log_business_event!(
            event.category = event::category::STATUS,
            event.action = event::action::STATUS_CHANGED,
            event.entity_type = S::ENTITY_TYPE,
            event.entity_id = %id,
            event.result = event::result::SUCCESS,
            status.from = current.as_str(),
            status.to = next.as_str(),
            "ステータスを変更"
        );
        Ok(StatusChangeOutcome::Updated {
            from: current.to_string(),
            to:   next.to_string(),
        })
    }

    /// 現在のステータスを取得する
    ///
    /// ステータスが未設定のドキュメントは `pending` とみなす。
    /// 解釈できない値からはどこにも遷移できない。
    async fn current_status<S: StatusLifecycle>(
        &self,
        collection: Collection,
        id: &str,
    ) -> Result<S, NotifierError> {
        let document = self
            .store
            .get(collection, id)
            .await
            .map_err(NotifierError::from_store)?
            .ok_or_else(|| DomainError::NotFound {
                entity_type: S::ENTITY_TYPE,
                id:          id.to_string(),
            })?;

        match document.str_field("status") {
            None => require_status::<S>("pending").map_err(NotifierError::from),
            Some(raw) => parse_status::<S>(raw).ok_or_else(|| {
                NotifierError::Conflict(format!(
                    "{} {id} の現在のステータスを解釈できません: {raw}",
                    S::ENTITY_TYPE
                ))
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use pawcare_domain::clock::FixedClock;
    use pawcare_infra::mock::InMemoryDocumentStore;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    fn make_usecase(store: &InMemoryDocumentStore) -> StatusUseCaseImpl {
        StatusUseCaseImpl::new(
            Arc::new(store.clone()),
            Arc::new(FixedClock::at_timestamp(1_769_904_000)),
        )
    }

    fn seed_order(store: &InMemoryDocumentStore, id: &str, status: &str) {
        store.seed(
            Collection::Orders,
            id,
            fields(json!({"customerEmail": "a@b.com", "status": status})),
        );
    }

    fn status_of(store: &InMemoryDocumentStore, collection: Collection, id: &str) -> String {
        store
            .document(collection, id)
            .unwrap()
            .str_field("status")
            .unwrap()
            .to_string()
    }

    #[tokio::test]
    async fn 確定に変更して更新日時を書き込む() {
        let store = InMemoryDocumentStore::new();
        seed_order(&store, "o1", "pending");
        let usecase = make_usecase(&store);

        let outcome = usecase.set_order_status("o1", "confirmed", None).await.unwrap();

        assert_eq!(
            outcome,
            StatusChangeOutcome::Updated {
                from: "pending".to_string(),
                to:   "confirmed".to_string(),
            }
        );
        let doc = store.document(Collection::Orders, "o1").unwrap();
        assert_eq!(doc.str_field("status"), Some("confirmed"));
        assert_eq!(doc.str_field("updatedAt"), Some("2026-02-01T00:00:00+00:00"));
    }

    #[tokio::test]
    async fn 配送情報なしの発送は書き込まない() {
        let store = InMemoryDocumentStore::new();
        seed_order(&store, "o1", "confirmed");
        let usecase = make_usecase(&store);

        let missing = usecase.set_order_status("o1", "dispatched", None).await.unwrap();
        let partial = usecase
            .set_order_status(
                "o1",
                "dispatched",
                Some(CourierDetails {
                    company:         Some("BlueDart".to_string()),
                    tracking_number: Some("  ".to_string()),
                }),
            )
            .await
            .unwrap();

        assert_eq!(missing, StatusChangeOutcome::CourierDetailsRequired);
        assert_eq!(partial, StatusChangeOutcome::CourierDetailsRequired);
        assert_eq!(status_of(&store, Collection::Orders, "o1"), "confirmed");
    }

    #[tokio::test]
    async fn 発送時に配送情報を書き込む() {
        let store = InMemoryDocumentStore::new();
        seed_order(&store, "o1", "confirmed");
        let usecase = make_usecase(&store);

        usecase
            .set_order_status(
                "o1",
                "dispatched",
                Some(CourierDetails {
                    company:         Some("BlueDart".to_string()),
                    tracking_number: Some("BD123".to_string()),
                }),
            )
            .await
            .unwrap();

        let doc = store.document(Collection::Orders, "o1").unwrap();
        assert_eq!(
            doc.data.get("courierDetails"),
            Some(&json!({"company": "BlueDart", "trackingNumber": "BD123"}))
        );
    }

    #[tokio::test]
    async fn 同じステータスは書き込まない() {
        let store = InMemoryDocumentStore::new();
        seed_order(&store, "o1", "confirmed");
        let usecase = make_usecase(&store);

        let outcome = usecase.set_order_status("o1", "confirmed", None).await.unwrap();

        assert_eq!(
            outcome,
            StatusChangeOutcome::Unchanged {
                status: "confirmed".to_string(),
            }
        );
        assert!(!store.document(Collection::Orders, "o1").unwrap().data.contains_key("updatedAt"));
    }

    #[tokio::test]
    async fn 終端状態からの変更は競合() {
        let store = InMemoryDocumentStore::new();
        seed_order(&store, "o1", "delivered");
        let usecase = make_usecase(&store);

        let result = usecase.set_order_status("o1", "pending", None).await;

        assert!(matches!(result, Err(NotifierError::Conflict(_))));
    }

    #[rstest]
    #[case::配達済み("delivered")]
    #[case::未確定("pending")]
    #[case::キャンセル済み("cancelled")]
    #[tokio::test]
    async fn 発送できない注文は配送情報より先に競合を返す(#[case] current: &str) {
        let store = InMemoryDocumentStore::new();
        seed_order(&store, "o1", current);
        let usecase = make_usecase(&store);

        let result = usecase.set_order_status("o1", "dispatched", None).await;

        assert!(matches!(result, Err(NotifierError::Conflict(_))));
        assert_eq!(status_of(&store, Collection::Orders, "o1"), current);
    }

    #[rstest]
    #[case("shipped")]
    #[case("")]
    #[tokio::test]
    async fn 不正なステータスはバッドリクエスト(#[case] raw: &str) {
        let store = InMemoryDocumentStore::new();
        seed_order(&store, "o1", "pending");
        let usecase = make_usecase(&store);

        let result = usecase.set_order_status("o1", raw, None).await;

        assert!(matches!(result, Err(NotifierError::BadRequest(_))));
    }

    #[tokio::test]
    async fn 存在しない注文はnot_found() {
        let usecase = make_usecase(&InMemoryDocumentStore::new());

        let result = usecase.set_order_status("missing", "confirmed", None).await;

        assert!(matches!(result, Err(NotifierError::NotFound(_))));
    }

    #[tokio::test]
    async fn 一括変更は遷移できない注文をスキップし失敗を数える() {
        let store = InMemoryDocumentStore::new();
        seed_order(&store, "o1", "pending");
        seed_order(&store, "o2", "delivered");
        seed_order(&store, "o3", "confirmed");
        seed_order(&store, "o4", "pending");
        store.fail_writes_to(Collection::Orders, "o4");
        let usecase = make_usecase(&store);
        let ids: Vec<String> = ["o1", "o2", "o3", "o4", "missing"]
            .iter()
            .map(ToString::to_string)
            .collect();

        let report = usecase.bulk_set_order_status(&ids, "confirmed").await.unwrap();

        assert_eq!(
            report,
            BulkStatusReport {
                requested: 5,
                updated:   1,
                skipped:   2,
                failed:    2,
            }
        );
        assert_eq!(status_of(&store, Collection::Orders, "o1"), "confirmed");
    }

    #[tokio::test]
    async fn 一括発送は配送情報が無いためすべてスキップ() {
        let store = InMemoryDocumentStore::new();
        seed_order(&store, "o1", "confirmed");
        seed_order(&store, "o2", "confirmed");
        let usecase = make_usecase(&store);
        let ids = vec!["o1".to_string(), "o2".to_string()];

        let report = usecase.bulk_set_order_status(&ids, "dispatched").await.unwrap();

        assert_eq!(report.skipped, 2);
        assert_eq!(report.updated, 0);
    }

    #[tokio::test]
    async fn 予約は確定から完了に直接変更できる() {
        let store = InMemoryDocumentStore::new();
        store.seed(
            Collection::BoardingBookings,
            "bk-1",
            fields(json!({"status": "confirmed"})),
        );
        let usecase = make_usecase(&store);

        usecase
            .set_booking_status(BookingKind::Boarding, "bk-1", "completed")
            .await
            .unwrap();

        assert_eq!(status_of(&store, Collection::BoardingBookings, "bk-1"), "completed");
    }

    #[tokio::test]
    async fn 到着後の予約はキャンセルできない() {
        let store = InMemoryDocumentStore::new();
        store.seed(
            Collection::GroomingBookings,
            "bk-2",
            fields(json!({"status": "arrived"})),
        );
        let usecase = make_usecase(&store);

        let result = usecase
            .set_booking_status(BookingKind::Grooming, "bk-2", "cancelled")
            .await;

        assert!(matches!(result, Err(NotifierError::Conflict(_))));
    }

    #[tokio::test]
    async fn ステータス未設定の診察予約はpendingとして扱う() {
        let store = InMemoryDocumentStore::new();
        store.seed(Collection::Appointments, "a1", fields(json!({})));
        let usecase = make_usecase(&store);

        let outcome = usecase.set_appointment_status("a1", "confirmed").await.unwrap();

        assert_eq!(
            outcome,
            StatusChangeOutcome::Updated {
                from: "pending".to_string(),
                to:   "confirmed".to_string(),
            }
        );
    }
}
