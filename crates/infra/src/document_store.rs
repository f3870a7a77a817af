//! # DocumentStore
//!
//! コレクション単位の JSON ドキュメントの永続化を担当する。
//!
//! ## 設計方針
//!
//! - **スキーマを持たない**: ドキュメントは JSONB としてそのまま保存し、
//!   型付けはドメイン層のレコードが寛容に行う
//! - **浅いマージ**: `update_fields` はトップレベルのフィールドだけを上書きする
//! - **ガードは条件付き UPDATE**: `claim_guard` は「未設定なら設定する」を 1 文で行い、
//!   同じ通知を複数の呼び出しが取り合っても送信できるのは 1 つだけになる
//! - **書き込み後にイベント配信**: `create` / `update_fields` の成功後に
//!   [`ChangeFeed`] へ [`DocumentEvent`] を配信する。ガード書き込みは配信しない

use async_trait::async_trait;
use pawcare_domain::{
    collection::Collection,
    document::{Document, DocumentChange, DocumentEvent, Fields},
};
use serde_json::Value;
use sqlx::{PgPool, types::Json};
use uuid::Uuid;

use crate::{change_feed::ChangeFeed, error::InfraError};

/// ガードフィールドと同時に書き込む時刻フィールド名（例: `notificationSentAt`）
pub fn guard_timestamp_field(field: &str) -> String {
    format!("{field}At")
}

/// 新しいドキュメント ID を採番する
pub fn new_document_id() -> String {
    Uuid::now_v7().simple().to_string()
}

/// ドキュメントストアトレイト
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// ID でドキュメントを取得する
    async fn get(&self, collection: Collection, id: &str) -> Result<Option<Document>, InfraError>;

    /// トップレベルフィールドの等値条件で検索する
    ///
    /// `filter` が空の場合はコレクション全件を返す。作成順。
    async fn query(&self, collection: Collection, filter: &Fields)
    -> Result<Vec<Document>, InfraError>;

    /// ID を指定してドキュメントを作成する
    ///
    /// 同じ ID が存在する場合は Conflict エラー。
    async fn create_with_id(
        &self,
        collection: Collection,
        id: &str,
        data: Fields,
    ) -> Result<Document, InfraError>;

    /// ドキュメントを作成する（ID は採番）
    async fn create(&self, collection: Collection, data: Fields) -> Result<Document, InfraError> {
        self.create_with_id(collection, &new_document_id(), data)
            .await
    }

    /// フィールドを浅くマージして更新する
    ///
    /// # 戻り値
    ///
    /// - `Ok(change)`: 更新前後のドキュメント
    /// - `Err(_)`: ドキュメントが存在しない（NotFound）、またはデータベースエラー
    async fn update_fields(
        &self,
        collection: Collection,
        id: &str,
        fields: Fields,
    ) -> Result<DocumentChange, InfraError>;

    /// ガードフィールドを取得する
    ///
    /// `field` が `true` でなければ `field = true` と `{field}At = 現在時刻` を書き込む。
    ///
    /// # 戻り値
    ///
    /// - `Ok(true)`: この呼び出しがガードを取得した
    /// - `Ok(false)`: 既に取得済み、またはドキュメントが存在しない
    async fn claim_guard(
        &self,
        collection: Collection,
        id: &str,
        field: &str,
    ) -> Result<bool, InfraError>;

    /// ガードフィールドを解放する
    ///
    /// 送信に失敗したとき、ガードの不在を失敗の記録として残すために呼ぶ。
    async fn release_guard(
        &self,
        collection: Collection,
        id: &str,
        field: &str,
    ) -> Result<(), InfraError>;
}

/// PostgreSQL 実装の DocumentStore
///
/// すべてのコレクションを `documents` テーブルの JSONB カラムに格納する。
#[derive(Debug, Clone)]
pub struct PostgresDocumentStore {
    pool: PgPool,
    feed: ChangeFeed,
}

impl PostgresDocumentStore {
    /// 新しいストアインスタンスを作成
    pub fn new(pool: PgPool, feed: ChangeFeed) -> Self {
        Self { pool, feed }
    }
}

#[async_trait]
impl DocumentStore for PostgresDocumentStore {
    #[tracing::instrument(skip(self), level = "debug")]
    async fn get(&self, collection: Collection, id: &str) -> Result<Option<Document>, InfraError> {
        let data: Option<Json<Fields>> = sqlx::query_scalar(
            r#"
            SELECT data
            FROM documents
            WHERE collection = $1 AND id = $2
            "#,
        )
        .bind(collection.name())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(data.map(|Json(data)| Document::new(id, data)))
    }

    #[tracing::instrument(skip(self, filter), level = "debug")]
    async fn query(
        &self,
        collection: Collection,
        filter: &Fields,
    ) -> Result<Vec<Document>, InfraError> {
        let rows: Vec<(String, Json<Fields>)> = sqlx::query_as(
            r#"
            SELECT id, data
            FROM documents
            WHERE collection = $1 AND data @> $2
            ORDER BY created_at, id
            "#,
        )
        .bind(collection.name())
        .bind(Json(Value::Object(filter.clone())))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(id, Json(data))| Document::new(id, data))
            .collect())
    }

    #[tracing::instrument(skip(self, data), level = "debug")]
    async fn create_with_id(
        &self,
        collection: Collection,
        id: &str,
        data: Fields,
    ) -> Result<Document, InfraError> {
        let result = sqlx::query(
            r#"
            INSERT INTO documents (collection, id, data)
            VALUES ($1, $2, $3)
            ON CONFLICT (collection, id) DO NOTHING
            "#,
        )
        .bind(collection.name())
        .bind(id)
        .bind(Json(Value::Object(data.clone())))
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(InfraError::conflict(collection.name(), id));
        }

        let document = Document::new(id, data);
        self.feed
            .publish(DocumentEvent::created(collection, &document));
        Ok(document)
    }

    #[tracing::instrument(skip(self, fields), level = "debug")]
    async fn update_fields(
        &self,
        collection: Collection,
        id: &str,
        fields: Fields,
    ) -> Result<DocumentChange, InfraError> {
        let mut tx = self.pool.begin().await?;

        let before: Option<Json<Fields>> = sqlx::query_scalar(
            r#"
            SELECT data
            FROM documents
            WHERE collection = $1 AND id = $2
            FOR UPDATE
            "#,
        )
        .bind(collection.name())
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(Json(before)) = before else {
            return Err(InfraError::not_found(collection.name(), id));
        };

        let mut after = before.clone();
        after.extend(fields);

        sqlx::query(
            r#"
            UPDATE documents
            SET data = $3, updated_at = now()
            WHERE collection = $1 AND id = $2
            "#,
        )
        .bind(collection.name())
        .bind(id)
        .bind(Json(Value::Object(after.clone())))
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        let change = DocumentChange {
            before: Document::new(id, before),
            after:  Document::new(id, after),
        };
        self.feed.publish(DocumentEvent::updated(collection, &change));
        Ok(change)
    }

    #[tracing::instrument(skip(self), level = "debug")]
    async fn claim_guard(
        &self,
        collection: Collection,
        id: &str,
        field: &str,
    ) -> Result<bool, InfraError> {
        let result = sqlx::query(
            r#"
            UPDATE documents
            SET data = data || jsonb_build_object($3::text, true, $4::text, to_jsonb(now())),
                updated_at = now()
            WHERE collection = $1
              AND id = $2
              AND NOT COALESCE(data -> $3::text = 'true'::jsonb, false)
            "#,
        )
        .bind(collection.name())
        .bind(id)
        .bind(field)
        .bind(guard_timestamp_field(field))
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    #[tracing::instrument(skip(self), level = "debug")]
    async fn release_guard(
        &self,
        collection: Collection,
        id: &str,
        field: &str,
    ) -> Result<(), InfraError> {
        sqlx::query(
            r#"
            UPDATE documents
            SET data = (data - $3::text) - $4::text,
                updated_at = now()
            WHERE collection = $1 AND id = $2
            "#,
        )
        .bind(collection.name())
        .bind(id)
        .bind(field)
        .bind(guard_timestamp_field(field))
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
