//! # ドキュメントとドキュメントイベント
//!
//! ドキュメントストアとの受け渡しに使う生の JSON 表現と、
//! 作成・更新トリガーに渡されるイベントを定義する。

use serde_json::{Map, Value};

use crate::collection::Collection;

/// ドキュメントのフィールド集合（トップレベルの JSON オブジェクト）
pub type Fields = Map<String, Value>;

/// ドキュメントストア上の 1 件のドキュメント
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id:   String,
    pub data: Fields,
}

impl Document {
    pub fn new(id: impl Into<String>, data: Fields) -> Self {
        Self {
            id: id.into(),
            data,
        }
    }

    /// 文字列フィールドを取得する（空白のみは未設定扱い）
    pub fn str_field(&self, field: &str) -> Option<&str> {
        self.data
            .get(field)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// 真偽値フィールドが `true` かどうか
    pub fn flag(&self, field: &str) -> bool {
        self.data.get(field).and_then(Value::as_bool).unwrap_or(false)
    }
}

/// 更新前後のドキュメント
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentChange {
    pub before: Document,
    pub after:  Document,
}

/// ドキュメントイベントの種類
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentEventKind {
    /// 作成
    Created { data: Fields },
    /// 更新（更新前イメージと更新後イメージ）
    Updated { before: Fields, after: Fields },
}

/// ドキュメントイベント
///
/// 書き込みが確定した後に発行される。トリガーは書き込みを取り消せない。
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentEvent {
    pub collection:  Collection,
    pub document_id: String,
    pub kind:        DocumentEventKind,
}

impl DocumentEvent {
    pub fn created(collection: Collection, document: &Document) -> Self {
        Self {
            collection,
            document_id: document.id.clone(),
            kind: DocumentEventKind::Created {
                data: document.data.clone(),
            },
        }
    }

    pub fn updated(collection: Collection, change: &DocumentChange) -> Self {
        Self {
            collection,
            document_id: change.after.id.clone(),
            kind: DocumentEventKind::Updated {
                before: change.before.data.clone(),
                after:  change.after.data.clone(),
            },
        }
    }
}

/// `serde_json::json!` で組み立てたオブジェクトを [`Fields`] に変換する
///
/// オブジェクト以外が渡された場合は空のフィールド集合を返す。
pub fn fields(value: Value) -> Fields {
    match value {
        Value::Object(map) => map,
        _ => Fields::new(),
    }
}
