//! # 注文
//!
//! `orders` コレクションのドキュメントと、明細が参照する `products` を定義する。
//!
//! ## フィールドの揺れ
//!
//! | アクセサ | 優先 | フォールバック |
//! |---------|------|---------------|
//! | [`Order::contact_email`] | `customerEmail` | `userEmail` |
//! | [`Order::customer_name`] | `customerName` | `userName` |
//! | [`Order::amount`] | `subtotal` | `totalAmount` |

use serde::{Deserialize, Serialize};

use crate::{
    document::Document,
    lenient::{opt_address, opt_f64, opt_items, opt_object, opt_string, opt_u32},
    status::{OrderStatus, parse_status},
};

/// 注文明細
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OrderItem {
    #[serde(deserialize_with = "opt_string")]
    pub product_id: Option<String>,
    #[serde(deserialize_with = "opt_string")]
    pub name:       Option<String>,
    #[serde(deserialize_with = "opt_f64")]
    pub price:      Option<f64>,
    #[serde(deserialize_with = "opt_u32")]
    pub quantity:   Option<u32>,
    #[serde(deserialize_with = "opt_string")]
    pub image:      Option<String>,
}

/// 配送業者情報
///
/// `status = dispatched` と同時にのみ書き込まれる。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CourierDetails {
    #[serde(deserialize_with = "opt_string")]
    pub company:         Option<String>,
    #[serde(deserialize_with = "opt_string")]
    pub tracking_number: Option<String>,
}

impl CourierDetails {
    /// 業者名と追跡番号の両方が揃っているか
    pub fn is_complete(&self) -> bool {
        let present = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
        present(&self.company) && present(&self.tracking_number)
    }
}

/// 注文
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Order {
    #[serde(skip)]
    pub id:               String,
    #[serde(deserialize_with = "opt_string")]
    pub status:           Option<String>,
    #[serde(deserialize_with = "opt_items")]
    pub items:            Option<Vec<OrderItem>>,
    #[serde(deserialize_with = "opt_string")]
    pub customer_email:   Option<String>,
    #[serde(deserialize_with = "opt_string")]
    pub user_email:       Option<String>,
    #[serde(deserialize_with = "opt_string")]
    pub customer_name:    Option<String>,
    #[serde(deserialize_with = "opt_string")]
    pub user_name:        Option<String>,
    #[serde(deserialize_with = "opt_string")]
    pub customer_phone:   Option<String>,
    #[serde(deserialize_with = "opt_f64")]
    pub total_amount:     Option<f64>,
    #[serde(deserialize_with = "opt_f64")]
    pub subtotal:         Option<f64>,
    #[serde(deserialize_with = "opt_address")]
    pub shipping_address: Option<String>,
    #[serde(deserialize_with = "opt_string")]
    pub payment_method:   Option<String>,
    #[serde(deserialize_with = "opt_object")]
    pub courier_details:  Option<CourierDetails>,
    #[serde(deserialize_with = "opt_string")]
    pub created_at:       Option<String>,
}

impl Order {
    /// ドキュメントからデコードする
    pub fn from_document(document: &Document) -> Self {
        Self {
            id: document.id.clone(),
            ..crate::record::decode_fields(document)
        }
    }

    /// 通知先メールアドレス
    pub fn contact_email(&self) -> Option<&str> {
        self.customer_email
            .as_deref()
            .or(self.user_email.as_deref())
    }

    pub fn customer_name(&self) -> Option<&str> {
        self.customer_name.as_deref().or(self.user_name.as_deref())
    }

    /// 表示用の合計金額
    pub fn amount(&self) -> Option<f64> {
        self.subtotal.or(self.total_amount)
    }

    /// ステータス（未知の値は `None`）
    pub fn status(&self) -> Option<OrderStatus> {
        self.status.as_deref().and_then(parse_status)
    }

    /// 注文番号の短縮表記（ID の末尾 6 文字）
    pub fn short_ref(&self) -> String {
        short_ref(&self.id)
    }
}

/// ID の末尾 6 文字を返す
pub fn short_ref(id: &str) -> String {
    let chars: Vec<char> = id.chars().collect();
    let start = chars.len().saturating_sub(6);
    chars[start..].iter().collect()
}

/// 商品（読み取り専用）
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Product {
    #[serde(skip)]
    pub id:    String,
    #[serde(deserialize_with = "opt_string")]
    pub name:  Option<String>,
    #[serde(deserialize_with = "opt_string")]
    pub image: Option<String>,
    #[serde(deserialize_with = "opt_f64")]
    pub price: Option<f64>,
}

impl Product {
    pub fn from_document(document: &Document) -> Self {
        Self {
            id: document.id.clone(),
            ..crate::record::decode_fields(document)
        }
    }
}

/// メールに載せる注文明細行
///
/// 商品マスタで解決済みの値を優先し、無ければ注文時点の明細の値を使う。
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OrderLine {
    pub name:     Option<String>,
    pub image:    Option<String>,
    pub price:    Option<f64>,
    pub quantity: Option<u32>,
}

impl OrderLine {
    /// 商品マスタで解決した明細行
    pub fn resolved(item: &OrderItem, product: &Product) -> Self {
        Self {
            name:     product.name.clone().or_else(|| item.name.clone()),
            image:    product.image.clone().or_else(|| item.image.clone()),
            price:    item.price.or(product.price),
            quantity: item.quantity,
        }
    }

    /// 明細の値だけで作る明細行
    pub fn from_item(item: &OrderItem) -> Self {
        Self {
            name:     item.name.clone(),
            image:    item.image.clone(),
            price:    item.price,
            quantity: item.quantity,
        }
    }

    /// 単価 × 数量
    pub fn line_total(&self) -> Option<f64> {
        self.price
            .map(|price| price * f64::from(self.quantity.unwrap_or(1)))
    }
}
