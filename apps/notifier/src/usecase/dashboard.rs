//! # 注文ダッシュボード
//!
//! 管理画面向けにステータス別の注文件数と配達済み売上を集計する。

use std::{collections::BTreeMap, sync::Arc};

use pawcare_domain::{
    collection::Collection,
    document::Fields,
    money::format_rupees,
    order::Order,
    status::{OrderStatus, StatusLifecycle},
};
use pawcare_infra::DocumentStore;
use serde::Serialize;

use crate::error::NotifierError;

/// 注文サマリー
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummary {
    pub total_orders:            usize,
    /// ステータス文字列ごとの件数。認識できないステータスはそのままのキーで数える
    pub by_status:               BTreeMap<String, usize>,
    pub delivered_revenue:       f64,
    pub delivered_revenue_label: String,
}

/// 注文ダッシュボードユースケース
pub struct DashboardUseCaseImpl {
    store: Arc<dyn DocumentStore>,
}

impl DashboardUseCaseImpl {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn order_summary(&self) -> Result<OrderSummary, NotifierError> {
        let documents = self.store.query(Collection::Orders, &Fields::new()).await?;
        let orders: Vec<Order> = documents.iter().map(Order::from_document).collect();

        let mut by_status = BTreeMap::new();
        let mut delivered_revenue = 0.0;
        for order in &orders {
            let key = order
                .status
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .unwrap_or(OrderStatus::Pending.as_str())
                .to_string();
            *by_status.entry(key).or_insert(0) += 1;

            if order.status() == Some(OrderStatus::Delivered) {
                delivered_revenue += order.amount().unwrap_or(0.0);
            }
        }

        Ok(OrderSummary {
            total_orders: orders.len(),
            by_status,
            delivered_revenue,
            delivered_revenue_label: format_rupees(delivered_revenue),
        })
    }
}
