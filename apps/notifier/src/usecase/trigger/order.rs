//! 注文トリガー
//!
//! 作成時は顧客への受付メールと事業者へのアラートを、
//! ステータス変更時は新しいステータスに対応するメールを 1 通送る。

use pawcare_domain::{
    collection::Collection,
    notification::{Notification, OrderStatusNotice},
    order::{Order, OrderItem, OrderLine, Product},
};
use pawcare_shared::{event_log::event, log_business_event};

use super::NotificationTriggers;

impl NotificationTriggers {
    pub(super) async fn on_order_created(&self, order: Order) {
        let Some(recipient) = order.contact_email().map(str::to_string) else {
            tracing::info!(order_id = %order.id, "連絡先メールアドレスが無いため注文通知をスキップ");
            return;
        };
        let Some(items) = order.items.as_deref() else {
            tracing::warn!(order_id = %order.id, "items が無いため注文通知をスキップ");
            return;
        };

        let lines = self.resolve_order_lines(&order.id, items).await;

        self.mailer
            .deliver(Notification::OrderPlaced {
                recipient,
                order: order.clone(),
                lines: lines.clone(),
            })
            .await;
        self.mailer
            .deliver(Notification::NewOrderAlert {
                recipient: self.business_email.clone(),
                order,
                lines,
            })
            .await;
    }

    pub(super) async fn on_order_status_changed(&self, order: Order) {
        let Some(notice) = order.status().and_then(OrderStatusNotice::from_status) else {
            return;
        };
        let Some(recipient) = order.contact_email().map(str::to_string) else {
            tracing::info!(order_id = %order.id, "連絡先メールアドレスが無いためステータス通知をスキップ");
            return;
        };

        self.mailer
            .deliver(Notification::OrderStatusChanged {
                recipient,
                notice,
                order,
            })
            .await;
    }

    /// 注文明細を商品情報で補完する
    ///
    /// `productId` が空の明細と、商品が見つからない明細は除外してログに残す。
    async fn resolve_order_lines(&self, order_id: &str, items: &[OrderItem]) -> Vec<OrderLine> {
        let mut lines = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            let Some(product_id) = item
                .product_id
                .as_deref()
                .map(str::trim)
                .filter(|id| !id.is_empty())
            else {
                log_business_event!(
                    event.category = event::category::NOTIFICATION,
                    event.action = event::action::ORDER_ITEM_SKIPPED,
                    event.entity_type = event::entity_type::ORDER,
                    event.entity_id = %order_id,
                    event.result = event::result::SKIPPED,
                    item_index = index,
                    "productId が無い明細を除外"
                );
                continue;
            };

            match self.store.get(Collection::Products, product_id).await {
                Ok(Some(document)) => {
                    lines.push(OrderLine::resolved(item, &Product::from_document(&document)));
                }
                Ok(None) => {
                    log_business_event!(
                        event.category = event::category::NOTIFICATION,
                        event.action = event::action::ORDER_ITEM_SKIPPED,
                        event.entity_type = event::entity_type::ORDER,
                        event.entity_id = %order_id,
                        event.result = event::result::SKIPPED,
                        item_index = index,
                        product_id = %product_id,
                        "商品が見つからない明細を除外"
                    );
                }
                Err(e) => {
                    tracing::error!(
                        order_id = %order_id,
                        product_id = %product_id,
                        "商品の取得に失敗したため明細を除外: {}",
                        e
                    );
                }
            }
        }
        lines
    }
}
