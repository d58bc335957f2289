use crate::core::StockEngine;
use crate::domain::model::{OrderId, OrderItem, StockChange};
use crate::utils::error::Result;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum FulfillmentOutcome {
    OrderNotFound,
    /// A previous delivery of the completion event already consumed stock.
    AlreadyApplied,
    Applied {
        changes: Vec<StockChange>,
        skipped_items: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FulfillmentReport {
    pub order_id: OrderId,
    #[serde(flatten)]
    pub outcome: FulfillmentOutcome,
}

impl StockEngine {
    /// Consumes attribute stock for a completed order, at most once per order.
    ///
    /// The order is claimed before any decrement, so a second delivery of the
    /// completion event (even a concurrent one) never decrements again. Line
    /// items that fail are logged and skipped; nothing is rolled back.
    pub async fn complete_order(&self, order_id: OrderId) -> Result<FulfillmentReport> {
        let Some(order) = self.catalog().order(order_id) else {
            tracing::warn!("⚠️ Order {} not found, no stock consumed", order_id);
            return Ok(FulfillmentReport {
                order_id,
                outcome: FulfillmentOutcome::OrderNotFound,
            });
        };

        if !self.store().claim_order(order_id).await? {
            tracing::info!("🔁 Order {} already consumed stock, skipping", order_id);
            return Ok(FulfillmentReport {
                order_id,
                outcome: FulfillmentOutcome::AlreadyApplied,
            });
        }

        let mut changes = Vec::new();
        let mut skipped_items = 0;
        for item in &order.items {
            match self.consume_item(item).await {
                Ok(Some(mut item_changes)) => changes.append(&mut item_changes),
                Ok(None) => skipped_items += 1,
                Err(e) => {
                    tracing::error!(
                        "❌ Order {}: stock update for product {} failed: {}",
                        order_id,
                        item.product_id,
                        e
                    );
                    skipped_items += 1;
                }
            }
        }

        tracing::info!(
            "✅ Order {}: {} attribute stock change(s), {} item(s) skipped",
            order_id,
            changes.len(),
            skipped_items
        );

        Ok(FulfillmentReport {
            order_id,
            outcome: FulfillmentOutcome::Applied {
                changes,
                skipped_items,
            },
        })
    }

    /// `None` when the item's product no longer exists.
    async fn consume_item(&self, item: &OrderItem) -> Result<Option<Vec<StockChange>>> {
        let Some(product) = self.catalog().product(item.product_id) else {
            tracing::debug!("Product {} missing, item skipped", item.product_id);
            return Ok(None);
        };
        if item.quantity == 0 {
            return Ok(Some(Vec::new()));
        }

        let mut changes = Vec::new();
        for (taxonomy, slug) in product.purchased_terms() {
            if !self.registry().contains(taxonomy.as_str()) {
                continue;
            }
            let Some(term) = self.catalog().term_by_slug(taxonomy, slug) else {
                tracing::debug!("No term '{}' in {}, skipped", slug, taxonomy);
                continue;
            };

            if let Some(change) = self
                .store()
                .decrement_term_stock(term.id, item.quantity)
                .await?
            {
                tracing::debug!(
                    "{} '{}': {} -> {}",
                    taxonomy,
                    term.name,
                    change.before,
                    change.after
                );
                changes.push(change);
            }
        }
        Ok(Some(changes))
    }
}
