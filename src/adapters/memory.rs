use crate::domain::model::{
    Order, OrderId, OrderStockState, Product, ProductId, StockChange, StockCount, Taxonomy,
    TaxonomyName, Term, TermId,
};
use crate::domain::ports::{Catalog, MetaStore};
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Everything the store persists: one stock value per term, one state token per order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaSnapshot {
    #[serde(default)]
    pub term_stock: BTreeMap<TermId, StockCount>,
    #[serde(default)]
    pub orders: BTreeMap<OrderId, OrderStockState>,
}

impl MetaSnapshot {
    pub fn set(&mut self, term_id: TermId, stock: Option<StockCount>) {
        match stock {
            Some(stock) => {
                self.term_stock.insert(term_id, stock);
            }
            None => {
                self.term_stock.remove(&term_id);
            }
        }
    }

    pub fn decrement(&mut self, term_id: TermId, quantity: u32) -> Option<StockChange> {
        let current = self.term_stock.get_mut(&term_id)?;
        let before = *current;
        *current = before.saturating_sub(quantity);
        Some(StockChange {
            term_id,
            before,
            after: *current,
        })
    }

    pub fn order_state(&self, order_id: OrderId) -> OrderStockState {
        self.orders
            .get(&order_id)
            .copied()
            .unwrap_or(OrderStockState::Pending)
    }

    pub fn claim(&mut self, order_id: OrderId) -> bool {
        if self.order_state(order_id).is_applied() {
            return false;
        }
        self.orders
            .insert(order_id, OrderStockState::Applied { at: Utc::now() });
        true
    }
}

/// Process-local store; the lock is held across every read-modify-write.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<MetaSnapshot>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn snapshot(&self) -> MetaSnapshot {
        self.inner.lock().await.clone()
    }
}

#[async_trait]
impl MetaStore for MemoryStore {
    async fn term_stock(&self, term_id: TermId) -> Result<Option<StockCount>> {
        Ok(self.inner.lock().await.term_stock.get(&term_id).copied())
    }

    async fn set_term_stock(&self, term_id: TermId, stock: Option<StockCount>) -> Result<()> {
        self.inner.lock().await.set(term_id, stock);
        Ok(())
    }

    async fn decrement_term_stock(
        &self,
        term_id: TermId,
        quantity: u32,
    ) -> Result<Option<StockChange>> {
        Ok(self.inner.lock().await.decrement(term_id, quantity))
    }

    async fn order_state(&self, order_id: OrderId) -> Result<OrderStockState> {
        Ok(self.inner.lock().await.order_state(order_id))
    }

    async fn claim_order(&self, order_id: OrderId) -> Result<bool> {
        Ok(self.inner.lock().await.claim(order_id))
    }
}

/// In-memory catalog, loaded from a catalog file or assembled in tests.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryCatalog {
    #[serde(default)]
    taxonomies: Vec<Taxonomy>,
    #[serde(default)]
    terms: Vec<Term>,
    #[serde(default)]
    products: Vec<Product>,
    #[serde(default)]
    orders: Vec<Order>,
    #[serde(skip)]
    product_index: HashMap<ProductId, usize>,
    #[serde(skip)]
    order_index: HashMap<OrderId, usize>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_taxonomy(mut self, name: TaxonomyName, label: &str) -> Self {
        self.taxonomies.push(Taxonomy {
            name,
            label: label.to_string(),
        });
        self
    }

    pub fn with_term(mut self, term: Term) -> Self {
        self.terms.push(term);
        self
    }

    pub fn with_product(mut self, product: Product) -> Self {
        self.product_index.insert(product.id, self.products.len());
        self.products.push(product);
        self
    }

    pub fn with_order(mut self, order: Order) -> Self {
        self.order_index.insert(order.id, self.orders.len());
        self.orders.push(order);
        self
    }

    /// Rebuilds lookup indexes after deserialization. Later entries win on duplicate ids.
    pub fn reindex(mut self) -> Self {
        self.product_index = self
            .products
            .iter()
            .enumerate()
            .map(|(i, p)| (p.id, i))
            .collect();
        self.order_index = self
            .orders
            .iter()
            .enumerate()
            .map(|(i, o)| (o.id, i))
            .collect();
        self
    }

    pub fn term_count(&self) -> usize {
        self.terms.len()
    }
}

impl Catalog for MemoryCatalog {
    fn attribute_taxonomies(&self) -> Vec<Taxonomy> {
        self.taxonomies.clone()
    }

    fn terms(&self, taxonomy: &TaxonomyName) -> Vec<Term> {
        self.terms
            .iter()
            .filter(|t| &t.taxonomy == taxonomy)
            .cloned()
            .collect()
    }

    fn term(&self, term_id: TermId) -> Option<Term> {
        self.terms.iter().find(|t| t.id == term_id).cloned()
    }

    fn term_by_slug(&self, taxonomy: &TaxonomyName, slug: &str) -> Option<Term> {
        self.terms
            .iter()
            .find(|t| &t.taxonomy == taxonomy && t.slug == slug)
            .cloned()
    }

    fn product(&self, product_id: ProductId) -> Option<Product> {
        self.product_index
            .get(&product_id)
            .and_then(|&i| self.products.get(i))
            .cloned()
    }

    fn order(&self, order_id: OrderId) -> Option<Order> {
        self.order_index
            .get(&order_id)
            .and_then(|&i| self.orders.get(i))
            .cloned()
    }
}
