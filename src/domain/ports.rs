use crate::domain::model::{
    Order, OrderId, OrderStockState, Product, ProductId, StockChange, StockCount, Taxonomy,
    TaxonomyName, Term, TermId,
};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Key/value metadata attached to terms and orders.
///
/// Implementations must make `decrement_term_stock` and `claim_order`
/// atomic with respect to concurrent callers.
#[async_trait]
pub trait MetaStore: Send + Sync {
    async fn term_stock(&self, term_id: TermId) -> Result<Option<StockCount>>;

    /// `None` clears the value, leaving the term untracked.
    async fn set_term_stock(&self, term_id: TermId, stock: Option<StockCount>) -> Result<()>;

    /// Subtracts `quantity`, clamping at zero. Returns `None` for untracked terms.
    async fn decrement_term_stock(
        &self,
        term_id: TermId,
        quantity: u32,
    ) -> Result<Option<StockChange>>;

    async fn order_state(&self, order_id: OrderId) -> Result<OrderStockState>;

    /// Moves the order from `Pending` to `Applied`. Only the first caller gets `true`.
    async fn claim_order(&self, order_id: OrderId) -> Result<bool>;
}

/// Read-only view of the storefront's taxonomy, product and order data.
pub trait Catalog: Send + Sync {
    fn attribute_taxonomies(&self) -> Vec<Taxonomy>;
    fn terms(&self, taxonomy: &TaxonomyName) -> Vec<Term>;
    fn term(&self, term_id: TermId) -> Option<Term>;
    fn term_by_slug(&self, taxonomy: &TaxonomyName, slug: &str) -> Option<Term>;
    fn product(&self, product_id: ProductId) -> Option<Product>;
    fn order(&self, order_id: OrderId) -> Option<Order>;

    /// Terms of `taxonomy` assigned to the product, in the order the product lists them.
    fn product_terms(&self, product_id: ProductId, taxonomy: &TaxonomyName) -> Vec<Term> {
        let Some(product) = self.product(product_id) else {
            return Vec::new();
        };
        product
            .attributes
            .get(taxonomy)
            .map(|slugs| {
                slugs
                    .iter()
                    .filter_map(|slug| self.term_by_slug(taxonomy, slug))
                    .collect()
            })
            .unwrap_or_default()
    }
}
