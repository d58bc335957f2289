pub mod admin;
pub mod bulk;
pub mod cart;
pub mod csv_io;
pub mod disabler;
pub mod fulfillment;
pub mod registry;

pub use crate::domain::model::{StockChange, StockCount, TaxonomyName, TermId};
pub use crate::domain::ports::{Catalog, MetaStore};
pub use crate::utils::error::Result;
pub use registry::{AttributeRegistry, TaxonomyBinding};

use std::sync::Arc;

/// Shared handle over the metadata store, the catalog and the taxonomy
/// registry. Each component adds its operations in its own module.
#[derive(Clone)]
pub struct StockEngine {
    store: Arc<dyn MetaStore>,
    catalog: Arc<dyn Catalog>,
    registry: AttributeRegistry,
}

impl StockEngine {
    pub fn new(store: Arc<dyn MetaStore>, catalog: Arc<dyn Catalog>) -> Self {
        let registry = AttributeRegistry::from_catalog(catalog.as_ref());
        Self {
            store,
            catalog,
            registry,
        }
    }

    pub fn store(&self) -> &dyn MetaStore {
        self.store.as_ref()
    }

    pub fn catalog(&self) -> &dyn Catalog {
        self.catalog.as_ref()
    }

    pub fn registry(&self) -> &AttributeRegistry {
        &self.registry
    }
}

impl std::fmt::Debug for StockEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StockEngine")
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use crate::adapters::{MemoryCatalog, MemoryStore};
    use crate::domain::model::{Order, OrderId, OrderItem, Product, ProductId, ProductKind, Term};
    use std::collections::BTreeMap;

    pub fn color() -> TaxonomyName {
        TaxonomyName::new("pa_color").unwrap()
    }

    pub fn size() -> TaxonomyName {
        TaxonomyName::new("pa_size").unwrap()
    }

    fn term(id: u64, taxonomy: TaxonomyName, name: &str, slug: &str) -> Term {
        Term {
            id: TermId(id),
            taxonomy,
            name: name.to_string(),
            slug: slug.to_string(),
        }
    }

    fn product(id: u64, kind: ProductKind, attrs: &[(TaxonomyName, &[&str])]) -> Product {
        Product {
            id: ProductId(id),
            name: format!("Product {}", id),
            kind,
            attributes: attrs
                .iter()
                .map(|(t, slugs)| (t.clone(), slugs.iter().map(|s| s.to_string()).collect()))
                .collect(),
            custom_attributes: BTreeMap::new(),
        }
    }

    /// Terms: Red(12) Blue(13) Green(14) in pa_color, M(20) L(21) in pa_size.
    /// Product 4 is variable; 40 (red/m), 41 (blue/l) and 42 (green/m) are its variations.
    pub fn catalog() -> MemoryCatalog {
        let parent = ProductKind::Variation {
            parent: ProductId(4),
        };
        MemoryCatalog::new()
            .with_taxonomy(color(), "Color")
            .with_taxonomy(size(), "Size")
            .with_term(term(12, color(), "Red", "red"))
            .with_term(term(13, color(), "Blue", "blue"))
            .with_term(term(14, color(), "Green", "green"))
            .with_term(term(20, size(), "M", "m"))
            .with_term(term(21, size(), "L", "l"))
            .with_product(product(
                4,
                ProductKind::Variable,
                &[(color(), &["red", "blue", "green"][..]), (size(), &["m", "l"][..])],
            ))
            .with_product(product(
                40,
                parent.clone(),
                &[(color(), &["red"][..]), (size(), &["m"][..])],
            ))
            .with_product(product(
                41,
                parent.clone(),
                &[(color(), &["blue"][..]), (size(), &["l"][..])],
            ))
            .with_product(product(42, parent, &[(color(), &["green"][..]), (size(), &["m"][..])]))
            .with_product(product(7, ProductKind::Simple, &[]))
            .with_order(Order {
                id: OrderId(1001),
                items: vec![OrderItem {
                    product_id: ProductId(40),
                    quantity: 2,
                }],
            })
            .with_order(Order {
                id: OrderId(1002),
                items: vec![
                    OrderItem {
                        product_id: ProductId(40),
                        quantity: 1,
                    },
                    OrderItem {
                        product_id: ProductId(99),
                        quantity: 1,
                    },
                    OrderItem {
                        product_id: ProductId(41),
                        quantity: 5,
                    },
                ],
            })
    }

    pub fn engine() -> (StockEngine, MemoryStore) {
        let store = MemoryStore::new();
        let engine = StockEngine::new(Arc::new(store.clone()), Arc::new(catalog()));
        (engine, store)
    }

    pub async fn set(store: &MemoryStore, term: u64, stock: u32) {
        store
            .set_term_stock(TermId(term), Some(StockCount::new(stock)))
            .await
            .unwrap();
    }
}
