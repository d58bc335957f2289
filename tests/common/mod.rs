#![allow(dead_code)]

use attr_stock::adapters::catalog_file::parse_catalog;
use attr_stock::adapters::MemoryStore;
use attr_stock::domain::model::{StockCount, TermId};
use attr_stock::domain::ports::MetaStore;
use attr_stock::StockEngine;
use std::sync::Arc;

pub const CATALOG: &str = r#"{
    "taxonomies": [
        {"name": "pa_color", "label": "Color"},
        {"name": "pa_size", "label": "Size"}
    ],
    "terms": [
        {"id": 12, "taxonomy": "pa_color", "name": "Red", "slug": "red"},
        {"id": 13, "taxonomy": "pa_color", "name": "Blue", "slug": "blue"},
        {"id": 14, "taxonomy": "pa_color", "name": "Green", "slug": "green"},
        {"id": 20, "taxonomy": "pa_size", "name": "M", "slug": "m"},
        {"id": 21, "taxonomy": "pa_size", "name": "L", "slug": "l"}
    ],
    "products": [
        {"id": 4, "name": "Tee", "kind": {"type": "variable"},
         "attributes": {"pa_color": ["red", "blue", "green"], "pa_size": ["m", "l"]},
         "custom_attributes": {"Material": "Cotton"}},
        {"id": 40, "name": "Tee - Red M", "kind": {"type": "variation", "parent": 4},
         "attributes": {"pa_color": ["red"], "pa_size": ["m"]}},
        {"id": 41, "name": "Tee - Blue L", "kind": {"type": "variation", "parent": 4},
         "attributes": {"pa_color": ["blue"], "pa_size": ["l"]}},
        {"id": 7, "name": "Gift card", "kind": {"type": "simple"}}
    ],
    "orders": [
        {"id": 1001, "items": [{"product_id": 40, "quantity": 2}]},
        {"id": 1002, "items": [
            {"product_id": 40, "quantity": 1},
            {"product_id": 41, "quantity": 1}
        ]}
    ]
}"#;

pub fn engine() -> (StockEngine, MemoryStore) {
    let catalog = parse_catalog(CATALOG.as_bytes()).expect("test catalog parses");
    let store = MemoryStore::new();
    let engine = StockEngine::new(Arc::new(store.clone()), Arc::new(catalog));
    (engine, store)
}

pub async fn set_stock(store: &MemoryStore, term: u64, stock: u32) {
    store
        .set_term_stock(TermId(term), Some(StockCount::new(stock)))
        .await
        .unwrap();
}

pub async fn stock(store: &MemoryStore, term: u64) -> Option<u32> {
    store
        .term_stock(TermId(term))
        .await
        .unwrap()
        .map(StockCount::get)
}
