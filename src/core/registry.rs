use crate::domain::model::{Taxonomy, TaxonomyName};
use crate::domain::ports::Catalog;
use std::sync::Arc;

/// Everything the admin screens and storefront need to know about one
/// attribute taxonomy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaxonomyBinding {
    taxonomy: Taxonomy,
    request_key: String,
    screen_id: String,
}

impl TaxonomyBinding {
    pub fn new(taxonomy: Taxonomy) -> Self {
        let request_key = taxonomy.name.request_key();
        let screen_id = taxonomy.name.screen_id();
        Self {
            taxonomy,
            request_key,
            screen_id,
        }
    }

    pub fn name(&self) -> &TaxonomyName {
        &self.taxonomy.name
    }

    pub fn label(&self) -> &str {
        &self.taxonomy.label
    }

    pub fn request_key(&self) -> &str {
        &self.request_key
    }

    pub fn screen_id(&self) -> &str {
        &self.screen_id
    }
}

/// Attribute taxonomies known at startup. Built once, never mutated.
#[derive(Debug, Clone, Default)]
pub struct AttributeRegistry {
    bindings: Arc<[TaxonomyBinding]>,
}

impl AttributeRegistry {
    pub fn from_catalog(catalog: &dyn Catalog) -> Self {
        Self::from_taxonomies(catalog.attribute_taxonomies())
    }

    pub fn from_taxonomies(mut taxonomies: Vec<Taxonomy>) -> Self {
        taxonomies.sort_by(|a, b| a.name.cmp(&b.name));
        taxonomies.dedup_by(|a, b| a.name == b.name);

        let bindings: Vec<TaxonomyBinding> =
            taxonomies.into_iter().map(TaxonomyBinding::new).collect();
        tracing::debug!(
            "Registered {} attribute taxonomies: {:?}",
            bindings.len(),
            bindings.iter().map(|b| b.name().as_str()).collect::<Vec<_>>()
        );

        Self {
            bindings: bindings.into(),
        }
    }

    pub fn bindings(&self) -> &[TaxonomyBinding] {
        &self.bindings
    }

    pub fn binding(&self, name: &str) -> Option<&TaxonomyBinding> {
        self.bindings.iter().find(|b| b.name().as_str() == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.binding(name).is_some()
    }

    /// Matches an admin screen id such as `edit-pa_color`.
    pub fn for_screen(&self, screen_id: &str) -> Option<&TaxonomyBinding> {
        self.bindings.iter().find(|b| b.screen_id() == screen_id)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
