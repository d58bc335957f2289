use crate::utils::error::{Result, StockError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

macro_rules! numeric_id {
    ($name:ident, $field:literal) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            pub fn parse(raw: &str) -> Result<Self> {
                crate::utils::validation::parse_numeric_id($field, raw).map($name)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

numeric_id!(TermId, "term_id");
numeric_id!(ProductId, "product_id");
numeric_id!(OrderId, "order_id");

/// Name of an attribute taxonomy, always carrying the `pa_` prefix.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TaxonomyName(String);

impl TaxonomyName {
    pub const PREFIX: &'static str = "pa_";

    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        let rest = name.strip_prefix(Self::PREFIX).unwrap_or("");
        if rest.is_empty()
            || !rest
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-')
        {
            return Err(StockError::validation(
                "taxonomy",
                &name,
                "Attribute taxonomies are named pa_<attribute> in lowercase",
            ));
        }
        Ok(Self(name))
    }

    /// `color` -> `pa_color`
    pub fn from_attribute(attribute: &str) -> Result<Self> {
        Self::new(format!("{}{}", Self::PREFIX, attribute.trim().to_lowercase()))
    }

    pub fn is_attribute_taxonomy(raw: &str) -> bool {
        raw.starts_with(Self::PREFIX)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Key under which the storefront submits the chosen slug.
    pub fn request_key(&self) -> String {
        format!("attribute_{}", self.0)
    }

    pub fn screen_id(&self) -> String {
        format!("edit-{}", self.0)
    }
}

impl TryFrom<String> for TaxonomyName {
    type Error = StockError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<TaxonomyName> for String {
    fn from(value: TaxonomyName) -> Self {
        value.0
    }
}

impl fmt::Display for TaxonomyName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A tracked stock level. Absence (`Option::None`) means unlimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StockCount(u32);

impl StockCount {
    pub const ZERO: StockCount = StockCount(0);

    pub fn new(value: u32) -> Self {
        Self(value)
    }

    pub fn get(self) -> u32 {
        self.0
    }

    /// Parses a stock value at ingress. Blank input means "not tracked";
    /// anything that is not a non-negative integer is rejected.
    pub fn parse_input(field: &str, raw: &str) -> Result<Option<StockCount>> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }

        let digits = trimmed.strip_prefix('+').unwrap_or(trimmed);
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            let reason = if trimmed.starts_with('-') {
                "Stock cannot be negative"
            } else {
                "Stock must be a whole number"
            };
            return Err(StockError::validation(field, raw, reason));
        }

        digits
            .parse::<u32>()
            .map(|v| Some(StockCount(v)))
            .map_err(|_| StockError::validation(field, raw, "Stock value is too large"))
    }

    pub fn saturating_sub(self, quantity: u32) -> StockCount {
        StockCount(self.0.saturating_sub(quantity))
    }

    pub fn is_out_of_stock(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for StockCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Renders an optional stock level the way forms and CSV cells carry it.
pub fn format_stock(stock: Option<StockCount>) -> String {
    stock.map(|s| s.to_string()).unwrap_or_default()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Taxonomy {
    pub name: TaxonomyName,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term {
    pub id: TermId,
    pub taxonomy: TaxonomyName,
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProductKind {
    Simple,
    Variable,
    Variation { parent: ProductId },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub kind: ProductKind,
    /// Taxonomy attributes: a variation carries one slug per taxonomy,
    /// a variable product lists every slug it offers.
    #[serde(default)]
    pub attributes: BTreeMap<TaxonomyName, Vec<String>>,
    /// Free-text attributes; never stock tracked.
    #[serde(default)]
    pub custom_attributes: BTreeMap<String, String>,
}

impl Product {
    pub fn is_variable(&self) -> bool {
        matches!(self.kind, ProductKind::Variable)
    }

    /// The (taxonomy, slug) pairs a purchase of this product consumes.
    pub fn purchased_terms(&self) -> impl Iterator<Item = (&TaxonomyName, &str)> {
        self.attributes
            .iter()
            .filter_map(|(taxonomy, slugs)| slugs.first().map(|slug| (taxonomy, slug.as_str())))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: ProductId,
    pub quantity: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    #[serde(default)]
    pub items: Vec<OrderItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: ProductId,
    #[serde(default)]
    pub variation_id: Option<ProductId>,
    pub quantity: u32,
    /// request key (`attribute_pa_color`) -> chosen slug
    #[serde(default)]
    pub variation: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum OrderStockState {
    Pending,
    Applied { at: DateTime<Utc> },
}

impl OrderStockState {
    pub fn is_applied(&self) -> bool {
        matches!(self, OrderStockState::Applied { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockChange {
    pub term_id: TermId,
    pub before: StockCount,
    pub after: StockCount,
}
