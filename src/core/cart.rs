use crate::core::StockEngine;
use crate::domain::model::{CartLine, ProductId, StockCount, TermId};
use crate::utils::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// An add-to-cart attempt: the product, the quantity and the request
/// parameters carrying the chosen slug per attribute (`attribute_pa_color`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddToCart {
    pub product_id: ProductId,
    pub quantity: u32,
    #[serde(default)]
    pub variation_id: Option<ProductId>,
    #[serde(default)]
    pub request: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum CartVerdict {
    Accepted,
    Rejected {
        term_id: TermId,
        available: StockCount,
        in_cart: u64,
        message: String,
    },
}

impl CartVerdict {
    pub fn is_accepted(&self) -> bool {
        matches!(self, CartVerdict::Accepted)
    }
}

pub fn rejection_message(available: StockCount, term_name: &str, in_cart: u64) -> String {
    format!(
        "Only {} item(s) left for \"{}\". You already have {} in your cart.",
        available, term_name, in_cart
    )
}

/// Quantity already in the cart for the given attribute value.
pub fn reserved_quantity(cart: &[CartLine], request_key: &str, slug: &str) -> u64 {
    cart.iter()
        .filter(|line| line.variation.get(request_key).map(String::as_str) == Some(slug))
        .map(|line| u64::from(line.quantity))
        .sum()
}

impl StockEngine {
    /// Rejects the attempt when, for any tracked attribute value, the
    /// requested quantity plus what the cart already holds exceeds stock.
    /// Untracked values always pass.
    pub async fn validate_add_to_cart(
        &self,
        attempt: &AddToCart,
        cart: &[CartLine],
    ) -> Result<CartVerdict> {
        let Some(product) = self.catalog().product(attempt.product_id) else {
            tracing::debug!("Product {} unknown, nothing to check", attempt.product_id);
            return Ok(CartVerdict::Accepted);
        };

        for taxonomy in product.attributes.keys() {
            let Some(binding) = self.registry().binding(taxonomy.as_str()) else {
                continue;
            };
            let Some(slug) = attempt.request.get(binding.request_key()) else {
                continue;
            };
            let slug = slug.trim();
            let Some(term) = self.catalog().term_by_slug(taxonomy, slug) else {
                continue;
            };
            let Some(available) = self.store().term_stock(term.id).await? else {
                continue;
            };

            let in_cart = reserved_quantity(cart, binding.request_key(), slug);
            let requested = u64::from(attempt.quantity) + in_cart;

            if requested > u64::from(available.get()) {
                let message = rejection_message(available, &term.name, in_cart);
                tracing::info!(
                    "🛒 Add to cart rejected for product {}: {}",
                    attempt.product_id,
                    message
                );
                return Ok(CartVerdict::Rejected {
                    term_id: term.id,
                    available,
                    in_cart,
                    message,
                });
            }
        }

        Ok(CartVerdict::Accepted)
    }
}
