use crate::core::StockEngine;
use crate::domain::model::{ProductId, TaxonomyName};
use crate::utils::error::Result;
use crate::utils::html::script_safe_json;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// taxonomy -> slugs to disable on the product page
pub type DisabledTerms = BTreeMap<TaxonomyName, Vec<String>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptTiming {
    pub poll_interval_ms: u64,
    pub timeout_ms: u64,
}

impl Default for ScriptTiming {
    fn default() -> Self {
        Self {
            poll_interval_ms: 1000,
            timeout_ms: 5000,
        }
    }
}

impl StockEngine {
    /// Out-of-stock attribute values of a variable product. `None` for
    /// missing or non-variable products.
    pub async fn disabled_terms(&self, product_id: ProductId) -> Result<Option<DisabledTerms>> {
        let Some(product) = self.catalog().product(product_id) else {
            return Ok(None);
        };
        if !product.is_variable() {
            return Ok(None);
        }

        let mut disabled = DisabledTerms::new();
        for binding in self.registry().bindings() {
            for term in self.catalog().product_terms(product_id, binding.name()) {
                let stock = self.store().term_stock(term.id).await?;
                if stock.is_some_and(|s| s.is_out_of_stock()) {
                    disabled
                        .entry(binding.name().clone())
                        .or_default()
                        .push(term.slug);
                }
            }
        }
        Ok(Some(disabled))
    }

    /// Markup appended to the product page footer; `None` when nothing is disabled.
    pub async fn storefront_markup(
        &self,
        product_id: ProductId,
        timing: ScriptTiming,
    ) -> Result<Option<String>> {
        let disabled = match self.disabled_terms(product_id).await? {
            Some(disabled) if !disabled.is_empty() => disabled,
            _ => return Ok(None),
        };
        tracing::debug!(
            "Product {}: disabling {} attribute value(s)",
            product_id,
            disabled.values().map(Vec::len).sum::<usize>()
        );
        render_script(&disabled, timing).map(Some)
    }
}

pub fn render_script(disabled: &DisabledTerms, timing: ScriptTiming) -> Result<String> {
    let payload = script_safe_json(&serde_json::to_string(disabled)?);

    Ok(format!(
        r#"<script defer>
    function attrStockDisableOptions() {{
        const disabledTerms = {payload};

        Object.entries(disabledTerms).forEach(([taxonomy, slugs]) => {{
            slugs.forEach(slug => {{
                const select = document.querySelector(`select[name="attribute_${{taxonomy}}"]`);
                if (select) {{
                    const option = select.querySelector(`option[value="${{slug}}"]`);
                    if (option) {{
                        option.disabled = true;
                        if (option.text.indexOf('(Out of stock)') === -1) {{
                            option.text = option.text + ' (Out of stock)';
                        }}
                    }}
                }}

                const swatch = document.querySelector(`[data-attribute_name="attribute_${{taxonomy}}"] [data-value="${{slug}}"]`);
                if (swatch) {{
                    swatch.classList.add('disabled');
                    swatch.style.pointerEvents = 'none';
                    swatch.style.opacity = 0.4;
                    swatch.title = 'Out of stock';
                }}
            }});
        }});
    }}

    jQuery('form.variations_form.cart').on('update_variation_values', function() {{
        const attrStockInterval = setInterval(attrStockDisableOptions, {interval});
        setTimeout(function() {{
            clearInterval(attrStockInterval);
        }}, {timeout});
    }});
</script>
<style>
    .disabled {{
        opacity: 0.4 !important;
        pointer-events: none !important;
    }}
</style>
"#,
        payload = payload,
        interval = timing.poll_interval_ms,
        timeout = timing.timeout_ms,
    ))
}
