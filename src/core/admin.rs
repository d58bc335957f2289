use crate::core::bulk::{BULK_ACTION, BULK_ACTION_LABEL, BULK_STOCK_FIELD, TERM_SELECTION_FIELD};
use crate::core::{StockEngine, TaxonomyBinding};
use crate::domain::model::{format_stock, StockCount, TaxonomyName, Term, TermId};
use crate::utils::error::{Result, StockError};
use crate::utils::html::escape;

pub const STOCK_FIELD: &str = "stock_count";
pub const STOCK_COLUMN: &str = "stock_count";
pub const STOCK_LABEL: &str = "Stock Count";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The form did not carry the field.
    Unchanged,
    Set(StockCount),
    Cleared,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermRow {
    pub term: Term,
    pub stock: Option<StockCount>,
}

pub fn column_header() -> (&'static str, &'static str) {
    (STOCK_COLUMN, STOCK_LABEL)
}

/// Field shown on the "add term" form.
pub fn add_form_field() -> String {
    format!(
        r#"<div class="form-field term-group">
    <label for="{field}">{label}</label>
    <input type="number" min="0" step="1" name="{field}" id="{field}" value="">
</div>"#,
        field = STOCK_FIELD,
        label = STOCK_LABEL
    )
}

fn edit_row(stock: Option<StockCount>) -> String {
    format!(
        r#"<tr class="form-field term-group-wrap">
    <th scope="row"><label for="{field}">{label}</label></th>
    <td><input type="number" min="0" step="1" name="{field}" id="{field}" value="{value}"></td>
</tr>"#,
        field = STOCK_FIELD,
        label = STOCK_LABEL,
        value = escape(&format_stock(stock))
    )
}

impl StockEngine {
    fn require_term(&self, term_id: TermId) -> Result<Term> {
        self.catalog()
            .term(term_id)
            .ok_or_else(|| StockError::not_found("Term", term_id))
    }

    /// Field shown on the "edit term" form, pre-filled from the store.
    pub async fn edit_form_field(&self, term_id: TermId) -> Result<String> {
        let stock = self.store().term_stock(term_id).await?;
        Ok(edit_row(stock))
    }

    pub async fn column_value(&self, term_id: TermId) -> Result<String> {
        let stock = self.store().term_stock(term_id).await?;
        Ok(escape(&format_stock(stock)))
    }

    /// Persists the submitted field on term create/update.
    pub async fn save_field(
        &self,
        term_id: TermId,
        submitted: Option<&str>,
    ) -> Result<SaveOutcome> {
        let Some(raw) = submitted else {
            return Ok(SaveOutcome::Unchanged);
        };
        let term = self.require_term(term_id)?;

        let stock = StockCount::parse_input(STOCK_FIELD, raw).map_err(|e| {
            tracing::warn!(
                "⚠️ Rejected stock value for term {} ({}): {}",
                term.id,
                term.name,
                e
            );
            e
        })?;

        self.store().set_term_stock(term_id, stock).await?;
        tracing::info!(
            "📝 Stock for {} '{}' set to {}",
            term.taxonomy,
            term.name,
            stock.map(|s| s.to_string()).unwrap_or_else(|| "untracked".into())
        );

        Ok(match stock {
            Some(stock) => SaveOutcome::Set(stock),
            None => SaveOutcome::Cleared,
        })
    }

    pub async fn term_rows(&self, taxonomy: &TaxonomyName) -> Result<Vec<TermRow>> {
        let mut rows = Vec::new();
        for term in self.catalog().terms(taxonomy) {
            let stock = self.store().term_stock(term.id).await?;
            rows.push(TermRow { term, stock });
        }
        Ok(rows)
    }
}

/// Term list screen with the stock column and the bulk action.
pub fn render_term_list(
    binding: &TaxonomyBinding,
    rows: &[TermRow],
    notice: Option<&str>,
) -> String {
    let (column, header) = column_header();
    let base = format!("/admin/attributes/{}/terms", binding.name());

    let mut body = String::new();
    for row in rows {
        let id = row.term.id;
        let value = escape(&format_stock(row.stock));
        body.push_str(&format!(
            r#"<tr id="tag-{id}">
    <th scope="row" class="check-column"><input type="checkbox" name="{select}" value="{id}"></th>
    <td class="name column-name"><a href="{base}/{id}/edit">{name}</a></td>
    <td class="slug column-slug">{slug}</td>
    <td class="{column} column-{column}">{value}</td>
    <td class="row-actions"><a class="editinline" href="{base}/{id}/edit">Quick Edit</a></td>
</tr>
"#,
            id = id,
            select = TERM_SELECTION_FIELD,
            base = base,
            name = escape(&row.term.name),
            slug = escape(&row.term.slug),
            column = column,
            value = value,
        ));
    }

    format!(
        r#"<!DOCTYPE html>
<html><head><title>{label}</title><style>.column-{column} {{ width: 8em; }}</style></head>
<body class="{screen}">
<div class="wrap">
<h1>{label}</h1>
{notice}
<form method="post" action="{base}/bulk">
<div class="tablenav top">
    <select name="action">
        <option value="-1">Bulk actions</option>
        <option value="{bulk}">{bulk_label}</option>
    </select>
    <label><strong>{header}:</strong> <input type="number" name="{bulk_field}" min="0" step="1" style="width: 100px;"></label>
    <button type="submit">Apply</button>
</div>
<table class="wp-list-table widefat">
<thead><tr><td></td><th>Name</th><th>Slug</th><th class="column-{column}">{header}</th><th></th></tr></thead>
<tbody>
{body}</tbody>
</table>
</form>
</div>
</body></html>
"#,
        label = escape(binding.label()),
        screen = binding.screen_id(),
        notice = notice.unwrap_or(""),
        base = base,
        bulk = BULK_ACTION,
        bulk_label = BULK_ACTION_LABEL,
        header = header,
        bulk_field = BULK_STOCK_FIELD,
        column = column,
        body = body,
    )
}

pub fn render_edit_page(binding: &TaxonomyBinding, term: &Term, field: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html><head><title>Edit {name}</title></head>
<body class="{screen}">
<div class="wrap">
<h1>Edit {label}: {name}</h1>
<form method="post" action="/admin/attributes/{taxonomy}/terms/{id}">
<table class="form-table">
{field}
</table>
<button type="submit">Update</button>
</form>
</div>
</body></html>
"#,
        name = escape(&term.name),
        label = escape(binding.label()),
        screen = binding.screen_id(),
        taxonomy = binding.name(),
        id = term.id,
        field = field,
    )
}
