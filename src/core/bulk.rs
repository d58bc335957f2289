use crate::core::admin::{STOCK_FIELD, STOCK_LABEL};
use crate::core::StockEngine;
use crate::domain::model::{StockCount, TaxonomyName, TermId};
use crate::utils::error::{Result, StockError};
use serde::Serialize;
use url::Url;

pub const BULK_ACTION: &str = "update_stock_count";
pub const BULK_ACTION_LABEL: &str = "Update Stock Count";
pub const BULK_STOCK_FIELD: &str = "bulk_stock_count";
pub const TERM_SELECTION_FIELD: &str = "delete_tags[]";
pub const UPDATED_PARAM: &str = "bulk_stock_updated";

/// Submission of the term list form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkRequest {
    pub action: Option<String>,
    pub action2: Option<String>,
    pub term_ids: Vec<String>,
    pub stock: Option<String>,
}

impl BulkRequest {
    /// Builds the request from decoded form pairs; selection keys may repeat.
    pub fn from_form<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut request = BulkRequest::default();
        for (key, value) in pairs {
            match key.as_ref() {
                "action" => request.action = Some(value.into()),
                "action2" => request.action2 = Some(value.into()),
                "delete_tags" | TERM_SELECTION_FIELD => request.term_ids.push(value.into()),
                BULK_STOCK_FIELD => request.stock = Some(value.into()),
                _ => {}
            }
        }
        request
    }

    /// Either action selector (top or bottom of the table) may carry it.
    pub fn is_stock_action(&self) -> bool {
        self.action.as_deref() == Some(BULK_ACTION) || self.action2.as_deref() == Some(BULK_ACTION)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BulkOutcome {
    pub stock: StockCount,
    pub updated: usize,
    pub skipped_ids: Vec<String>,
}

impl StockEngine {
    /// Applies one stock value to every selected term of `taxonomy`.
    ///
    /// Returns `None` when the submission is not a stock update (another
    /// bulk action, no selection, or no stock field). Selected ids that are
    /// not numeric or not terms of `taxonomy` are skipped.
    pub async fn apply_bulk(
        &self,
        taxonomy: &TaxonomyName,
        request: &BulkRequest,
    ) -> Result<Option<BulkOutcome>> {
        if !request.is_stock_action() || request.term_ids.is_empty() {
            return Ok(None);
        }
        let Some(raw_stock) = request.stock.as_deref() else {
            return Ok(None);
        };

        let stock = StockCount::parse_input(BULK_STOCK_FIELD, raw_stock)?.ok_or_else(|| {
            StockError::validation(BULK_STOCK_FIELD, raw_stock, "A stock value is required")
        })?;

        let mut outcome = BulkOutcome {
            stock,
            updated: 0,
            skipped_ids: Vec::new(),
        };

        for raw_id in &request.term_ids {
            let term_id = match TermId::parse(raw_id) {
                Ok(term_id) => term_id,
                Err(e) => {
                    tracing::warn!("⚠️ Skipping bulk selection: {}", e);
                    outcome.skipped_ids.push(raw_id.clone());
                    continue;
                }
            };
            let Some(term) = self
                .catalog()
                .term(term_id)
                .filter(|term| &term.taxonomy == taxonomy)
            else {
                tracing::warn!(
                    "⚠️ Skipping bulk selection: term {} is not in {}",
                    term_id,
                    taxonomy
                );
                outcome.skipped_ids.push(raw_id.clone());
                continue;
            };

            self.store().set_term_stock(term.id, Some(stock)).await?;
            outcome.updated += 1;
        }

        tracing::info!(
            "📦 Bulk stock update: {} term(s) set to {}",
            outcome.updated,
            stock
        );
        Ok(Some(outcome))
    }
}

/// Appends the updated count to the page the form came from, replacing any
/// earlier count. Relative referers stay relative.
pub fn redirect_url(referer: &str, updated: usize) -> String {
    let (mut url, relative) = match Url::parse(referer) {
        Ok(url) => (url, false),
        Err(_) => match Url::parse("http://localhost/").and_then(|base| base.join(referer)) {
            Ok(url) => (url, true),
            Err(_) => return format!("?{}={}", UPDATED_PARAM, updated),
        },
    };

    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| k != UPDATED_PARAM)
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    url.query_pairs_mut()
        .clear()
        .extend_pairs(kept)
        .append_pair(UPDATED_PARAM, &updated.to_string());

    if relative {
        url[url::Position::BeforePath..].to_string()
    } else {
        url.to_string()
    }
}

/// Keeps the referer only when it points back at this site: a path on the
/// same origin, or an absolute URL whose authority equals `host`.
pub fn local_referer(referer: &str, host: Option<&str>) -> Option<String> {
    let referer = referer.trim();
    match Url::parse(referer) {
        Ok(url) => {
            let host = host?;
            let authority = match (url.host_str(), url.port()) {
                (Some(name), Some(port)) => format!("{}:{}", name, port),
                (Some(name), None) => name.to_string(),
                (None, _) => return None,
            };
            let same_site = matches!(url.scheme(), "http" | "https")
                && authority.eq_ignore_ascii_case(host);
            same_site.then(|| url.to_string())
        }
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            let path_only = referer.starts_with('/')
                && !referer.starts_with("//")
                && !referer.starts_with("/\\");
            path_only.then(|| referer.to_string())
        }
        Err(_) => None,
    }
}

/// Notice shown after the redirect, when the query carries a positive count.
pub fn bulk_notice(count: Option<&str>) -> Option<String> {
    let count: usize = count?.trim().parse().ok()?;
    if count == 0 {
        return None;
    }
    Some(format!("{} attribute stock(s) updated.", count))
}

/// Value to pre-fill in the inline editor from the rendered column cell.
pub fn quick_edit_value(cell_text: &str) -> Option<u32> {
    let digits: String = cell_text.chars().filter(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}

/// Inline fieldset added to the quick-edit and bulk-edit boxes of the term list.
pub fn quick_edit_field(column_name: &str) -> Option<String> {
    if column_name != STOCK_FIELD {
        return None;
    }
    Some(format!(
        r#"<fieldset class="inline-edit-col-right">
    <div class="inline-edit-col">
        <label>
            <span class="title">{label}</span>
            <span class="input-text-wrap"><input type="number" step="1" min="0" name="{field}" class="{field}" value=""></span>
        </label>
    </div>
</fieldset>"#,
        label = STOCK_LABEL,
        field = STOCK_FIELD
    ))
}
