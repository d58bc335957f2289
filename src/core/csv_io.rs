use crate::core::StockEngine;
use crate::domain::model::{format_stock, StockCount, TermId};
use crate::utils::error::Result;
use chrono::NaiveDate;
use serde::Serialize;
use std::io::{Read, Write};

pub const CSV_HEADER: [&str; 5] = ["taxonomy", "term_id", "term_name", "slug", "stock"];

const TAXONOMY_COL: usize = 0;
const TERM_ID_COL: usize = 1;
const STOCK_COL: usize = 4;

pub fn export_filename(date: NaiveDate) -> String {
    format!("attribute-stock-{}.csv", date.format("%Y-%m-%d"))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRow {
    pub line: u64,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub rows: usize,
    pub updated: usize,
    pub cleared: usize,
    pub skipped: Vec<SkippedRow>,
}

impl ImportSummary {
    pub fn notice(&self) -> String {
        format!(
            "Attribute stock updated successfully. {} row(s) applied, {} skipped.",
            self.updated + self.cleared,
            self.skipped.len()
        )
    }

    fn skip(&mut self, line: u64, reason: impl Into<String>) {
        let reason = reason.into();
        tracing::warn!("⚠️ CSV line {} skipped: {}", line, reason);
        self.skipped.push(SkippedRow { line, reason });
    }
}

enum RowAction {
    Apply(TermId, Option<StockCount>),
    Skip(String),
}

impl StockEngine {
    /// Writes every term of every registered taxonomy. Returns the number of
    /// data rows written.
    pub async fn export_csv<W: Write>(&self, writer: W) -> Result<usize> {
        let mut csv = csv::Writer::from_writer(writer);
        csv.write_record(CSV_HEADER)?;

        let mut rows = 0;
        for binding in self.registry().bindings() {
            for term in self.catalog().terms(binding.name()) {
                let stock = format_stock(self.store().term_stock(term.id).await?);
                let id = term.id.to_string();
                csv.write_record([
                    binding.name().as_str(),
                    id.as_str(),
                    term.name.as_str(),
                    term.slug.as_str(),
                    stock.as_str(),
                ])?;
                rows += 1;
            }
        }

        csv.flush()?;
        tracing::info!("📤 Exported {} attribute term row(s)", rows);
        Ok(rows)
    }

    /// Overwrites stock from an exported file. The first row is the header;
    /// name and slug columns are ignored. Bad rows are skipped, never rolled back.
    pub async fn import_csv<R: Read>(&self, reader: R) -> Result<ImportSummary> {
        let mut csv = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let mut summary = ImportSummary::default();
        for record in csv.records() {
            summary.rows += 1;

            let record = match record {
                Ok(record) => record,
                Err(e) => {
                    let line = e.position().map(|p| p.line()).unwrap_or(0);
                    summary.skip(line, e.to_string());
                    continue;
                }
            };
            let line = record.position().map(|p| p.line()).unwrap_or(0);

            match self.parse_row(&record) {
                RowAction::Apply(term_id, stock) => {
                    self.store().set_term_stock(term_id, stock).await?;
                    if stock.is_some() {
                        summary.updated += 1;
                    } else {
                        summary.cleared += 1;
                    }
                }
                RowAction::Skip(reason) => summary.skip(line, reason),
            }
        }

        tracing::info!(
            "📥 CSV import: {} row(s), {} updated, {} cleared, {} skipped",
            summary.rows,
            summary.updated,
            summary.cleared,
            summary.skipped.len()
        );
        Ok(summary)
    }

    fn parse_row(&self, record: &csv::StringRecord) -> RowAction {
        if record.len() < CSV_HEADER.len() {
            return RowAction::Skip(format!(
                "expected {} columns, found {}",
                CSV_HEADER.len(),
                record.len()
            ));
        }

        let taxonomy = record[TAXONOMY_COL].trim();
        if !self.registry().contains(taxonomy) {
            return RowAction::Skip(format!("unknown taxonomy '{}'", taxonomy));
        }

        let term_id = match TermId::parse(&record[TERM_ID_COL]) {
            Ok(id) => id,
            Err(e) => return RowAction::Skip(e.to_string()),
        };

        match StockCount::parse_input("stock", &record[STOCK_COL]) {
            Ok(stock) => RowAction::Apply(term_id, stock),
            Err(e) => RowAction::Skip(e.to_string()),
        }
    }
}

pub const IMPORT_FILE_FIELD: &str = "stock_csv";

/// Import/export screen: a download button and an upload form.
pub fn render_import_export_page(notice: Option<&str>) -> String {
    format!(
        r#"<!DOCTYPE html>
<html><head><title>Attribute Stock Import/Export</title></head>
<body>
<div class="wrap">
<h1>Attribute Stock Import/Export</h1>
{notice}
<h2>Export CSV</h2>
<form method="post" action="/admin/stock-io/export">
    <button type="submit" class="button button-primary">Download CSV</button>
</form>
<hr>
<h2>Import CSV</h2>
<form method="post" action="/admin/stock-io/import" enctype="multipart/form-data">
    <input type="file" name="{field}" accept=".csv" required>
    <button type="submit" class="button">Upload and Update Stock</button>
</form>
</div>
</body></html>
"#,
        notice = notice.unwrap_or(""),
        field = IMPORT_FILE_FIELD,
    )
}
