use crate::adapters::memory::MemoryCatalog;
use crate::utils::error::Result;
use std::path::Path;

/// Loads a catalog export (taxonomies, terms, products, orders) from JSON.
pub async fn load_catalog<P: AsRef<Path>>(path: P) -> Result<MemoryCatalog> {
    let path = path.as_ref();
    let bytes = tokio::fs::read(path).await?;
    let catalog = parse_catalog(&bytes)?;
    tracing::info!(
        "📚 Catalog loaded from {} ({} terms)",
        path.display(),
        catalog.term_count()
    );
    Ok(catalog)
}

pub fn parse_catalog(bytes: &[u8]) -> Result<MemoryCatalog> {
    let catalog: MemoryCatalog = serde_json::from_slice(bytes)?;
    Ok(catalog.reindex())
}
