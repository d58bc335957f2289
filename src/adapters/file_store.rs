use crate::adapters::memory::MetaSnapshot;
use crate::domain::model::{OrderId, OrderStockState, StockChange, StockCount, TermId};
use crate::domain::ports::MetaStore;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

/// JSON-file backed metadata store.
///
/// Every mutation is applied to a copy of the snapshot and written while the
/// lock is held. The copy replaces the in-memory state only once it is on
/// disk, so a failed write leaves both sides at the previous value.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    state: Mutex<MetaSnapshot>,
}

impl FileStore {
    /// Loads the snapshot at `path`; a missing file starts empty.
    pub async fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let state = match tokio::fs::read(&path).await {
            Ok(bytes) if bytes.iter().all(|b| b.is_ascii_whitespace()) => MetaSnapshot::default(),
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("📂 No stock file at {}, starting empty", path.display());
                MetaSnapshot::default()
            }
            Err(e) => return Err(e.into()),
        };

        tracing::debug!(
            "Loaded {} tracked terms and {} order tokens from {}",
            state.term_stock.len(),
            state.orders.len(),
            path.display()
        );

        Ok(Self {
            path,
            state: Mutex::new(state),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn snapshot(&self) -> MetaSnapshot {
        self.state.lock().await.clone()
    }

    async fn persist(&self, snapshot: &MetaSnapshot) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        // 先寫暫存檔再 rename，避免寫到一半的檔案
        let tmp = self.path.with_extension("json.tmp");
        let data = serde_json::to_vec_pretty(snapshot)?;
        tokio::fs::write(&tmp, &data).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl MetaStore for FileStore {
    async fn term_stock(&self, term_id: TermId) -> Result<Option<StockCount>> {
        Ok(self.state.lock().await.term_stock.get(&term_id).copied())
    }

    async fn set_term_stock(&self, term_id: TermId, stock: Option<StockCount>) -> Result<()> {
        let mut state = self.state.lock().await;
        let mut next = state.clone();
        next.set(term_id, stock);
        self.persist(&next).await?;
        *state = next;
        Ok(())
    }

    async fn decrement_term_stock(
        &self,
        term_id: TermId,
        quantity: u32,
    ) -> Result<Option<StockChange>> {
        let mut state = self.state.lock().await;
        let mut next = state.clone();
        let Some(change) = next.decrement(term_id, quantity) else {
            return Ok(None);
        };
        self.persist(&next).await?;
        *state = next;
        Ok(Some(change))
    }

    async fn order_state(&self, order_id: OrderId) -> Result<OrderStockState> {
        Ok(self.state.lock().await.order_state(order_id))
    }

    async fn claim_order(&self, order_id: OrderId) -> Result<bool> {
        let mut state = self.state.lock().await;
        let mut next = state.clone();
        if !next.claim(order_id) {
            return Ok(false);
        }
        self.persist(&next).await?;
        *state = next;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_file_starts_empty() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::open(dir.path().join("state.json")).await.unwrap();
        assert_eq!(store.term_stock(TermId(1)).await.unwrap(), None);
        assert!(!store.path().exists());
    }

    #[tokio::test]
    async fn test_writes_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("state.json");

        {
            let store = FileStore::open(&path).await.unwrap();
            store
                .set_term_stock(TermId(12), Some(StockCount::new(5)))
                .await
                .unwrap();
            let change = store.decrement_term_stock(TermId(12), 2).await.unwrap();
            assert_eq!(change.unwrap().after, StockCount::new(3));
            assert!(store.claim_order(OrderId(1001)).await.unwrap());
        }

        let reopened = FileStore::open(&path).await.unwrap();
        assert_eq!(
            reopened.term_stock(TermId(12)).await.unwrap(),
            Some(StockCount::new(3))
        );
        assert!(!reopened.claim_order(OrderId(1001)).await.unwrap());

        let snapshot = reopened.snapshot().await;
        assert_eq!(snapshot.term_stock.len(), 1);
        assert!(snapshot.orders[&OrderId(1001)].is_applied());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, b"{not json").unwrap();
        assert!(FileStore::open(&path).await.is_err());
    }

    #[tokio::test]
    async fn test_failed_write_keeps_previous_state() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");
        let store = FileStore::open(&path).await.unwrap();
        store
            .set_term_stock(TermId(12), Some(StockCount::new(5)))
            .await
            .unwrap();

        // the temp file cannot be written while a directory holds its path
        let tmp = path.with_extension("json.tmp");
        std::fs::create_dir(&tmp).unwrap();

        assert!(store.claim_order(OrderId(1001)).await.is_err());
        assert!(store
            .set_term_stock(TermId(13), Some(StockCount::new(1)))
            .await
            .is_err());
        assert!(store.decrement_term_stock(TermId(12), 2).await.is_err());

        assert!(!store.order_state(OrderId(1001)).await.unwrap().is_applied());
        assert_eq!(store.term_stock(TermId(13)).await.unwrap(), None);
        assert_eq!(
            store.term_stock(TermId(12)).await.unwrap(),
            Some(StockCount::new(5))
        );

        std::fs::remove_dir(&tmp).unwrap();
        assert!(store.claim_order(OrderId(1001)).await.unwrap());
        let reopened = FileStore::open(&path).await.unwrap();
        assert!(reopened.order_state(OrderId(1001)).await.unwrap().is_applied());
    }

    #[tokio::test]
    async fn test_order_completion_retries_after_failed_write() {
        use crate::core::fixtures::catalog;
        use crate::core::fulfillment::FulfillmentOutcome;
        use crate::core::StockEngine;
        use std::sync::Arc;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");
        let store = Arc::new(FileStore::open(&path).await.unwrap());
        store
            .set_term_stock(TermId(12), Some(StockCount::new(5)))
            .await
            .unwrap();
        let engine = StockEngine::new(store.clone(), Arc::new(catalog()));

        let tmp = path.with_extension("json.tmp");
        std::fs::create_dir(&tmp).unwrap();
        assert!(engine.complete_order(OrderId(1001)).await.is_err());
        std::fs::remove_dir(&tmp).unwrap();

        let retry = engine.complete_order(OrderId(1001)).await.unwrap();
        assert!(matches!(retry.outcome, FulfillmentOutcome::Applied { .. }));
        assert_eq!(
            store.term_stock(TermId(12)).await.unwrap(),
            Some(StockCount::new(3))
        );

        let reopened = FileStore::open(&path).await.unwrap();
        assert_eq!(
            reopened.term_stock(TermId(12)).await.unwrap(),
            Some(StockCount::new(3))
        );
        assert!(reopened.order_state(OrderId(1001)).await.unwrap().is_applied());
    }
}
