//! The shared papers registry.
//!
//! All reads and writes go through one mutex so that the
//! read-modify-write in [`PaperRegistry::add`] never interleaves with
//! another writer.

use super::record::PaperRecord;
use super::store::{PaperStore, StoreError};
use tokio::sync::Mutex;
use tracing::info;

/// Ordered store of submitted papers.
pub struct PaperRegistry {
    store: Mutex<Box<dyn PaperStore>>,
}

impl PaperRegistry {
    /// Wrap `store` as the single owner of its contents.
    #[must_use]
    pub fn new(store: impl PaperStore + 'static) -> Self {
        Self {
            store: Mutex::new(Box::new(store)),
        }
    }

    /// Append `record` after the existing records.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read or written. The
    /// stored contents are unchanged in that case.
    pub async fn add(&self, record: PaperRecord) -> Result<(), StoreError> {
        let store = self.store.lock().await;
        let mut records = store.load().await?;
        records.push(record);
        store.save(&records).await?;
        info!("Paper added, registry now holds {} papers.", records.len());
        Ok(())
    }

    /// All records in insertion order.
    ///
    /// # Errors
    ///
    /// Returns an error if the store exists but cannot be read.
    pub async fn list(&self) -> Result<Vec<PaperRecord>, StoreError> {
        let store = self.store.lock().await;
        store.load().await
    }

    /// Remove every record. Clearing an empty registry is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    pub async fn clear(&self) -> Result<(), StoreError> {
        let store = self.store.lock().await;
        store.save(&[]).await?;
        info!("Papers registry cleared.");
        Ok(())
    }
}
