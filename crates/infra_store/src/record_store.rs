//! Versioned in-memory record store

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use core_kernel::{DomainPort, PortError, Record, RecordStore};

/// `RecordStore` over a `HashMap` guarded by a `tokio::sync::RwLock`
///
/// Cloning the store shares the underlying map.
pub struct InMemoryRecordStore<R: Record> {
    records: Arc<RwLock<HashMap<R::Id, R>>>,
}

impl<R: Record> InMemoryRecordStore<R> {
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Number of stored records
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

impl<R: Record> std::fmt::Debug for InMemoryRecordStore<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryRecordStore")
            .field("entity", &R::ENTITY)
            .finish_non_exhaustive()
    }
}

impl<R: Record> Default for InMemoryRecordStore<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Record> Clone for InMemoryRecordStore<R> {
    fn clone(&self) -> Self {
        Self {
            records: Arc::clone(&self.records),
        }
    }
}

impl<R: Record> DomainPort for InMemoryRecordStore<R> {}

#[async_trait]
impl<R: Record> RecordStore<R> for InMemoryRecordStore<R> {
    async fn get(&self, id: R::Id) -> Result<R, PortError> {
        self.records
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| PortError::not_found(R::ENTITY, id))
    }

    async fn list_all(&self) -> Result<Vec<R>, PortError> {
        Ok(self.records.read().await.values().cloned().collect())
    }

    async fn list_where(
        &self,
        predicate: &(dyn for<'r> Fn(&'r R) -> bool + Send + Sync),
    ) -> Result<Vec<R>, PortError> {
        let records = self.records.read().await;
        Ok(records.values().filter(|r| predicate(*r)).cloned().collect())
    }

    async fn insert(&self, mut record: R) -> Result<R, PortError> {
        let mut records = self.records.write().await;
        let id = record.record_id();
        if records.contains_key(&id) {
            return Err(PortError::conflict(format!("{} {} already exists", R::ENTITY, id)));
        }
        record.set_version(1);
        records.insert(id, record.clone());
        debug!(entity = R::ENTITY, id = %id, "Record inserted");
        Ok(record)
    }

    async fn update(&self, mut record: R) -> Result<R, PortError> {
        let mut records = self.records.write().await;
        let id = record.record_id();
        let stored = records
            .get(&id)
            .ok_or_else(|| PortError::not_found(R::ENTITY, id))?;
        if stored.version() != record.version() {
            return Err(PortError::conflict(format!(
                "{} {} was modified concurrently (expected version {}, found {})",
                R::ENTITY,
                id,
                record.version(),
                stored.version()
            )));
        }
        record.set_version(record.version() + 1);
        records.insert(id, record.clone());
        debug!(entity = R::ENTITY, id = %id, version = record.version(), "Record updated");
        Ok(record)
    }

    async fn delete(&self, id: R::Id) -> Result<(), PortError> {
        self.records
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| PortError::not_found(R::ENTITY, id))
    }
}
