use std::sync::Arc;

use async_trait::async_trait;
use models::{MapObject, MapObjectPatch, NewMapObject};
use tokio::sync::RwLock;
use tracing::info;

use crate::errors::ServiceError;
use crate::ids::{ClockIdGenerator, IdGenerator};
use crate::store::{self, RecordStore};

/// Non-persistent `RecordStore`; state lives as long as the process.
pub struct InMemoryRecordStore {
    items: RwLock<Vec<MapObject>>,
    ids: Arc<dyn IdGenerator>,
}

impl InMemoryRecordStore {
    pub fn new() -> Arc<Self> {
        Self::with_id_generator(Vec::new(), Arc::new(ClockIdGenerator::new()))
    }

    /// Seed with existing records and a custom id source.
    pub fn with_id_generator(items: Vec<MapObject>, ids: Arc<dyn IdGenerator>) -> Arc<Self> {
        Arc::new(Self { items: RwLock::new(items), ids })
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn list_all(&self) -> Vec<MapObject> {
        self.items.read().await.clone()
    }

    async fn get(&self, id: u64) -> Option<MapObject> {
        self.items.read().await.iter().find(|r| r.id == id).cloned()
    }

    async fn create(&self, input: NewMapObject) -> Result<MapObject, ServiceError> {
        let mut items = self.items.write().await;
        let record = store::insert_new(&mut items, self.ids.as_ref(), input)?;
        info!(id = record.id, layer_type = %record.shape.layer_type(), "map object created");
        Ok(record)
    }

    async fn update(&self, id: u64, patch: MapObjectPatch) -> Result<MapObject, ServiceError> {
        let mut items = self.items.write().await;
        let record = store::apply_patch(&mut items, id, patch)?;
        info!(id, status = %record.status, "map object updated");
        Ok(record)
    }

    async fn delete(&self, id: u64) -> Result<bool, ServiceError> {
        let existed = store::remove(&mut *self.items.write().await, id);
        info!(id, existed, "map object deleted");
        Ok(existed)
    }
}
