use std::{path::PathBuf, sync::Arc};

use async_trait::async_trait;
use models::{MapObject, MapObjectPatch, NewMapObject};
use tracing::info;

use crate::errors::ServiceError;
use crate::ids::{ClockIdGenerator, IdGenerator};
use crate::storage::json_list_store::JsonListStore;
use crate::store::{self, RecordStore};

/// File storage: persists submitted map objects as one JSON array.
pub struct JsonFileRecordStore {
    store: JsonListStore<MapObject>,
    ids: Arc<dyn IdGenerator>,
}

impl JsonFileRecordStore {
    /// Open the collection at `path`; new ids continue after the largest stored one.
    pub async fn open<P: Into<PathBuf>>(path: P) -> Result<Arc<Self>, ServiceError> {
        let list = JsonListStore::<MapObject>::open(path).await?;
        let last = list.read(store::max_id).await;
        let ids = Arc::new(ClockIdGenerator::starting_after(last));
        info!(path = %list.path().display(), records = list.read(<[MapObject]>::len).await, "request store opened");
        Ok(Arc::new(Self { store: list, ids }))
    }

    pub async fn open_with_id_generator<P: Into<PathBuf>>(
        path: P,
        ids: Arc<dyn IdGenerator>,
    ) -> Result<Arc<Self>, ServiceError> {
        let store = JsonListStore::<MapObject>::open(path).await?;
        Ok(Arc::new(Self { store, ids }))
    }
}

#[async_trait]
impl RecordStore for JsonFileRecordStore {
    async fn list_all(&self) -> Vec<MapObject> {
        self.store.list().await
    }

    async fn get(&self, id: u64) -> Option<MapObject> {
        self.store.read(|items| items.iter().find(|r| r.id == id).cloned()).await
    }

    async fn create(&self, input: NewMapObject) -> Result<MapObject, ServiceError> {
        let ids = Arc::clone(&self.ids);
        let record = self.store.mutate(move |items| store::insert_new(items, ids.as_ref(), input)).await?;
        info!(id = record.id, layer_type = %record.shape.layer_type(), "map object created");
        Ok(record)
    }

    async fn update(&self, id: u64, patch: MapObjectPatch) -> Result<MapObject, ServiceError> {
        let record = self.store.mutate(move |items| store::apply_patch(items, id, patch)).await?;
        info!(id, status = %record.status, "map object updated");
        Ok(record)
    }

    async fn delete(&self, id: u64) -> Result<bool, ServiceError> {
        let existed = self.store.mutate(|items| Ok(store::remove(items, id))).await?;
        info!(id, existed, "map object deleted");
        Ok(existed)
    }
}
