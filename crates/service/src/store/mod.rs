//! Record Store abstraction over the collection of submitted map objects.

use async_trait::async_trait;
use chrono::Utc;
use models::{MapObject, MapObjectPatch, NewMapObject};

use crate::errors::ServiceError;
use crate::ids::IdGenerator;

pub mod memory;

/// CRUD over the map object collection.
///
/// Implementations serialize all mutations, so concurrent callers never lose
/// each other's writes.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// All records in insertion order.
    async fn list_all(&self) -> Vec<MapObject>;
    async fn get(&self, id: u64) -> Option<MapObject>;
    /// Validate, assign a fresh id, mark pending and append.
    async fn create(&self, input: NewMapObject) -> Result<MapObject, ServiceError>;
    /// Merge `patch` into the record; `NotFound` if `id` is unknown.
    async fn update(&self, id: u64, patch: MapObjectPatch) -> Result<MapObject, ServiceError>;
    /// Remove the record; returns whether it existed. Unknown ids are not an error.
    async fn delete(&self, id: u64) -> Result<bool, ServiceError>;
}

const ENTITY: &str = "map object";

pub(crate) fn insert_new(
    items: &mut Vec<MapObject>,
    ids: &dyn IdGenerator,
    input: NewMapObject,
) -> Result<MapObject, ServiceError> {
    input.validate()?;
    let next = || ids.next_id().ok_or_else(|| ServiceError::Storage("record id space exhausted".into()));
    let mut id = next()?;
    while items.iter().any(|r| r.id == id) {
        id = next()?;
    }
    let record = input.into_record(id, Utc::now());
    items.push(record.clone());
    Ok(record)
}

pub(crate) fn apply_patch(
    items: &mut [MapObject],
    id: u64,
    patch: MapObjectPatch,
) -> Result<MapObject, ServiceError> {
    patch.validate()?;
    let record = items
        .iter_mut()
        .find(|r| r.id == id)
        .ok_or_else(|| ServiceError::not_found(ENTITY, id))?;
    patch.apply(record);
    Ok(record.clone())
}

pub(crate) fn remove(items: &mut Vec<MapObject>, id: u64) -> bool {
    let before = items.len();
    items.retain(|r| r.id != id);
    items.len() != before
}

pub(crate) fn max_id(items: &[MapObject]) -> u64 {
    items.iter().map(|r| r.id).max().unwrap_or(0)
}
