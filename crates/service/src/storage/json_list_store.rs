use std::{
    ffi::OsString,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use serde::{de::DeserializeOwned, Serialize};
use tokio::{
    fs,
    io::AsyncWriteExt,
    sync::{Mutex, RwLock},
};
use tracing::{debug, error};

use crate::errors::ServiceError;

/// Generic JSON file-backed ordered collection.
///
/// Holds a `Vec<T>` in memory and persists the whole array to one JSON file.
/// Mutations are serialized by a writer lock and applied to a copy first: the
/// copy is written to `<file>.tmp`, synced and renamed over `<file>`, and only
/// then becomes visible to readers. A failed write leaves both the in-memory
/// view and the file on disk as they were.
pub struct JsonListStore<T> {
    inner: RwLock<Vec<T>>,
    writer: Mutex<()>,
    file_path: PathBuf,
}

impl<T> JsonListStore<T>
where
    T: Serialize + DeserializeOwned + Clone + PartialEq + Send + Sync,
{
    /// Load the collection from `path`. A missing file is an empty collection;
    /// the file is created on the first write.
    pub async fn open<P: Into<PathBuf>>(path: P) -> Result<Self, ServiceError> {
        let file_path = path.into();
        let items: Vec<T> = match fs::read(&file_path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Vec::new(),
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                ServiceError::Storage(format!("malformed {}: {}", file_path.display(), e))
            })?,
            Err(e) if e.kind() == ErrorKind::NotFound => Vec::new(),
            Err(e) => {
                return Err(ServiceError::Storage(format!("read {}: {}", file_path.display(), e)))
            }
        };
        debug!(path = %file_path.display(), count = items.len(), "json list store opened");
        Ok(Self { inner: RwLock::new(items), writer: Mutex::new(()), file_path })
    }

    pub fn path(&self) -> &Path { &self.file_path }

    /// Snapshot of all items in insertion order.
    pub async fn list(&self) -> Vec<T> {
        self.inner.read().await.clone()
    }

    /// Run a read-only closure against the current items.
    pub async fn read<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&[T]) -> R,
    {
        let items = self.inner.read().await;
        f(&items)
    }

    /// Apply a mutation and persist it before publishing.
    ///
    /// Nothing is written when the closure fails or leaves the items unchanged.
    pub async fn mutate<R, F>(&self, f: F) -> Result<R, ServiceError>
    where
        F: FnOnce(&mut Vec<T>) -> Result<R, ServiceError>,
    {
        let _writer = self.writer.lock().await;
        let mut next = self.inner.read().await.clone();
        let out = f(&mut next)?;
        if *self.inner.read().await == next {
            return Ok(out);
        }
        self.persist(&next).await?;
        *self.inner.write().await = next;
        Ok(out)
    }

    async fn persist(&self, items: &[T]) -> Result<(), ServiceError> {
        let data = serde_json::to_vec_pretty(items).map_err(|e| ServiceError::Storage(e.to_string()))?;
        let tmp = self.tmp_path();
        if let Err(e) = self.write_replace(&tmp, &data).await {
            error!(path = %self.file_path.display(), error = %e, "persisting json list failed");
            let _ = fs::remove_file(&tmp).await;
            return Err(ServiceError::Storage(format!("write {}: {}", self.file_path.display(), e)));
        }
        Ok(())
    }

    async fn write_replace(&self, tmp: &Path, data: &[u8]) -> std::io::Result<()> {
        if let Some(parent) = self.file_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }
        let mut file = fs::File::create(tmp).await?;
        file.write_all(data).await?;
        file.sync_all().await?;
        drop(file);
        fs::rename(tmp, &self.file_path).await
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name: OsString = self.file_path.as_os_str().to_owned();
        name.push(".tmp");
        PathBuf::from(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_file(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("json_list_store_{}_{}.json", tag, uuid::Uuid::new_v4()))
    }

    #[tokio::test]
    async fn json_list_store_crud_persists() -> Result<(), anyhow::Error> {
        let tmp = temp_file("crud");
        let store = JsonListStore::<String>::open(&tmp).await?;

        // missing file reads as empty and is not created eagerly
        assert!(store.list().await.is_empty());
        assert!(fs::metadata(&tmp).await.is_err());

        store.mutate(|v| { v.push("a".into()); Ok(()) }).await?;
        store.mutate(|v| { v.push("b".into()); Ok(()) }).await?;
        store.mutate(|v| { v.retain(|s| s != "a"); Ok(()) }).await?;
        assert_eq!(store.list().await, vec!["b".to_string()]);

        let reloaded = JsonListStore::<String>::open(&tmp).await?;
        assert_eq!(reloaded.list().await, vec!["b".to_string()]);
        assert_eq!(reloaded.read(|v| v.len()).await, 1);

        let _ = fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn failed_closure_changes_nothing() -> Result<(), anyhow::Error> {
        let tmp = temp_file("closure");
        let store = JsonListStore::<u32>::open(&tmp).await?;
        store.mutate(|v| { v.push(1); Ok(()) }).await?;

        let res = store
            .mutate(|v| {
                v.clear();
                Err::<(), _>(ServiceError::Validation("nope".into()))
            })
            .await;
        assert!(matches!(res, Err(ServiceError::Validation(_))));
        assert_eq!(store.list().await, vec![1]);

        let _ = fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn failed_write_keeps_previous_state() -> Result<(), anyhow::Error> {
        let tmp = temp_file("blocked");
        let store = JsonListStore::<u32>::open(&tmp).await?;
        store.mutate(|v| { v.push(1); Ok(()) }).await?;
        let on_disk = fs::read(&tmp).await?;

        // a directory squatting on the temp path makes the write fail
        fs::create_dir(store.tmp_path()).await?;
        let res = store.mutate(|v| { v.push(2); Ok(()) }).await;
        assert!(matches!(res, Err(ServiceError::Storage(_))));
        assert_eq!(store.list().await, vec![1]);
        assert_eq!(fs::read(&tmp).await?, on_disk);

        fs::remove_dir(store.tmp_path()).await?;
        store.mutate(|v| { v.push(2); Ok(()) }).await?;
        assert_eq!(JsonListStore::<u32>::open(&tmp).await?.list().await, vec![1, 2]);

        let _ = fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn malformed_file_is_an_error() -> Result<(), anyhow::Error> {
        let tmp = temp_file("malformed");
        fs::write(&tmp, b"{not json").await?;
        let res = JsonListStore::<u32>::open(&tmp).await;
        assert!(matches!(res, Err(ServiceError::Storage(_))));

        fs::write(&tmp, b"  \n").await?;
        assert!(JsonListStore::<u32>::open(&tmp).await?.list().await.is_empty());

        let _ = fs::remove_file(&tmp).await;
        Ok(())
    }
}
