use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::RwLock;

use super::{ContentId, ContentStore, ContentStoreError};

/// In-memory content store
#[derive(Debug, Clone, Default)]
pub struct MemoryContentStore {
    blobs: Arc<RwLock<HashMap<ContentId, Bytes>>>,
}

impl MemoryContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.blobs.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.read().is_empty()
    }

    /// Overwrite the bytes stored under `id` without re-addressing them
    pub fn tamper(&self, id: &ContentId, data: Bytes) {
        self.blobs.write().insert(*id, data);
    }
}

#[async_trait]
impl ContentStore for MemoryContentStore {
    async fn put(&self, data: Bytes) -> Result<ContentId, ContentStoreError> {
        let id = ContentId::for_bytes(&data);
        self.blobs.write().insert(id, data);
        tracing::debug!("stored content {}", id);
        Ok(id)
    }

    async fn get(&self, id: &ContentId) -> Result<Bytes, ContentStoreError> {
        let data = self
            .blobs
            .read()
            .get(id)
            .cloned()
            .ok_or(ContentStoreError::NotFound(*id))?;
        if !id.verify(&data) {
            return Err(ContentStoreError::Corrupted(*id));
        }
        Ok(data)
    }

    async fn has(&self, id: &ContentId) -> Result<bool, ContentStoreError> {
        Ok(self.blobs.read().contains_key(id))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[tokio::test]
    async fn test_put_get() {
        let store = MemoryContentStore::new();
        let id = store.put(Bytes::from_static(b"sealed")).await.unwrap();
        assert_eq!(store.put(Bytes::from_static(b"sealed")).await.unwrap(), id);
        assert_eq!(store.len(), 1);
        assert!(store.has(&id).await.unwrap());
        assert_eq!(store.get(&id).await.unwrap(), Bytes::from_static(b"sealed"));
    }

    #[tokio::test]
    async fn test_missing_and_corrupted() {
        let store = MemoryContentStore::new();
        let missing = ContentId::for_bytes(b"never stored");
        assert!(matches!(
            store.get(&missing).await,
            Err(ContentStoreError::NotFound(id)) if id == missing
        ));

        let id = store.put(Bytes::from_static(b"sealed")).await.unwrap();
        store.tamper(&id, Bytes::from_static(b"swapped"));
        assert!(matches!(
            store.get(&id).await,
            Err(ContentStoreError::Corrupted(_))
        ));
    }
}
