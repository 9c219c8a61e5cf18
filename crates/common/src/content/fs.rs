use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;

use super::{ContentId, ContentStore, ContentStoreError};

/// Content store keeping one file per content id under a root directory
#[derive(Debug, Clone)]
pub struct FsContentStore {
    root: PathBuf,
}

impl FsContentStore {
    /// Open a store rooted at `path`, creating the directory if needed
    pub async fn open(path: &Path) -> Result<Self, ContentStoreError> {
        tracing::debug!("FsContentStore::open called with path: {:?}", path);
        tokio::fs::create_dir_all(path).await?;
        Ok(Self {
            root: path.to_path_buf(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, id: &ContentId) -> PathBuf {
        self.root.join(id.to_string())
    }
}

#[async_trait]
impl ContentStore for FsContentStore {
    async fn put(&self, data: Bytes) -> Result<ContentId, ContentStoreError> {
        let id = ContentId::for_bytes(&data);
        let path = self.path_for(&id);
        if tokio::fs::try_exists(&path).await? {
            return Ok(id);
        }

        // write then rename so readers never see a partial blob
        let tmp = path.with_extension("tmp");
        tokio::fs::write(&tmp, &data).await?;
        tokio::fs::rename(&tmp, &path).await?;
        tracing::debug!("stored content {} at {:?}", id, path);
        Ok(id)
    }

    async fn get(&self, id: &ContentId) -> Result<Bytes, ContentStoreError> {
        let data = match tokio::fs::read(self.path_for(id)).await {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ContentStoreError::NotFound(*id))
            }
            Err(e) => return Err(e.into()),
        };
        if !id.verify(&data) {
            tracing::error!("content {} failed verification", id);
            return Err(ContentStoreError::Corrupted(*id));
        }
        Ok(Bytes::from(data))
    }

    async fn has(&self, id: &ContentId) -> Result<bool, ContentStoreError> {
        Ok(tokio::fs::try_exists(self.path_for(id)).await?)
    }
}
