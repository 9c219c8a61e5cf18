//! # Content store
//!
//! Sealed payloads are written to a content-addressed store and referenced
//! by a [`ContentId`]: a CIDv1 with the `raw` codec over a BLAKE3 digest of
//! the stored bytes. Stores never see plaintext.

mod fs;
mod memory;

use std::fmt::Display;
use std::str::FromStr;

use async_trait::async_trait;
use bytes::Bytes;
use cid::multihash::Multihash;
use cid::Cid;
use serde_with::{DeserializeFromStr, SerializeDisplay};

pub use fs::FsContentStore;
pub use memory::MemoryContentStore;

/// Multicodec for raw bytes
pub const RAW_CODEC: u64 = 0x55;
/// Multihash code for BLAKE3-256
pub const BLAKE3_CODE: u64 = 0x1e;

#[derive(Debug, thiserror::Error)]
pub enum ContentStoreError {
    #[error("content not found: {0}")]
    NotFound(ContentId),
    /// Stored bytes no longer hash to their id
    #[error("content corrupted: {0}")]
    Corrupted(ContentId),
    #[error("invalid content id: {0}")]
    InvalidId(String),
    #[error("content store i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("content store error: {0}")]
    Default(#[from] anyhow::Error),
}

/// Address of a blob in a [`ContentStore`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, SerializeDisplay, DeserializeFromStr)]
pub struct ContentId(Cid);

impl ContentId {
    /// Compute the id the given bytes are stored under
    pub fn for_bytes(data: &[u8]) -> Self {
        let digest = blake3::hash(data);
        let mh = Multihash::<64>::wrap(BLAKE3_CODE, digest.as_bytes())
            .expect("32 byte digest fits in a 64 byte multihash");
        Self(Cid::new_v1(RAW_CODEC, mh))
    }

    /// Whether `data` hashes to this id
    pub fn verify(&self, data: &[u8]) -> bool {
        Self::for_bytes(data) == *self
    }

    pub fn cid(&self) -> &Cid {
        &self.0
    }
}

impl From<ContentId> for Cid {
    fn from(id: ContentId) -> Self {
        id.0
    }
}

impl TryFrom<Cid> for ContentId {
    type Error = ContentStoreError;

    fn try_from(cid: Cid) -> Result<Self, Self::Error> {
        if cid.codec() != RAW_CODEC || cid.hash().code() != BLAKE3_CODE {
            return Err(ContentStoreError::InvalidId(format!(
                "expected raw/blake3 cid, got codec {:#x} hash {:#x}",
                cid.codec(),
                cid.hash().code()
            )));
        }
        Ok(Self(cid))
    }
}

impl Display for ContentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ContentId {
    type Err = ContentStoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let cid = Cid::try_from(s).map_err(|e| ContentStoreError::InvalidId(e.to_string()))?;
        Self::try_from(cid)
    }
}

/// Content-addressed blob storage
#[async_trait]
pub trait ContentStore: Send + Sync + std::fmt::Debug {
    /// Store bytes, returning the id they are addressable by.
    ///  Storing the same bytes twice yields the same id.
    async fn put(&self, data: Bytes) -> Result<ContentId, ContentStoreError>;

    /// Fetch the bytes stored under `id`
    ///
    /// # Errors
    /// * `ContentStoreError::NotFound` - Nothing stored under the id
    /// * `ContentStoreError::Corrupted` - Stored bytes fail verification
    async fn get(&self, id: &ContentId) -> Result<Bytes, ContentStoreError>;

    async fn has(&self, id: &ContentId) -> Result<bool, ContentStoreError>;
}
