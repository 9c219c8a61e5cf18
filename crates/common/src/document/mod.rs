//! # Documents
//!
//! Ties ciphering to storage: a [`Payload`] is ciphered through the
//! [`CipherCoordinator`], wrapped in a [`SealedPayload`] with its kind tag
//! and written to a [`ContentStore`]. The caller gets back a
//! [`DocumentRecord`] describing who owns it and who it was shared with;
//! persisting that record is left to the caller.

mod payload;

use std::sync::Arc;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::actor::{ActorDirectory, ActorId, ActorLookup, DirectoryError};
use crate::cipher::{CipherCoordinator, CipherError, OwnedEnvelope, SharedParties};
use crate::content::{ContentId, ContentStore, ContentStoreError};
use crate::crypto::{Envelope, PublicKey};

pub use payload::{Payload, JSON_KIND};

#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("cipher error: {0}")]
    Cipher(#[from] CipherError),
    #[error("content store error: {0}")]
    Content(#[from] ContentStoreError),
    #[error("actor directory error: {0}")]
    Directory(#[from] DirectoryError),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("no file extension known for mime type {0}")]
    UnknownMime(String),
    #[error("document {0} is a shared copy, only owned documents can be shared again")]
    NotOwned(ContentId),
    #[error("document error: {0}")]
    Default(#[from] anyhow::Error),
}

/// What actually lands in the content store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SealedPayload {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(flatten)]
    pub envelope: Envelope,
}

impl SealedPayload {
    pub fn to_bytes(&self) -> Result<Bytes, DocumentError> {
        Ok(Bytes::from(serde_json::to_vec(self)?))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DocumentError> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

/// Metadata describing a stored document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRecord {
    pub cid: ContentId,
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    pub description: String,
    pub owner_actor_id: ActorId,
    pub owner_public_key: PublicKey,
    #[serde(default)]
    pub to_actor_id: Option<ActorId>,
    #[serde(default)]
    pub to_public_key: Option<PublicKey>,
    /// Owned document a shared copy was made from
    #[serde(default)]
    pub original_cid: Option<ContentId>,
    pub created_at: DateTime<Utc>,
}

impl DocumentRecord {
    pub fn is_shared(&self) -> bool {
        self.to_actor_id.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct Documents {
    coordinator: Arc<CipherCoordinator>,
    directory: Arc<dyn ActorDirectory>,
    content: Arc<dyn ContentStore>,
}

impl Documents {
    pub fn new(
        coordinator: Arc<CipherCoordinator>,
        directory: Arc<dyn ActorDirectory>,
        content: Arc<dyn ContentStore>,
    ) -> Self {
        Self {
            coordinator,
            directory,
            content,
        }
    }

    pub fn coordinator(&self) -> &Arc<CipherCoordinator> {
        &self.coordinator
    }

    /// Cipher a payload only `actor_id` (default: the logged in actor)
    ///  can read, and store it
    pub async fn store(
        &self,
        name: &str,
        description: &str,
        payload: &Payload,
        actor_id: Option<ActorId>,
    ) -> Result<DocumentRecord, DocumentError> {
        let (cid, owned) = self.seal(payload, None, actor_id).await?;
        tracing::info!("stored document {} for actor {}", cid, owned.owner_actor_id);

        Ok(self.record(cid, payload, name, description, owned, None))
    }

    /// Cipher a payload from `actor_id` (default: the logged in actor)
    ///  for the actor found by `to`, and store it
    pub async fn share(
        &self,
        to: &ActorLookup,
        name: &str,
        description: &str,
        payload: &Payload,
        actor_id: Option<ActorId>,
    ) -> Result<DocumentRecord, DocumentError> {
        let recipient = self.directory.get_actor(to).await?;
        let (cid, owned) = self
            .seal(payload, Some(&recipient.public_key), actor_id)
            .await?;
        tracing::info!(
            "shared document {} from actor {} to actor {}",
            cid,
            owned.owner_actor_id,
            recipient.id
        );

        Ok(self.record(
            cid,
            payload,
            name,
            description,
            owned,
            Some((recipient.id, recipient.public_key)),
        ))
    }

    /// Store a payload for `actor_id` and share a copy of it with `to`.
    ///  Returns the owned record followed by the shared one.
    pub async fn share_new(
        &self,
        to: &ActorLookup,
        name: &str,
        description: &str,
        payload: &Payload,
        actor_id: Option<ActorId>,
    ) -> Result<(DocumentRecord, DocumentRecord), DocumentError> {
        // resolve the recipient before anything is written
        self.directory.get_actor(to).await?;
        let owned = self.store(name, description, payload, actor_id).await?;
        let mut shared = self
            .share(to, name, description, payload, Some(owned.owner_actor_id))
            .await?;
        shared.original_cid = Some(owned.cid);
        Ok((owned, shared))
    }

    /// Share a copy of an owned document with `to`, ciphered by the
    ///  document's owner
    ///
    /// # Errors
    /// * `DocumentError::NotOwned` - `record` is itself a shared copy
    pub async fn share_existing(
        &self,
        record: &DocumentRecord,
        to: &ActorLookup,
    ) -> Result<DocumentRecord, DocumentError> {
        if record.is_shared() {
            return Err(DocumentError::NotOwned(record.cid));
        }
        let payload = self.view(record).await?;
        let mut shared = self
            .share(
                to,
                &record.name,
                &record.description,
                &payload,
                Some(record.owner_actor_id),
            )
            .await?;
        shared.original_cid = Some(record.cid);
        Ok(shared)
    }

    /// Fetch and decipher a document, as its owner or its recipient
    pub async fn view(&self, record: &DocumentRecord) -> Result<Payload, DocumentError> {
        let parties = match record.to_actor_id {
            None => None,
            Some(to_actor_id) => {
                let to_public_key = match record.to_public_key {
                    Some(public_key) => public_key,
                    None => {
                        self.directory
                            .get_actor(&ActorLookup::Id(to_actor_id))
                            .await?
                            .public_key
                    }
                };
                Some(SharedParties {
                    owner_actor_id: record.owner_actor_id,
                    owner_public_key: record.owner_public_key,
                    counterparty_actor_id: to_actor_id,
                    counterparty_public_key: to_public_key,
                })
            }
        };

        self.open(&record.cid, parties.as_ref(), Some(record.owner_actor_id))
            .await
    }

    /// Cipher a payload as `actor_id` (default: the logged in actor),
    ///  for `recipient` if given or else for the actor itself, and put the
    ///  sealed result in the content store
    pub async fn seal(
        &self,
        payload: &Payload,
        recipient: Option<&PublicKey>,
        actor_id: Option<ActorId>,
    ) -> Result<(ContentId, OwnedEnvelope), DocumentError> {
        let plaintext = payload.to_bytes()?;
        let owned = match recipient {
            Some(public_key) => {
                self.coordinator
                    .cipher_shared(&plaintext, public_key, actor_id)
                    .await?
            }
            None => self.coordinator.cipher(&plaintext, actor_id).await?,
        };

        let sealed = SealedPayload {
            kind: payload.kind().to_string(),
            envelope: owned.envelope.clone(),
        };
        let cid = self.content.put(sealed.to_bytes()?).await?;
        Ok((cid, owned))
    }

    /// Fetch a sealed payload and decipher it, through `parties` when it
    ///  was shared or as `actor_id` (default: the logged in actor) when not
    pub async fn open(
        &self,
        cid: &ContentId,
        parties: Option<&SharedParties>,
        actor_id: Option<ActorId>,
    ) -> Result<Payload, DocumentError> {
        let sealed = SealedPayload::from_bytes(&self.content.get(cid).await?)?;
        let plaintext = match parties {
            Some(parties) => {
                self.coordinator
                    .decipher_shared(&sealed.envelope, parties)
                    .await?
            }
            None => self.coordinator.decipher(&sealed.envelope, actor_id).await?,
        };

        Payload::from_bytes(&sealed.kind, plaintext)
    }

    fn record(
        &self,
        cid: ContentId,
        payload: &Payload,
        name: &str,
        description: &str,
        owned: OwnedEnvelope,
        to: Option<(ActorId, PublicKey)>,
    ) -> DocumentRecord {
        DocumentRecord {
            cid,
            kind: payload.kind().to_string(),
            name: name.to_string(),
            description: description.to_string(),
            owner_actor_id: owned.owner_actor_id,
            owner_public_key: owned.owner_public_key,
            to_actor_id: to.map(|(id, _)| id),
            to_public_key: to.map(|(_, public_key)| public_key),
            original_cid: None,
            created_at: Utc::now(),
        }
    }
}
