use std::sync::Arc;

use async_trait::async_trait;
use common::actor::{Actor, ActorDirectory, ActorId, ActorLookup, AuthContext, DirectoryError};
use common::cipher::{CipherCoordinator, SharedParties};
use common::content::FsContentStore;
use common::crypto::PublicKey;
use common::document::Documents;
use uuid::Uuid;

use crate::state::{AppState, StateError};

/// The single identity held in the hprv directory, acting both as the
///  logged in session and as the only actor directory entry
#[derive(Debug, Clone)]
pub struct LocalIdentity {
    actor: Actor,
}

impl LocalIdentity {
    pub fn load(state: &AppState) -> Result<Self, StateError> {
        let key = state.load_key()?;
        let mut actor = Actor::with_secret(state.config.actor_id, key);
        actor.name = state.config.name.clone();
        Ok(Self { actor })
    }

    /// Parties of an envelope exchanged between us and the holder of
    ///  `counterparty`, whichever side sealed it
    pub fn parties_with(&self, counterparty: &PublicKey) -> SharedParties {
        SharedParties {
            owner_actor_id: self.actor.id,
            owner_public_key: self.actor.public_key,
            counterparty_actor_id: foreign_actor_id(counterparty),
            counterparty_public_key: *counterparty,
        }
    }
}

/// Stable id for a key that has no entry in the local directory
pub fn foreign_actor_id(public_key: &PublicKey) -> ActorId {
    let bytes = public_key.to_bytes();
    let mut id = [0u8; 16];
    // skip the SEC1 tag byte
    id.copy_from_slice(&bytes[1..17]);
    Uuid::from_bytes(id)
}

impl AuthContext for LocalIdentity {
    fn is_logged_in(&self) -> bool {
        true
    }

    fn current_actor(&self) -> Option<Actor> {
        Some(self.actor.clone())
    }
}

#[async_trait]
impl ActorDirectory for LocalIdentity {
    async fn find_actor(&self, lookup: &ActorLookup) -> Result<Option<Actor>, DirectoryError> {
        let found = match lookup {
            ActorLookup::Id(id) => *id == self.actor.id,
            ActorLookup::Address(address) => self.actor.address.as_deref() == Some(address.as_str()),
        };
        Ok(found.then(|| self.actor.public_view()))
    }

    async fn get_full_actors(&self, ids: &[ActorId]) -> Result<Vec<Actor>, DirectoryError> {
        Ok(ids
            .iter()
            .filter(|id| **id == self.actor.id)
            .map(|_| self.actor.clone())
            .collect())
    }
}

/// Everything a seal or open needs, wired for the local identity
pub struct Engine {
    pub identity: LocalIdentity,
    pub documents: Documents,
}

impl Engine {
    pub async fn load(state: &AppState) -> anyhow::Result<Self> {
        let identity = LocalIdentity::load(state)?;
        let shared = Arc::new(identity.clone());
        let coordinator = Arc::new(CipherCoordinator::new(shared.clone(), shared.clone()));
        coordinator.start_session()?;
        let store = FsContentStore::open(&state.store_path).await?;
        Ok(Self {
            identity,
            documents: Documents::new(coordinator, shared, Arc::new(store)),
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use common::crypto::SecretKey;

    fn identity() -> LocalIdentity {
        LocalIdentity {
            actor: Actor::with_secret(Uuid::new_v4(), SecretKey::generate()),
        }
    }

    #[tokio::test]
    async fn test_directory_only_knows_self() {
        let local = identity();
        let id = local.actor.id;

        let full = local.get_full_actors(&[id, Uuid::new_v4()]).await.unwrap();
        assert_eq!(full.len(), 1);
        assert!(full[0].has_private_key());

        let found = local.find_actor(&ActorLookup::Id(id)).await.unwrap().unwrap();
        assert!(!found.has_private_key());
        assert!(local
            .find_actor(&ActorLookup::Id(Uuid::new_v4()))
            .await
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_foreign_id_is_stable() {
        let key = SecretKey::generate().public();
        assert_eq!(foreign_actor_id(&key), foreign_actor_id(&key));
        assert_ne!(
            foreign_actor_id(&key),
            foreign_actor_id(&SecretKey::generate().public())
        );
    }
}
