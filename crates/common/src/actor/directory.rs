use std::fmt::Debug;

use async_trait::async_trait;

use super::{Actor, ActorId};

#[derive(thiserror::Error, Debug)]
pub enum DirectoryError {
    /// The caller may not see this actor's private key
    #[error("not authorized to view private info of actor {0}")]
    NotAuthorized(ActorId),
    #[error("actor not found: {0}")]
    NotFound(String),
    /// Transport or backend failure inside the directory
    #[error("unhandled actor directory error: {0}")]
    Provider(#[from] anyhow::Error),
}

/// How to look up the public view of an actor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActorLookup {
    Id(ActorId),
    Address(String),
}

impl std::fmt::Display for ActorLookup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActorLookup::Id(id) => write!(f, "id: {}", id),
            ActorLookup::Address(address) => write!(f, "address: {}", address),
        }
    }
}

/// External directory of actors.
///
/// Implementations decide which private keys the current caller is
/// entitled to. Retries and timeouts are the implementation's concern.
#[async_trait]
pub trait ActorDirectory: Send + Sync + Debug {
    /// Public view of an actor, `None` if no such actor exists
    async fn find_actor(&self, lookup: &ActorLookup) -> Result<Option<Actor>, DirectoryError>;

    /// Full actors (with private keys) for the given ids.
    ///
    /// Ids the caller is not entitled to are omitted from the result
    /// rather than failing the whole batch.
    async fn get_full_actors(&self, ids: &[ActorId]) -> Result<Vec<Actor>, DirectoryError>;

    /// Public view of an actor
    ///
    /// # Errors
    /// * `DirectoryError::NotFound` - No actor matches the lookup
    async fn get_actor(&self, lookup: &ActorLookup) -> Result<Actor, DirectoryError> {
        self.find_actor(lookup)
            .await?
            .ok_or_else(|| DirectoryError::NotFound(lookup.to_string()))
    }

    /// Full actor (with private key) for a single id
    ///
    /// # Errors
    /// * `DirectoryError::NotAuthorized` - The caller may not see the private key
    async fn get_full_actor(&self, id: ActorId) -> Result<Actor, DirectoryError> {
        self.get_full_actors(&[id])
            .await?
            .into_iter()
            .find(|actor| actor.id == id && actor.has_private_key())
            .ok_or(DirectoryError::NotAuthorized(id))
    }
}
