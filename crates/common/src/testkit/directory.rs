use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use uuid::Uuid;

use super::MemorySession;
use crate::actor::{Actor, ActorDirectory, ActorId, ActorLookup, AuthContext, DirectoryError};
use crate::crypto::SecretKey;

type FetchHook = Arc<dyn Fn(&[ActorId]) + Send + Sync>;

/// In-memory actor directory.
///
/// Private keys are handed out to the logged in actor of the attached
///  [`MemorySession`] for itself, and for every actor it was granted
///  access to via [`grant`](Self::grant) (e.g. groups it is a member of).
#[derive(Clone)]
pub struct MemoryActorDirectory {
    session: MemorySession,
    inner: Arc<RwLock<MemoryActorDirectoryInner>>,
    full_fetches: Arc<AtomicUsize>,
    on_fetch: Arc<RwLock<Option<FetchHook>>>,
}

#[derive(Debug, Default)]
struct MemoryActorDirectoryInner {
    /// Full actors, keys included
    actors: HashMap<ActorId, Actor>,
    /// caller -> actors whose private key the caller may see
    grants: HashMap<ActorId, HashSet<ActorId>>,
}

impl std::fmt::Debug for MemoryActorDirectory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryActorDirectory")
            .field("session", &self.session)
            .field("full_fetches", &self.full_fetches())
            .finish()
    }
}

impl MemoryActorDirectory {
    pub fn new(session: MemorySession) -> Self {
        Self {
            session,
            inner: Arc::new(RwLock::new(MemoryActorDirectoryInner::default())),
            full_fetches: Arc::new(AtomicUsize::new(0)),
            on_fetch: Arc::new(RwLock::new(None)),
        }
    }

    /// Register an actor, keys included
    pub fn insert(&self, actor: Actor) {
        self.inner.write().actors.insert(actor.id, actor);
    }

    /// Create and register an individual user with a fresh key pair
    pub fn add_user(&self, address: &str) -> Actor {
        let actor = Actor::with_secret(Uuid::new_v4(), SecretKey::generate()).with_address(address);
        self.insert(actor.clone());
        actor
    }

    /// Create and register a group with a fresh key pair
    pub fn add_group(&self, name: &str) -> Actor {
        let actor = Actor::with_secret(Uuid::new_v4(), SecretKey::generate()).with_name(name);
        self.insert(actor.clone());
        actor
    }

    /// Let `caller` see the private key of `target`
    pub fn grant(&self, caller: ActorId, target: ActorId) {
        self.inner
            .write()
            .grants
            .entry(caller)
            .or_default()
            .insert(target);
    }

    /// Number of private key batch fetches served so far
    pub fn full_fetches(&self) -> usize {
        self.full_fetches.load(Ordering::SeqCst)
    }

    /// Run `hook` at the start of every private key fetch
    pub fn on_fetch(&self, hook: impl Fn(&[ActorId]) + Send + Sync + 'static) {
        *self.on_fetch.write() = Some(Arc::new(hook));
    }
}

#[async_trait]
impl ActorDirectory for MemoryActorDirectory {
    async fn find_actor(&self, lookup: &ActorLookup) -> Result<Option<Actor>, DirectoryError> {
        let inner = self.inner.read();
        let actor = match lookup {
            ActorLookup::Id(id) => inner.actors.get(id),
            ActorLookup::Address(address) => inner
                .actors
                .values()
                .find(|actor| actor.address.as_deref() == Some(address.as_str())),
        };
        Ok(actor.map(Actor::public_view))
    }

    async fn get_full_actors(&self, ids: &[ActorId]) -> Result<Vec<Actor>, DirectoryError> {
        self.full_fetches.fetch_add(1, Ordering::SeqCst);
        let hook = self.on_fetch.read().clone();
        if let Some(hook) = hook {
            hook(ids);
        }

        let Some(caller) = self.session.current_actor() else {
            return Ok(Vec::new());
        };

        let inner = self.inner.read();
        let granted = inner.grants.get(&caller.id);
        Ok(ids
            .iter()
            .filter(|id| {
                **id == caller.id || granted.map(|set| set.contains(*id)).unwrap_or(false)
            })
            .filter_map(|id| inner.actors.get(id).cloned())
            .collect())
    }
}
