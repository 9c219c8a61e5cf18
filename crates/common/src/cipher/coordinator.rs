use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::Mutex;

use crate::actor::{ActorDirectory, ActorId, AuthContext, DirectoryError};
use crate::crypto::{Envelope, PublicKey};

use super::{ActorCipher, CipherError};

/// Envelope plus the actor that owns it
#[derive(Debug, Clone)]
pub struct OwnedEnvelope {
    pub owner_actor_id: ActorId,
    pub owner_public_key: PublicKey,
    pub envelope: Envelope,
}

/// The two actors named on a shared envelope.
///
/// `owner` ciphered the envelope for `counterparty`.
#[derive(Debug, Clone)]
pub struct SharedParties {
    pub owner_actor_id: ActorId,
    pub owner_public_key: PublicKey,
    pub counterparty_actor_id: ActorId,
    pub counterparty_public_key: PublicKey,
}

/// Outcome of picking which side of a shared envelope this session can act as
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Decipher as `actor_id`, against the other side's public key
    Resolved {
        actor_id: ActorId,
        counterparty_public_key: PublicKey,
    },
    Unresolved,
}

#[derive(Debug)]
struct SessionCiphers {
    /// Bumped on every session start so fetches from a previous
    ///  session can never land in this one
    generation: u64,
    default_actor_id: ActorId,
    ciphers: HashMap<ActorId, Arc<ActorCipher>>,
}

/// Resolves which actor identity a cipher call runs as, and caches one
///  [`ActorCipher`] per actor for the lifetime of a session.
///
/// The cache starts empty. [`start_session`](Self::start_session) installs
///  the logged in actor as the default entry; [`reset`](Self::reset) drops
///  every entry, after which all calls fail with
///  [`CipherError::NotLoggedIn`] until the next session starts.
#[derive(Debug)]
pub struct CipherCoordinator {
    auth: Arc<dyn AuthContext>,
    directory: Arc<dyn ActorDirectory>,
    session: RwLock<Option<SessionCiphers>>,
    generation: RwLock<u64>,
    // Held across check-then-fetch-then-insert so the same actor's
    //  private key is never fetched twice concurrently
    fetch_lock: Mutex<()>,
}

impl CipherCoordinator {
    pub fn new(auth: Arc<dyn AuthContext>, directory: Arc<dyn ActorDirectory>) -> Self {
        Self {
            auth,
            directory,
            session: RwLock::new(None),
            generation: RwLock::new(0),
            fetch_lock: Mutex::new(()),
        }
    }

    /// Install a fresh cache for the currently logged in actor.
    ///
    /// Any cache left over from a previous session is dropped first.
    pub fn start_session(&self) -> Result<ActorId, CipherError> {
        if !self.auth.is_logged_in() {
            return Err(CipherError::NotLoggedIn);
        }
        let actor = self.auth.current_actor().ok_or(CipherError::NotLoggedIn)?;
        let default_actor_id = actor.id;

        let generation = {
            let mut generation = self.generation.write();
            *generation += 1;
            *generation
        };

        let mut ciphers = HashMap::new();
        ciphers.insert(default_actor_id, Arc::new(ActorCipher::new(actor)));

        *self.session.write() = Some(SessionCiphers {
            generation,
            default_actor_id,
            ciphers,
        });

        tracing::info!(
            "cipher session {} started for actor {}",
            generation,
            default_actor_id
        );
        Ok(default_actor_id)
    }

    /// Drop every cached cipher, including the default one.
    ///
    /// Must be called by the host on logout.
    pub fn reset(&self) {
        let previous = self.session.write().take();
        if let Some(previous) = previous {
            tracing::info!(
                "cipher session {} reset, evicted {} ciphers",
                previous.generation,
                previous.ciphers.len()
            );
        }
    }

    /// Whether a private-key bearing cipher for the actor is cached
    pub fn has_cipher(&self, actor_id: ActorId) -> bool {
        self.session
            .read()
            .as_ref()
            .and_then(|session| session.ciphers.get(&actor_id))
            .map(|cipher| cipher.has_private_key())
            .unwrap_or(false)
    }

    /// Cipher a payload for the given actor itself (default actor if `None`)
    pub async fn cipher(
        &self,
        payload: &[u8],
        actor_id: Option<ActorId>,
    ) -> Result<OwnedEnvelope, CipherError> {
        let cipher = self.get_cipher(actor_id).await?;
        let envelope = cipher.cipher(payload)?;
        Ok(OwnedEnvelope {
            owner_actor_id: cipher.actor_id(),
            owner_public_key: *cipher.public_key(),
            envelope,
        })
    }

    /// Cipher a payload from the given actor (default actor if `None`) to a
    ///  recipient public key. The sender owns the resulting envelope.
    pub async fn cipher_shared(
        &self,
        payload: &[u8],
        recipient_public_key: &PublicKey,
        actor_id: Option<ActorId>,
    ) -> Result<OwnedEnvelope, CipherError> {
        let cipher = self.get_cipher(actor_id).await?;
        let envelope = cipher.cipher_for(payload, recipient_public_key)?;
        Ok(OwnedEnvelope {
            owner_actor_id: cipher.actor_id(),
            owner_public_key: *cipher.public_key(),
            envelope,
        })
    }

    /// Decipher a self-owned envelope as the given actor (default if `None`)
    pub async fn decipher(
        &self,
        envelope: &Envelope,
        actor_id: Option<ActorId>,
    ) -> Result<Vec<u8>, CipherError> {
        self.get_cipher(actor_id).await?.decipher(envelope)
    }

    /// Decipher a shared envelope as whichever of its two parties this
    ///  session holds key material for.
    ///
    /// # Errors
    /// * `CipherError::PermissionDenied` - Neither party is available
    pub async fn decipher_shared(
        &self,
        envelope: &Envelope,
        parties: &SharedParties,
    ) -> Result<Vec<u8>, CipherError> {
        self.add_ciphers(&[parties.owner_actor_id, parties.counterparty_actor_id])
            .await?;

        match self.resolve_shared(parties)? {
            Resolution::Resolved {
                actor_id,
                counterparty_public_key,
            } => {
                tracing::debug!("deciphering shared envelope as actor {}", actor_id);
                self.get_cipher(Some(actor_id))
                    .await?
                    .decipher_shared(envelope, &counterparty_public_key)
            }
            Resolution::Unresolved => {
                tracing::warn!(
                    "no cipher available for actors {} or {}",
                    parties.owner_actor_id,
                    parties.counterparty_actor_id
                );
                Err(CipherError::PermissionDenied)
            }
        }
    }

    /// Pick the side of a shared envelope to decipher as, owner first
    pub fn resolve_shared(&self, parties: &SharedParties) -> Result<Resolution, CipherError> {
        let session = self.session.read();
        let session = session.as_ref().ok_or(CipherError::NotLoggedIn)?;
        let usable = |actor_id: &ActorId| {
            session
                .ciphers
                .get(actor_id)
                .map(|cipher| cipher.has_private_key())
                .unwrap_or(false)
        };

        let resolution = if usable(&parties.owner_actor_id) {
            Resolution::Resolved {
                actor_id: parties.owner_actor_id,
                counterparty_public_key: parties.counterparty_public_key,
            }
        } else if usable(&parties.counterparty_actor_id) {
            Resolution::Resolved {
                actor_id: parties.counterparty_actor_id,
                counterparty_public_key: parties.owner_public_key,
            }
        } else {
            Resolution::Unresolved
        };
        Ok(resolution)
    }

    fn assert_logged_in(&self) -> Result<u64, CipherError> {
        if !self.auth.is_logged_in() {
            return Err(CipherError::NotLoggedIn);
        }
        self.session
            .read()
            .as_ref()
            .map(|session| session.generation)
            .ok_or(CipherError::NotLoggedIn)
    }

    fn cached(&self, actor_id: Option<ActorId>) -> Result<Option<Arc<ActorCipher>>, CipherError> {
        let session = self.session.read();
        let session = session.as_ref().ok_or(CipherError::NotLoggedIn)?;
        let actor_id = actor_id.unwrap_or(session.default_actor_id);
        Ok(session.ciphers.get(&actor_id).cloned())
    }

    /// Insert fetched ciphers, unless the session they were fetched for
    ///  has since been reset or replaced
    fn insert(&self, generation: u64, ciphers: Vec<ActorCipher>) -> Result<(), CipherError> {
        let mut session = self.session.write();
        match session.as_mut() {
            Some(session) if session.generation == generation => {
                for cipher in ciphers {
                    session.ciphers.insert(cipher.actor_id(), Arc::new(cipher));
                }
                Ok(())
            }
            _ => {
                tracing::debug!("discarding ciphers fetched for ended session {}", generation);
                Err(CipherError::NotLoggedIn)
            }
        }
    }

    async fn get_cipher(&self, actor_id: Option<ActorId>) -> Result<Arc<ActorCipher>, CipherError> {
        let generation = self.assert_logged_in()?;
        if let Some(cipher) = self.cached(actor_id)? {
            return Ok(cipher);
        }
        // a missing default is impossible, so this is an explicit actor
        let actor_id = actor_id.ok_or(CipherError::NotLoggedIn)?;

        let _guard = self.fetch_lock.lock().await;
        if let Some(cipher) = self.cached(Some(actor_id))? {
            return Ok(cipher);
        }

        tracing::debug!("fetching full actor {}", actor_id);
        let actor = self
            .directory
            .get_full_actor(actor_id)
            .await
            .map_err(|e| match e {
                DirectoryError::NotAuthorized(id) => CipherError::NoPrivateKeyAccess(id),
                e => CipherError::Directory(e),
            })?;

        self.insert(generation, vec![ActorCipher::new(actor)])?;
        self.cached(Some(actor_id))?
            .ok_or(CipherError::NoPrivateKeyAccess(actor_id))
    }

    /// Make sure at least one of `actor_ids` has a usable cipher, fetching
    ///  the uncached ones in one batch. Ids the caller may not see are
    ///  simply left out.
    async fn add_ciphers(&self, actor_ids: &[ActorId]) -> Result<(), CipherError> {
        let generation = self.assert_logged_in()?;

        let _guard = self.fetch_lock.lock().await;
        // one usable cipher is enough to decipher
        if actor_ids.iter().any(|id| self.has_cipher(*id)) {
            return Ok(());
        }

        let missing: Vec<ActorId> = {
            let session = self.session.read();
            let session = session.as_ref().ok_or(CipherError::NotLoggedIn)?;
            actor_ids
                .iter()
                .filter(|id| !session.ciphers.contains_key(id))
                .copied()
                .collect()
        };
        if missing.is_empty() {
            return Ok(());
        }

        tracing::debug!("fetching full actors {:?}", missing);
        let actors = self.directory.get_full_actors(&missing).await?;
        let ciphers = actors
            .into_iter()
            .filter(|actor| missing.contains(&actor.id))
            .map(ActorCipher::new)
            .collect();
        self.insert(generation, ciphers)
    }
}
