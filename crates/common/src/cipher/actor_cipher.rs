use crate::actor::{Actor, ActorId};
use crate::crypto::{Envelope, PublicKey, SecretKey, SymmetricKeyPair};

use super::CipherError;

/// Cipher operations bound to one actor's identity.
///
/// Every call derives a fresh [`SymmetricKeyPair`] from the actor's private
/// key and either its own public key (self-owned data) or a counterparty's
/// public key (shared data).
#[derive(Debug, Clone)]
pub struct ActorCipher {
    actor: Actor,
}

impl From<Actor> for ActorCipher {
    fn from(actor: Actor) -> Self {
        Self { actor }
    }
}

impl ActorCipher {
    pub fn new(actor: Actor) -> Self {
        Self { actor }
    }

    pub fn actor_id(&self) -> ActorId {
        self.actor.id
    }

    pub fn name(&self) -> Option<&str> {
        self.actor.name.as_deref()
    }

    pub fn address(&self) -> Option<&str> {
        self.actor.address.as_deref()
    }

    pub fn is_user(&self) -> bool {
        self.actor.is_user()
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.actor.public_key
    }

    /// Whether this cipher can actually cipher or decipher
    pub fn has_private_key(&self) -> bool {
        self.actor.has_private_key()
    }

    fn secret(&self) -> Result<&SecretKey, CipherError> {
        self.actor
            .private_key
            .as_ref()
            .ok_or(CipherError::NoPrivateKeyAccess(self.actor.id))
    }

    fn keys_with(&self, counterparty: &PublicKey) -> Result<SymmetricKeyPair, CipherError> {
        Ok(SymmetricKeyPair::derive(self.secret()?, counterparty))
    }

    /// Cipher a payload only this actor can read
    pub fn cipher(&self, payload: &[u8]) -> Result<Envelope, CipherError> {
        Ok(self.keys_with(self.public_key())?.cipher(payload)?)
    }

    /// Cipher a payload for a recipient.
    ///
    /// The envelope is owned by this actor (the sender); the recipient
    /// re-derives the same keys from its private key and our public key.
    pub fn cipher_for(&self, payload: &[u8], recipient: &PublicKey) -> Result<Envelope, CipherError> {
        Ok(self.keys_with(recipient)?.cipher(payload)?)
    }

    /// Decipher a payload this actor ciphered for itself
    pub fn decipher(&self, envelope: &Envelope) -> Result<Vec<u8>, CipherError> {
        Ok(self.keys_with(self.public_key())?.decipher(envelope)?)
    }

    /// Decipher a shared payload, whether this actor was its sender or its
    /// recipient, given the other side's public key
    pub fn decipher_shared(
        &self,
        envelope: &Envelope,
        counterparty: &PublicKey,
    ) -> Result<Vec<u8>, CipherError> {
        Ok(self.keys_with(counterparty)?.decipher(envelope)?)
    }
}
