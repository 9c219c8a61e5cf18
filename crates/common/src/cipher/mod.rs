//! # Ciphers
//!
//! [`ActorCipher`] binds the envelope primitives to one actor's keys.
//! [`CipherCoordinator`] decides which actor a call runs as, fetches
//! private keys from the [`ActorDirectory`](crate::actor::ActorDirectory)
//! on demand, and keeps them cached for the length of a session.

mod actor_cipher;
mod coordinator;
mod error;

pub use actor_cipher::ActorCipher;
pub use coordinator::{CipherCoordinator, OwnedEnvelope, Resolution, SharedParties};
pub use error::CipherError;
