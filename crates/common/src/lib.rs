/**
 * Cryptographic types and operations.
 *  - secp256k1 key pairs
 *  - ECDH derived symmetric key pairs
 *  - Authenticated envelopes (AES-256-CBC + HMAC-SHA256)
 */
pub mod crypto;
/**
 * Identities that own or receive ciphered
 *  payloads, and the traits describing the
 *  external directory and session they come from.
 */
pub mod actor;
/**
 * Per-actor ciphers and the session-scoped
 *  coordinator deciding which actor a call
 *  runs as.
 */
pub mod cipher;
/**
 * Content-addressed storage for sealed payloads.
 */
pub mod content;
/**
 * Typed payloads stored and shared
 *  as ciphered documents.
 */
pub mod document;
/**
 * In-memory collaborators for tests and demos.
 */
pub mod testkit;

pub mod prelude {
    pub use crate::actor::{Actor, ActorDirectory, ActorId, ActorLookup, AuthContext};
    pub use crate::cipher::{CipherCoordinator, CipherError, OwnedEnvelope, SharedParties};
    pub use crate::content::{ContentId, ContentStore, FsContentStore, MemoryContentStore};
    pub use crate::crypto::{Envelope, KeyPair, PublicKey, SecretKey};
    pub use crate::document::{DocumentRecord, Documents, Payload};
}
