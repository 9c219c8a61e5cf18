//! Cryptographic primitives for end-to-end encrypted payloads
//!
//! This module provides the three layers every cipher call goes through:
//!
//! - **Identity**: secp256k1 keypairs (`SecretKey`/`PublicKey`) for every actor
//! - **Key agreement**: ECDH + SHA-512 split into a `SymmetricKeyPair`
//! - **Authenticated encryption**: AES-256-CBC with an HMAC-SHA256 tag over
//!   `iv || ciphertext`, packaged as an `Envelope`
//!
//! # Security Model
//!
//! ## Actor Identity
//! Each actor (a user or a group) has a secp256k1 keypair. The public key is
//! world readable through the actor directory; the private key is only handed
//! to callers entitled to act as that actor.
//!
//! ## Two-Party Sharing
//! Payloads shared between actors A and B are ciphered under
//! `derive(a, B) == derive(b, A)`. Either side can decipher with its own
//! private key and the other side's public key; no shared secret is stored.
//!
//! ## Self-Owned Data
//! Data an actor keeps for itself is ciphered under `derive(a, A)`.
//!
//! ## Tamper Detection
//! The MAC is verified in constant time before decryption. Any failure,
//! including bad padding after a valid MAC, is reported as an invalid MAC.

mod envelope;
mod keys;
mod shared_secret;

pub use envelope::{Envelope, EnvelopeError, IV_SIZE, MAC_SIZE};
pub use keys::{
    generate_key_pair, KeyError, KeyPair, PublicKey, SecretKey, PRIVATE_KEY_SIZE,
    PUBLIC_KEY_SIZE,
};
pub use shared_secret::{SymmetricKeyPair, CIPHER_KEY_SIZE, MAC_KEY_SIZE};
