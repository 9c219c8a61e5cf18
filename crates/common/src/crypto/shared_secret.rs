//! Symmetric key derivation from an ECDH exchange
//!
//! Two actors derive the same [`SymmetricKeyPair`] without ever exchanging
//! private keys:
//!
//! 1. **ECDH**: multiply the other actor's public point by our private scalar
//! 2. **Serialize**: take the 32-byte x-coordinate of the shared point
//! 3. **Hash**: SHA-512 over those bytes
//! 4. **Split**: first 32 bytes are the AES-256 key, last 32 the HMAC key
//!
//! Because `a * (b * G) == b * (a * G)`, deriving with `(a, B)` and with
//! `(b, A)` yields the same pair. Deriving with an actor's own `(a, A)`
//! gives the key pair that actor uses for data only it can read.

use sha2::{Digest, Sha512};
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::keys::{PublicKey, SecretKey};

/// Size of the AES-256 cipher key in bytes
pub const CIPHER_KEY_SIZE: usize = 32;
/// Size of the HMAC-SHA256 key in bytes
pub const MAC_KEY_SIZE: usize = 32;

/// Ephemeral key material for one cipher or decipher call.
///
/// Never persisted; the bytes are wiped when the pair is dropped.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct SymmetricKeyPair {
    cipher_key: [u8; CIPHER_KEY_SIZE],
    mac_key: [u8; MAC_KEY_SIZE],
}

impl std::fmt::Debug for SymmetricKeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SymmetricKeyPair(..)")
    }
}

impl SymmetricKeyPair {
    /// Derive the key pair shared between `secret`'s owner and `public`'s owner
    pub fn derive(secret: &SecretKey, public: &PublicKey) -> Self {
        let shared = secret.diffie_hellman(public);
        let mut digest = Sha512::digest(shared.raw_secret_bytes());

        let mut cipher_key = [0u8; CIPHER_KEY_SIZE];
        let mut mac_key = [0u8; MAC_KEY_SIZE];
        cipher_key.copy_from_slice(&digest[..CIPHER_KEY_SIZE]);
        mac_key.copy_from_slice(&digest[CIPHER_KEY_SIZE..]);
        digest.as_mut_slice().zeroize();

        Self {
            cipher_key,
            mac_key,
        }
    }

    pub fn cipher_key(&self) -> &[u8; CIPHER_KEY_SIZE] {
        &self.cipher_key
    }

    pub fn mac_key(&self) -> &[u8; MAC_KEY_SIZE] {
        &self.mac_key
    }
}
