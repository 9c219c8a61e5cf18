//! Authenticated encryption with AES-256-CBC and HMAC-SHA256
//!
//! An [`Envelope`] is the unit handed to the content store:
//!
//! ```text
//! cipheredPayload = AES-256-CBC(cipher_key, iv, PKCS7(payload))
//! mac             = HMAC-SHA256(mac_key, iv || cipheredPayload)
//! ```
//!
//! Deciphering always verifies the MAC (in constant time) before touching the
//! ciphertext. A MAC mismatch and a padding failure surface as the same
//! [`EnvelopeError::InvalidMac`] so the two cannot be told apart.

use aes::Aes256;
use cbc::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use serde_with::{hex::Hex, serde_as};
use sha2::Sha256;

use super::shared_secret::SymmetricKeyPair;

/// Size of the CBC initialization vector in bytes
pub const IV_SIZE: usize = 16;
/// Size of an HMAC-SHA256 tag in bytes
pub const MAC_SIZE: usize = 32;

type Aes256CbcEnc = cbc::Encryptor<Aes256>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;
type HmacSha256 = Hmac<Sha256>;

/// Errors that can occur while ciphering or deciphering an envelope
#[derive(Debug, thiserror::Error)]
pub enum EnvelopeError {
    /// Tampered ciphertext, iv or mac, or the wrong key pair
    #[error("invalid MAC")]
    InvalidMac,
    #[error("envelope encoding error: {0}")]
    Encoding(String),
    #[error("envelope error: {0}")]
    Default(#[from] anyhow::Error),
}

/// Ciphertext, IV and MAC produced by one cipher operation.
///
/// Serializes with hex-encoded `cipheredPayload`, `iv` and `mac` fields.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    #[serde_as(as = "Hex")]
    pub ciphered_payload: Vec<u8>,
    #[serde_as(as = "Hex")]
    pub iv: [u8; IV_SIZE],
    #[serde_as(as = "Hex")]
    pub mac: [u8; MAC_SIZE],
}

impl Envelope {
    /// Parse an envelope from the hex strings exchanged with metadata storage
    pub fn from_hex_parts(
        ciphered_payload: &str,
        iv: &str,
        mac: &str,
    ) -> Result<Self, EnvelopeError> {
        let ciphered_payload = hex::decode(ciphered_payload)
            .map_err(|e| EnvelopeError::Encoding(format!("ciphered payload: {}", e)))?;

        let mut iv_buff = [0u8; IV_SIZE];
        hex::decode_to_slice(iv, &mut iv_buff)
            .map_err(|e| EnvelopeError::Encoding(format!("iv: {}", e)))?;

        let mut mac_buff = [0u8; MAC_SIZE];
        hex::decode_to_slice(mac, &mut mac_buff)
            .map_err(|e| EnvelopeError::Encoding(format!("mac: {}", e)))?;

        Ok(Self {
            ciphered_payload,
            iv: iv_buff,
            mac: mac_buff,
        })
    }

    /// Hex strings for `(cipheredPayload, iv, mac)`
    pub fn to_hex_parts(&self) -> (String, String, String) {
        (
            hex::encode(&self.ciphered_payload),
            hex::encode(self.iv),
            hex::encode(self.mac),
        )
    }
}

fn compute_mac(
    keys: &SymmetricKeyPair,
    iv: &[u8],
    ciphered_payload: &[u8],
) -> Result<HmacSha256, EnvelopeError> {
    let mut mac = <HmacSha256 as Mac>::new_from_slice(keys.mac_key())
        .map_err(|e| anyhow::anyhow!("hmac key error: {}", e))?;
    mac.update(iv);
    mac.update(ciphered_payload);
    Ok(mac)
}

impl SymmetricKeyPair {
    /// Encrypt and authenticate a payload under a fresh random IV
    ///
    /// # Errors
    ///
    /// Returns an error only if the system RNG fails.
    pub fn cipher(&self, payload: &[u8]) -> Result<Envelope, EnvelopeError> {
        let mut iv = [0u8; IV_SIZE];
        getrandom::getrandom(&mut iv).map_err(|e| anyhow::anyhow!("failed to generate iv: {}", e))?;

        let ciphered_payload = Aes256CbcEnc::new(&(*self.cipher_key()).into(), &iv.into())
            .encrypt_padded_vec_mut::<Pkcs7>(payload);

        let mac = compute_mac(self, &iv, &ciphered_payload)?
            .finalize()
            .into_bytes();

        Ok(Envelope {
            ciphered_payload,
            iv,
            mac: mac.into(),
        })
    }

    /// Verify and decrypt an envelope
    ///
    /// # Errors
    ///
    /// Returns [`EnvelopeError::InvalidMac`] if the MAC does not match or
    /// the plaintext padding is malformed.
    pub fn decipher(&self, envelope: &Envelope) -> Result<Vec<u8>, EnvelopeError> {
        compute_mac(self, &envelope.iv, &envelope.ciphered_payload)?
            .verify_slice(&envelope.mac)
            .map_err(|_| EnvelopeError::InvalidMac)?;

        Aes256CbcDec::new(&(*self.cipher_key()).into(), &envelope.iv.into())
            .decrypt_padded_vec_mut::<Pkcs7>(&envelope.ciphered_payload)
            .map_err(|_| EnvelopeError::InvalidMac)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::crypto::SecretKey;

    fn self_keys() -> SymmetricKeyPair {
        let secret = SecretKey::generate();
        SymmetricKeyPair::derive(&secret, &secret.public())
    }

    #[test]
    fn test_cipher_decipher_json_payload() {
        let payload = serde_json::to_vec(&serde_json::json!({"prop1": 1, "prop2": "hola"})).unwrap();
        let keys = self_keys();

        let envelope = keys.cipher(&payload).unwrap();
        assert_eq!(envelope.iv.len(), IV_SIZE);
        assert_eq!(envelope.mac.len(), MAC_SIZE);
        assert_eq!(envelope.ciphered_payload.len() % 16, 0);
        assert_ne!(envelope.ciphered_payload, payload);

        let deciphered = keys.decipher(&envelope).unwrap();
        assert_eq!(deciphered, payload);
    }

    #[test]
    fn test_empty_payload() {
        let keys = self_keys();
        let envelope = keys.cipher(b"").unwrap();
        // a full block of padding
        assert_eq!(envelope.ciphered_payload.len(), 16);
        assert_eq!(keys.decipher(&envelope).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_fresh_iv_per_cipher() {
        let keys = self_keys();
        let first = keys.cipher(b"same payload").unwrap();
        let second = keys.cipher(b"same payload").unwrap();
        assert_ne!(first.iv, second.iv);
        assert_ne!(first.ciphered_payload, second.ciphered_payload);
    }

    #[test]
    fn test_wrong_keys_rejected() {
        let keys = self_keys();
        let other = self_keys();
        let envelope = keys.cipher(b"secret").unwrap();
        assert!(matches!(
            other.decipher(&envelope),
            Err(EnvelopeError::InvalidMac)
        ));
    }

    #[test]
    fn test_bad_padding_behind_valid_mac() {
        let keys = self_keys();
        let iv = [7u8; IV_SIZE];

        for len in [0, 15, 32] {
            let ciphered_payload = vec![0xAA; len];
            let mac = compute_mac(&keys, &iv, &ciphered_payload)
                .unwrap()
                .finalize()
                .into_bytes();
            let envelope = Envelope {
                ciphered_payload,
                iv,
                mac: mac.into(),
            };
            assert!(
                matches!(keys.decipher(&envelope), Err(EnvelopeError::InvalidMac)),
                "ciphertext of {} bytes",
                len
            );
        }
    }

    #[test]
    fn test_hex_parts_roundtrip() {
        let keys = self_keys();
        let envelope = keys.cipher(b"hex me").unwrap();

        let (ciphered, iv, mac) = envelope.to_hex_parts();
        let parsed = Envelope::from_hex_parts(&ciphered, &iv, &mac).unwrap();
        assert_eq!(parsed, envelope);

        // iv too short
        assert!(matches!(
            Envelope::from_hex_parts(&ciphered, &iv[..30], &mac),
            Err(EnvelopeError::Encoding(_))
        ));
    }

    #[test]
    fn test_serde_field_names() {
        let keys = self_keys();
        let envelope = keys.cipher(b"json").unwrap();
        let value = serde_json::to_value(&envelope).unwrap();

        assert_eq!(value["iv"], hex::encode(envelope.iv));
        assert_eq!(value["mac"], hex::encode(envelope.mac));
        assert_eq!(
            value["cipheredPayload"],
            hex::encode(&envelope.ciphered_payload)
        );

        let back: Envelope = serde_json::from_value(value).unwrap();
        assert_eq!(back, envelope);
    }
}
