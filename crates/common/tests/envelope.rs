//! Properties of the authenticated cipher across key pairs

use common::crypto::{Envelope, EnvelopeError, SecretKey, SymmetricKeyPair, IV_SIZE, MAC_SIZE};
use proptest::prelude::*;

fn secret_key() -> impl Strategy<Value = SecretKey> {
    any::<[u8; 32]>().prop_filter_map("scalar out of range", |bytes| {
        SecretKey::try_from(bytes).ok()
    })
}

fn flip(bytes: &mut [u8], bit: usize) {
    let bit = bit % (bytes.len() * 8);
    bytes[bit / 8] ^= 1 << (bit % 8);
}

#[test]
fn test_json_payload_round_trip() {
    let payload = serde_json::to_vec(&serde_json::json!({"prop1": 1, "prop2": "hola"})).unwrap();
    let a = SecretKey::generate();
    let keys = SymmetricKeyPair::derive(&a, &a.public());

    let envelope = keys.cipher(&payload).unwrap();
    assert_eq!(envelope.iv.len(), IV_SIZE);
    assert_eq!(envelope.mac.len(), MAC_SIZE);
    assert_eq!(keys.decipher(&envelope).unwrap(), payload);
}

#[test]
fn test_hex_parts_survive_transport() {
    let a = SecretKey::generate();
    let keys = SymmetricKeyPair::derive(&a, &a.public());
    let envelope = keys.cipher(b"over the wire").unwrap();

    let (ciphered_payload, iv, mac) = envelope.to_hex_parts();
    let parsed = Envelope::from_hex_parts(&ciphered_payload, &iv, &mac).unwrap();
    assert_eq!(keys.decipher(&parsed).unwrap(), b"over the wire");

    assert!(matches!(
        Envelope::from_hex_parts(&ciphered_payload, "00", &mac),
        Err(EnvelopeError::Encoding(_))
    ));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_self_round_trip(a in secret_key(), payload in proptest::collection::vec(any::<u8>(), 0..512)) {
        let keys = SymmetricKeyPair::derive(&a, &a.public());
        let envelope = keys.cipher(&payload).unwrap();
        prop_assert_eq!(keys.decipher(&envelope).unwrap(), payload);
    }

    #[test]
    fn prop_cross_party_round_trip(
        a in secret_key(),
        b in secret_key(),
        payload in proptest::collection::vec(any::<u8>(), 0..512),
    ) {
        let sender = SymmetricKeyPair::derive(&a, &b.public());
        let recipient = SymmetricKeyPair::derive(&b, &a.public());

        let envelope = sender.cipher(&payload).unwrap();
        prop_assert_eq!(sender.decipher(&envelope).unwrap(), payload.clone());
        prop_assert_eq!(recipient.decipher(&envelope).unwrap(), payload);
    }

    #[test]
    fn prop_any_bit_flip_is_rejected(
        a in secret_key(),
        payload in proptest::collection::vec(any::<u8>(), 1..256),
        field in 0usize..3,
        bit in any::<usize>(),
    ) {
        let keys = SymmetricKeyPair::derive(&a, &a.public());
        let mut envelope = keys.cipher(&payload).unwrap();
        match field {
            0 => flip(&mut envelope.ciphered_payload, bit),
            1 => flip(&mut envelope.iv, bit),
            _ => flip(&mut envelope.mac, bit),
        }
        prop_assert!(matches!(keys.decipher(&envelope), Err(EnvelopeError::InvalidMac)));
    }

    #[test]
    fn prop_wrong_keys_are_rejected(
        a in secret_key(),
        b in secret_key(),
        c in secret_key(),
        payload in proptest::collection::vec(any::<u8>(), 0..256),
    ) {
        prop_assume!(c != a && c != b);
        let envelope = SymmetricKeyPair::derive(&a, &b.public()).cipher(&payload).unwrap();

        // an outsider paired with either party
        let outsider_a = SymmetricKeyPair::derive(&c, &a.public());
        let outsider_b = SymmetricKeyPair::derive(&c, &b.public());
        prop_assert!(matches!(outsider_a.decipher(&envelope), Err(EnvelopeError::InvalidMac)));
        prop_assert!(matches!(outsider_b.decipher(&envelope), Err(EnvelopeError::InvalidMac)));
    }
}
