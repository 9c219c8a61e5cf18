//! # Actors
//!
//! An actor is any identity that can own or receive ciphered payloads:
//! an individual user (which has an `address`) or a group (which has a
//! `name`). Actors are immutable values fetched from an external
//! [`ActorDirectory`]; nothing in this crate mutates or persists them.
//!
//! The private key is only present when the directory decided the caller is
//! entitled to it, e.g. the logged in user or a group the user has a role in.

mod auth;
mod directory;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::crypto::{PublicKey, SecretKey};

pub use auth::AuthContext;
pub use directory::{ActorDirectory, ActorLookup, DirectoryError};

/// Opaque actor identifier
pub type ActorId = Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Actor {
    pub id: ActorId,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    pub public_key: PublicKey,
    /// Security data, only returned to entitled callers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_key: Option<SecretKey>,
}

impl Actor {
    /// Build an actor carrying its full key material
    pub fn with_secret(id: ActorId, secret_key: SecretKey) -> Self {
        Self {
            id,
            address: None,
            name: None,
            public_key: secret_key.public(),
            private_key: Some(secret_key),
        }
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Individual users are identified by an address, groups are not
    pub fn is_user(&self) -> bool {
        self.address.is_some()
    }

    pub fn has_private_key(&self) -> bool {
        self.private_key.is_some()
    }

    /// The public view of this actor, with the private key stripped
    pub fn public_view(&self) -> Self {
        Self {
            private_key: None,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_public_view_strips_private_key() {
        let actor = Actor::with_secret(Uuid::new_v4(), SecretKey::generate()).with_name("group1");
        assert!(actor.has_private_key());

        let public = actor.public_view();
        assert!(!public.has_private_key());
        assert_eq!(public.public_key, actor.public_key);
        assert_eq!(public.name.as_deref(), Some("group1"));
        assert!(!public.is_user());
    }

    #[test]
    fn test_serde_matches_directory_shape() {
        let secret = SecretKey::generate();
        let id = Uuid::new_v4();
        let json = serde_json::json!({
            "id": id,
            "address": "5Dnk6vQhAVDY9ysZr8jrqWJENDWYHaF3zorFA4dr9Mtbei77",
            "name": null,
            "publicKey": secret.public().to_hex(),
            "privateKey": secret.to_hex(),
        });

        let actor: Actor = serde_json::from_value(json).unwrap();
        assert_eq!(actor.id, id);
        assert!(actor.is_user());
        assert_eq!(actor.private_key, Some(secret));

        let public: Actor = serde_json::from_value(serde_json::json!({
            "id": id,
            "publicKey": actor.public_key.to_hex(),
        }))
        .unwrap();
        assert!(!public.has_private_key());
    }
}
