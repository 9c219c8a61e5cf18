use std::sync::Arc;

use parking_lot::RwLock;

use crate::actor::{Actor, AuthContext};

/// Login state shared between a test and the collaborators it hands it to
#[derive(Debug, Clone, Default)]
pub struct MemorySession {
    current: Arc<RwLock<Option<Actor>>>,
}

impl MemorySession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn login(&self, actor: Actor) {
        tracing::debug!("memory session login as {}", actor.id);
        *self.current.write() = Some(actor);
    }

    pub fn logout(&self) {
        *self.current.write() = None;
    }
}

impl AuthContext for MemorySession {
    fn is_logged_in(&self) -> bool {
        self.current.read().is_some()
    }

    fn current_actor(&self) -> Option<Actor> {
        self.current.read().clone()
    }
}

#[cfg(test)]
mod test {
    use uuid::Uuid;

    use super::*;
    use crate::crypto::SecretKey;

    #[test]
    fn test_login_survives_panicked_holder() {
        let session = MemorySession::new();
        let alice = Actor::with_secret(Uuid::new_v4(), SecretKey::generate());

        let held = session.clone();
        let result = std::thread::spawn(move || {
            let _guard = held.current.write();
            panic!("holder died");
        })
        .join();
        assert!(result.is_err());

        let observer = session.clone();
        session.login(alice.clone());
        assert!(observer.is_logged_in());
        assert_eq!(observer.current_actor().map(|actor| actor.id), Some(alice.id));

        session.logout();
        assert!(!observer.is_logged_in());
    }
}
