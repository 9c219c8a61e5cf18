//! Shared test utilities for cipher and document integration tests
#![allow(dead_code)]

use std::sync::{Arc, Once};

use common::actor::{Actor, ActorDirectory};
use common::cipher::CipherCoordinator;
use common::content::MemoryContentStore;
use common::document::Documents;
use common::testkit::{MemoryActorDirectory, MemorySession};

static TRACING: Once = Once::new();

/// Log to the test writer, honoring RUST_LOG
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// A directory, a session and a coordinator wired together, plus the
///  actors most tests need
pub struct TestEnv {
    pub session: MemorySession,
    pub directory: MemoryActorDirectory,
    pub coordinator: Arc<CipherCoordinator>,
    pub content: MemoryContentStore,
    pub documents: Documents,
    pub alice: Actor,
    pub bob: Actor,
    pub carol: Actor,
    /// alice is a member
    pub group: Actor,
}

pub fn setup_test_env() -> TestEnv {
    init_tracing();

    let session = MemorySession::new();
    let directory = MemoryActorDirectory::new(session.clone());
    let alice = directory.add_user("alice");
    let bob = directory.add_user("bob");
    let carol = directory.add_user("carol");
    let group = directory.add_group("group1");
    directory.grant(alice.id, group.id);

    let shared_directory: Arc<dyn ActorDirectory> = Arc::new(directory.clone());
    let coordinator = Arc::new(CipherCoordinator::new(
        Arc::new(session.clone()),
        shared_directory.clone(),
    ));
    let content = MemoryContentStore::new();
    let documents = Documents::new(
        coordinator.clone(),
        shared_directory,
        Arc::new(content.clone()),
    );

    TestEnv {
        session,
        directory,
        coordinator,
        content,
        documents,
        alice,
        bob,
        carol,
        group,
    }
}

impl TestEnv {
    /// Log out whoever is logged in and start a session as `actor`
    pub fn login(&self, actor: &Actor) {
        self.logout();
        self.session.login(actor.clone());
        self.coordinator.start_session().unwrap();
    }

    pub fn logout(&self) {
        self.session.logout();
        self.coordinator.reset();
    }
}
