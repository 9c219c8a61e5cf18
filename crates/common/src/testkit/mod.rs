//! In-memory collaborators for exercising the cipher engine without a
//! real actor service or login flow.
//!
//! # Example
//!
//! ```rust
//! use common::actor::AuthContext;
//! use common::testkit::{MemoryActorDirectory, MemorySession};
//!
//! let session = MemorySession::new();
//! let directory = MemoryActorDirectory::new(session.clone());
//! let alice = directory.add_user("alice");
//! let group = directory.add_group("group1");
//! directory.grant(alice.id, group.id);
//!
//! session.login(alice.clone());
//! assert_eq!(session.current_actor().map(|actor| actor.id), Some(alice.id));
//! ```

mod directory;
mod session;

pub use directory::MemoryActorDirectory;
pub use session::MemorySession;
