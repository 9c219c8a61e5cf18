use std::fmt::Debug;

use super::Actor;

/// The session collaborator.
///
/// Login and logout themselves (challenge signing, tokens) live outside
/// this crate. On logout the host must call
/// [`CipherCoordinator::reset`](crate::cipher::CipherCoordinator::reset).
pub trait AuthContext: Send + Sync + Debug {
    fn is_logged_in(&self) -> bool;

    /// The authenticated actor, `None` when logged out
    fn current_actor(&self) -> Option<Actor>;
}
