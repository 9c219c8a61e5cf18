use crate::actor::{ActorId, DirectoryError};
use crate::crypto::EnvelopeError;

/// Errors surfaced by cipher and decipher operations.
///
/// All of them are terminal for the operation that raised them; nothing
/// here is retried internally.
#[derive(Debug, thiserror::Error)]
pub enum CipherError {
    /// Authentication failure: tampered envelope or wrong key pair
    #[error("invalid MAC")]
    InvalidMac,
    /// The operation needed a private key the directory did not hand out
    #[error("user does not have permission to view private info of actor {0}")]
    NoPrivateKeyAccess(ActorId),
    /// Neither side of a shared envelope is available to this session
    #[error("no identity available to this session can decrypt this payload")]
    PermissionDenied,
    #[error("no user is logged in")]
    NotLoggedIn,
    #[error("actor directory error: {0}")]
    Directory(#[from] DirectoryError),
    #[error("cipher error: {0}")]
    Default(#[from] anyhow::Error),
}

impl From<EnvelopeError> for CipherError {
    fn from(err: EnvelopeError) -> Self {
        match err {
            EnvelopeError::InvalidMac => CipherError::InvalidMac,
            EnvelopeError::Encoding(msg) => anyhow::anyhow!("envelope encoding error: {}", msg).into(),
            EnvelopeError::Default(e) => CipherError::Default(e),
        }
    }
}
