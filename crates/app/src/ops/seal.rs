use std::path::PathBuf;

use clap::Args;

use common::crypto::PublicKey;
use common::document::{DocumentError, Payload};

use crate::local::Engine;
use crate::state::{AppState, StateError};

/// Extension used when neither --mime nor the file name says otherwise
const FALLBACK_EXTENSION: &str = "bin";

#[derive(Args, Debug, Clone)]
pub struct Seal {
    /// File to seal
    pub file: PathBuf,

    /// Seal for this public key instead of for ourselves
    #[arg(long)]
    pub to: Option<PublicKey>,

    /// MIME type or extension of the file (default: from the file name)
    #[arg(long)]
    pub mime: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum SealError {
    #[error(transparent)]
    State(#[from] StateError),
    #[error("failed to read {0}: {1}")]
    Read(PathBuf, std::io::Error),
    #[error(transparent)]
    Document(#[from] DocumentError),
    #[error(transparent)]
    Default(#[from] anyhow::Error),
}

impl Seal {
    fn kind(&self) -> String {
        match &self.mime {
            Some(mime) => mime.clone(),
            None => self
                .file
                .extension()
                .and_then(|ext| ext.to_str())
                .unwrap_or(FALLBACK_EXTENSION)
                .to_lowercase(),
        }
    }
}

#[async_trait::async_trait]
impl crate::op::Op for Seal {
    type Error = SealError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let state = AppState::load(ctx.config_path.clone())?;
        let engine = Engine::load(&state).await?;

        let bytes = tokio::fs::read(&self.file)
            .await
            .map_err(|e| SealError::Read(self.file.clone(), e))?;
        let payload = match Payload::file(&self.kind(), bytes)? {
            // validates json input up front
            Payload::File { extension, bytes } => Payload::from_bytes(&extension, bytes)?,
            payload => payload,
        };

        let (cid, _) = engine
            .documents
            .seal(&payload, self.to.as_ref(), None)
            .await?;
        tracing::info!("sealed {} as {}", self.file.display(), cid);

        Ok(cid.to_string())
    }
}
