use std::path::PathBuf;

use clap::Args;

use common::content::ContentId;
use common::crypto::PublicKey;
use common::document::{DocumentError, Payload};

use crate::local::Engine;
use crate::state::{AppState, StateError};

#[derive(Args, Debug, Clone)]
pub struct Open {
    /// Content id printed by `seal`
    pub cid: ContentId,

    /// Public key of the other party of a shared payload
    #[arg(long)]
    pub with: Option<PublicKey>,

    /// Write the payload here instead of printing it
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, thiserror::Error)]
pub enum OpenError {
    #[error(transparent)]
    State(#[from] StateError),
    #[error("failed to write {0}: {1}")]
    Write(PathBuf, std::io::Error),
    #[error(transparent)]
    Document(#[from] DocumentError),
    #[error(transparent)]
    Default(#[from] anyhow::Error),
}

#[async_trait::async_trait]
impl crate::op::Op for Open {
    type Error = OpenError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let state = AppState::load(ctx.config_path.clone())?;
        let engine = Engine::load(&state).await?;

        let parties = self
            .with
            .as_ref()
            .map(|with| engine.identity.parties_with(with));
        let payload = engine
            .documents
            .open(&self.cid, parties.as_ref(), None)
            .await?;
        let bytes = match &payload {
            Payload::Json(value) => serde_json::to_vec_pretty(value).map_err(DocumentError::from)?,
            Payload::File { bytes, .. } => bytes.clone(),
        };

        match &self.output {
            Some(path) => {
                tokio::fs::write(path, &bytes)
                    .await
                    .map_err(|e| OpenError::Write(path.clone(), e))?;
                Ok(format!(
                    "wrote {} bytes ({}) to {}",
                    bytes.len(),
                    payload.mime(),
                    path.display()
                ))
            }
            None => Ok(String::from_utf8_lossy(&bytes).into_owned()),
        }
    }
}
