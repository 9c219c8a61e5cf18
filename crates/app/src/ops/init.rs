use std::path::PathBuf;

use clap::Args;

use crate::state::{AppConfig, AppState};

#[derive(Args, Debug, Clone)]
pub struct Init {
    /// Display name for the new identity
    #[arg(long)]
    pub name: Option<String>,

    /// Content store location (default: <config dir>/store)
    #[arg(long)]
    pub store_path: Option<PathBuf>,
}

#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("init failed: {0}")]
    StateFailed(#[from] crate::state::StateError),
}

#[async_trait::async_trait]
impl crate::op::Op for Init {
    type Error = InitError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let config = AppConfig {
            name: self.name.clone(),
            store_path: self.store_path.clone(),
            ..Default::default()
        };

        let state = AppState::init(ctx.config_path.clone(), Some(config))?;
        let public_key = state.load_key()?.public();

        let output = format!(
            "Initialized hprv directory at: {}\n\
             - Actor: {}\n\
             - Public key: {}\n\
             - Key: {}\n\
             - Store: {}\n\
             - Config: {}",
            state.hprv_dir.display(),
            state.config.actor_id,
            public_key,
            state.key_path.display(),
            state.store_path.display(),
            state.config_path.display(),
        );

        Ok(output)
    }
}
