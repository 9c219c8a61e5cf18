use clap::Args;

use crate::state::{AppState, StateError};

/// Print the local actor id and public key
#[derive(Args, Debug, Clone)]
pub struct Identity;

#[async_trait::async_trait]
impl crate::op::Op for Identity {
    type Error = StateError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let state = AppState::load(ctx.config_path.clone())?;
        let public_key = state.load_key()?.public();

        let mut output = format!(
            "actor id:   {}\npublic key: {}",
            state.config.actor_id, public_key
        );
        if let Some(name) = &state.config.name {
            output.push_str(&format!("\nname:       {}", name));
        }
        Ok(output)
    }
}
