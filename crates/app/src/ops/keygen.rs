use clap::Args;

use common::crypto::generate_key_pair;

/// Print a fresh key pair without touching local state
#[derive(Args, Debug, Clone)]
pub struct Keygen;

#[async_trait::async_trait]
impl crate::op::Op for Keygen {
    type Error = std::convert::Infallible;
    type Output = String;

    async fn execute(&self, _ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let (public_key, private_key) = generate_key_pair();
        Ok(format!(
            "public key:  {}\nprivate key: {}",
            public_key, private_key
        ))
    }
}
