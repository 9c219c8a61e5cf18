pub use clap::Parser;

use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "hprv")]
#[command(about = "Seal and open end-to-end encrypted payloads")]
pub struct Args {
    /// Path to the hprv config directory (defaults to ~/.hprv)
    #[arg(long, global = true)]
    pub config_path: Option<PathBuf>,

    /// Default log level, overridden by RUST_LOG
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: tracing::Level,

    #[command(subcommand)]
    pub command: crate::Command,
}
