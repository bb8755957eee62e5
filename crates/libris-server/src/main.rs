//! Libris server binary
//!
//! ```text
//! libris --config /etc/libris/libris.toml
//! ```
//!
//! Without `--config` the loader searches `./libris.toml`, `./libris/` and the
//! user config directory, then applies `LIBRIS__*` environment overrides.

use clap::Parser;
use libris_server::run;

/// Command line interface for Libris
#[derive(Parser, Debug)]
#[command(name = "libris")]
#[command(about = "Libris - library management backend")]
#[command(version)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    pub config: Option<std::path::PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    run(cli.config.as_deref()).await
}
