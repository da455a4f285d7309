//! Weave
//!
//! Renders page files from the visual builder to HTML and checks them
//! from the command line.

use clap::Parser;
use tracing_subscriber::EnvFilter;
use weave_cli::Cli;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins; --verbose raises the default
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!(version = weave_cli::VERSION, "starting weave");
    weave_cli::run(cli).await
}
