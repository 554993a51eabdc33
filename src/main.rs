//! cropyield - Main Entry Point
//!
//! Serves crop yield predictions over HTTP by default; see `--help` for the other commands.

use clap::Parser;
use cropyield::cli::{self, Cli};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let debug = std::env::var("CROP_DEBUG")
        .map(|v| v.eq_ignore_ascii_case("true"))
        .unwrap_or(false);
    let default_filter = if debug {
        "cropyield=debug,tower_http=debug"
    } else {
        "cropyield=info,tower_http=info"
    };

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .init();

    cli::run(Cli::parse()).await
}
