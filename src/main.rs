//! ROM Minder - A ROM library management tool.
//!
//! Lists platforms and ROMs on disk, identifies games against the IGDB
//! metadata provider and caches their cover art next to the library.

pub mod cli;
pub mod config;
pub mod cover;
pub mod enrichment;
pub mod error;
pub mod ingest;
pub mod library;
#[cfg(test)]
pub mod test_utils;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Exit status for unusable provider credentials
const EXIT_FATAL: i32 = 2;

fn main() -> anyhow::Result<()> {
    let args = cli::Cli::parse();

    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(EnvFilter::from_default_env().add_directive("rom_minder=info".parse()?))
        .init();

    match cli::run_command(&args) {
        Err(e) if cli::is_fatal(&e) => {
            tracing::error!("{:#}", e);
            std::process::exit(EXIT_FATAL);
        }
        result => result,
    }
}
