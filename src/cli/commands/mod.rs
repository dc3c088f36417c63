//! CLI command definitions and dispatch.
//!
//! Each group of subcommands lives in its own submodule:
//! - `library`: listing, renaming and deleting ROMs on disk
//! - `enrich`: provider lookups, platform scans and cover caching

mod enrich;
mod library;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use tokio::runtime::Runtime;

use crate::config::{self, Config};
use crate::cover::{CoverStore, HttpCoverDownloader};
use crate::enrichment::{
    EnrichmentError, EnrichmentService, IgdbClient, MemoryTokenStore, TokenCache,
    TwitchTokenIssuer,
};
use crate::error::Error;
use crate::ingest::IngestionCoordinator;
use crate::library::LibraryStore;

pub use enrich::{cmd_candidates, cmd_defaults, cmd_identify, cmd_lookup, cmd_scan, cmd_search};
pub use library::{cmd_delete, cmd_platforms, cmd_raw, cmd_rename, cmd_roms};

/// ROM Minder CLI
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file (default: OS config dir)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Library root, overriding the config file
    #[arg(long, global = true)]
    pub library: Option<PathBuf>,

    /// IGDB client ID
    #[arg(long, global = true, env = "IGDB_CLIENT_ID", hide_env_values = true)]
    pub client_id: Option<String>,

    /// IGDB client secret
    #[arg(long, global = true, env = "IGDB_CLIENT_SECRET", hide_env_values = true)]
    pub client_secret: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Which root a raw path is relative to
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RawKind {
    Rom,
    Asset,
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// List platforms in the library
    Platforms,
    /// List ROMs of a platform
    Roms {
        platform: String,
        /// Only print the number of ROMs
        #[arg(long)]
        count: bool,
    },
    /// Identify a single ROM and cache its cover
    Identify {
        platform: String,
        file: String,
        /// Re-download covers even if cached
        #[arg(long)]
        overwrite: bool,
        /// List every candidate instead of caching the best match
        #[arg(long, conflicts_with = "overwrite")]
        all: bool,
    },
    /// Search the provider for every match of a title
    Search { platform: String, term: String },
    /// Look up a game by provider ID
    Lookup { id: u64 },
    /// Identify every ROM of one platform, or of the whole library
    Scan {
        platform: Option<String>,
        /// Re-download covers even if cached
        #[arg(long)]
        overwrite: bool,
    },
    /// Rename a ROM (refuses to overwrite)
    Rename {
        platform: String,
        from: String,
        to: String,
    },
    /// Delete a ROM
    Delete { platform: String, file: String },
    /// Download the placeholder covers
    Defaults {
        #[arg(long)]
        overwrite: bool,
    },
    /// Resolve a library- or assets-relative path for download
    Raw {
        #[arg(value_enum)]
        kind: RawKind,
        path: String,
    },
    /// Print the effective configuration
    Config {
        /// Write it to the config file
        #[arg(long)]
        write: bool,
    },
}

/// Run the specified CLI command.
pub fn run_command(cli: &Cli) -> anyhow::Result<()> {
    let config = load_config(cli);

    match &cli.command {
        Commands::Platforms => cmd_platforms(&config),
        Commands::Roms { platform, count } => cmd_roms(&config, platform, *count),
        Commands::Rename { platform, from, to } => cmd_rename(&config, platform, from, to),
        Commands::Delete { platform, file } => cmd_delete(&config, platform, file),
        Commands::Raw { kind, path } => cmd_raw(&config, *kind, path),
        Commands::Config { write } => cmd_config(cli, &config, *write),
        Commands::Identify {
            platform,
            file,
            overwrite,
            all: false,
        } => {
            let rt = Runtime::new()?;
            cmd_identify(&rt, &config, platform, file, *overwrite)
        }
        Commands::Identify {
            platform,
            file,
            all: true,
            ..
        } => {
            let rt = Runtime::new()?;
            cmd_candidates(&rt, &config, platform, file)
        }
        Commands::Search { platform, term } => {
            let rt = Runtime::new()?;
            cmd_search(&rt, &config, platform, term)
        }
        Commands::Lookup { id } => {
            let rt = Runtime::new()?;
            cmd_lookup(&rt, &config, *id)
        }
        Commands::Scan {
            platform,
            overwrite,
        } => {
            let rt = Runtime::new()?;
            cmd_scan(&rt, &config, platform.as_deref(), *overwrite)
        }
        Commands::Defaults { overwrite } => {
            let rt = Runtime::new()?;
            cmd_defaults(&rt, &config, *overwrite)
        }
    }
}

/// Whether an error returned by [`run_command`] must abort with exit status 2.
pub fn is_fatal(error: &anyhow::Error) -> bool {
    error.chain().any(|cause| {
        cause.downcast_ref::<Error>().is_some_and(Error::is_fatal)
            || cause
                .downcast_ref::<EnrichmentError>()
                .is_some_and(EnrichmentError::is_fatal)
    })
}

/// Print the effective configuration, optionally saving it
fn cmd_config(cli: &Cli, config: &Config, write: bool) -> anyhow::Result<()> {
    let mut shown = config.clone();
    shown.credentials.client_secret = shown.credentials.client_secret.map(|_| "***".to_string());
    println!("{}", toml::to_string_pretty(&shown)?);

    if write {
        let path = match &cli.config {
            Some(path) => {
                config::save_to(config, path)?;
                path.clone()
            }
            None => config::save(config)?,
        };
        println!("✓ Saved to {}", path.display());
    }
    Ok(())
}

// ============================================================================
// Shared helper functions
// ============================================================================

fn load_config(cli: &Cli) -> Config {
    let mut config = match &cli.config {
        Some(path) => config::load_from(path),
        None => config::load(),
    }
    .with_credentials(cli.client_id.clone(), cli.client_secret.clone());

    if let Some(root) = &cli.library {
        config.library.root = root.clone();
    }
    config
}

pub(crate) fn library_store(config: &Config) -> LibraryStore {
    LibraryStore::new(&config.library.root, config.exclude.clone())
}

pub(crate) fn enrichment_service(
    config: &Config,
    http_client: &reqwest::Client,
) -> EnrichmentService<IgdbClient> {
    let client_id = config.credentials.client_id.clone().unwrap_or_default();
    let client_secret = config.credentials.client_secret.clone().unwrap_or_default();

    let issuer = TwitchTokenIssuer::new(
        http_client.clone(),
        client_id.clone(),
        client_secret,
        config.provider.token_timeout(),
    )
    .with_token_url(&config.provider.token_url);
    let tokens = TokenCache::new(Arc::new(MemoryTokenStore::new()), Arc::new(issuer));

    let client = IgdbClient::new(
        http_client.clone(),
        client_id,
        Arc::new(tokens),
        config.provider.search_timeout(),
    )
    .with_base_url(&config.provider.api_url);

    EnrichmentService::new(client, config.provider.enrichment_config())
}

pub(crate) fn cover_store(
    config: &Config,
    http_client: &reqwest::Client,
) -> CoverStore<HttpCoverDownloader> {
    CoverStore::new(
        config.library.resources_dir(),
        &config.library.public_prefix,
        HttpCoverDownloader::new(http_client.clone(), config.provider.search_timeout()),
    )
}

pub(crate) fn coordinator(config: &Config) -> IngestionCoordinator<IgdbClient, HttpCoverDownloader> {
    let http_client = reqwest::Client::new();
    IngestionCoordinator::new(
        library_store(config),
        enrichment_service(config, &http_client),
        cover_store(config, &http_client),
        config.provider.concurrency(),
    )
}
