//! Configuration system using TOML files.
//!
//! Config is stored in the OS-standard config directory:
//! - Windows: %APPDATA%\rom-minder\config.toml
//! - macOS: ~/Library/Application Support/rom-minder/config.toml
//! - Linux: ~/.config/rom-minder/config.toml
//!
//! The config file is human-readable and editable. Provider credentials can
//! also come from the `IGDB_CLIENT_ID` / `IGDB_CLIENT_SECRET` environment
//! variables, which take precedence over the file.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::enrichment::igdb::IGDB_API_URL;
use crate::enrichment::service::{DEFAULT_SCREENSHOT_LIMIT, MAIN_GAME_CATEGORY, REMAKE_CATEGORY};
use crate::enrichment::token::TWITCH_TOKEN_URL;
use crate::enrichment::EnrichmentConfig;
use crate::library::Exclusions;

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// API credentials (keep separate for potential future encryption)
    pub credentials: Credentials,

    /// Library locations
    pub library: LibraryConfig,

    /// Folders and file extensions hidden from listings
    pub exclude: Exclusions,

    /// Metadata provider settings
    pub provider: ProviderConfig,

    /// Placeholder cover sources
    pub covers: CoversConfig,
}

/// Provider credentials
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Credentials {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
}

/// Library locations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LibraryConfig {
    /// Library base path (platform folders, `resources/`)
    pub root: PathBuf,

    /// Assets base path (saves, states, screenshots)
    pub assets: PathBuf,

    /// Prefix under which cached covers are served
    pub public_prefix: String,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("library"),
            assets: PathBuf::from("assets"),
            public_prefix: "/assets/library/resources".to_string(),
        }
    }
}

impl LibraryConfig {
    /// Directory cached covers are written to
    pub fn resources_dir(&self) -> PathBuf {
        self.root.join("resources")
    }
}

/// Metadata provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub api_url: String,
    pub token_url: String,

    /// Per-request timeout for searches, lookups and cover downloads
    pub search_timeout_secs: u64,

    /// Timeout for token issuance
    pub token_timeout_secs: u64,

    /// Category filters tried in order before the unrestricted search
    pub search_categories: Vec<u32>,

    pub screenshot_limit: usize,

    /// Concurrent ROM identifications during a platform scan
    pub concurrency: usize,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_url: IGDB_API_URL.to_string(),
            token_url: TWITCH_TOKEN_URL.to_string(),
            search_timeout_secs: 120,
            token_timeout_secs: 30,
            search_categories: vec![MAIN_GAME_CATEGORY, REMAKE_CATEGORY],
            screenshot_limit: DEFAULT_SCREENSHOT_LIMIT,
            concurrency: 4,
        }
    }
}

impl ProviderConfig {
    pub fn search_timeout(&self) -> Duration {
        Duration::from_secs(self.search_timeout_secs)
    }

    pub fn token_timeout(&self) -> Duration {
        Duration::from_secs(self.token_timeout_secs)
    }

    /// Scan concurrency, never below one
    pub fn concurrency(&self) -> usize {
        self.concurrency.max(1)
    }

    pub fn enrichment_config(&self) -> EnrichmentConfig {
        EnrichmentConfig {
            search_categories: self.search_categories.clone(),
            screenshot_limit: self.screenshot_limit,
        }
    }
}

/// Placeholder cover sources
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CoversConfig {
    pub default_small_url: String,
    pub default_large_url: String,
}

impl Default for CoversConfig {
    fn default() -> Self {
        Self {
            default_small_url: "https://images.igdb.com/igdb/image/upload/t_cover_small/nocover.png"
                .to_string(),
            default_large_url: "https://images.igdb.com/igdb/image/upload/t_cover_big/nocover.png"
                .to_string(),
        }
    }
}

impl Config {
    /// Override credentials with values given on the command line or environment.
    pub fn with_credentials(mut self, client_id: Option<String>, client_secret: Option<String>) -> Self {
        if client_id.is_some() {
            self.credentials.client_id = client_id;
        }
        if client_secret.is_some() {
            self.credentials.client_secret = client_secret;
        }
        self
    }
}

// ============================================================================
// Config File Operations
// ============================================================================

/// Get the config directory path
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("rom-minder"))
}

/// Get the full path to the config file
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("config.toml"))
}

/// Load configuration from the default location
///
/// Returns default config if file doesn't exist or can't be parsed.
/// Logs warnings but doesn't fail - we always return a usable config.
pub fn load() -> Config {
    let Some(path) = config_path() else {
        tracing::warn!("Could not determine config directory, using defaults");
        return Config::default();
    };
    load_from(&path)
}

/// Load configuration from an explicit path, falling back to defaults
pub fn load_from(path: &Path) -> Config {
    if !path.exists() {
        tracing::info!("No config file found at {:?}, using defaults", path);
        return Config::default();
    }

    match std::fs::read_to_string(path) {
        Ok(contents) => match toml::from_str(&contents) {
            Ok(config) => {
                tracing::info!("Loaded config from {:?}", path);
                config
            }
            Err(e) => {
                tracing::error!("Failed to parse config file {:?}: {}", path, e);
                tracing::warn!("Using default configuration");
                Config::default()
            }
        },
        Err(e) => {
            tracing::error!("Failed to read config file {:?}: {}", path, e);
            Config::default()
        }
    }
}

/// Save configuration to the default location
pub fn save(config: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path().ok_or(ConfigError::NoConfigDir)?;
    save_to(config, &path)?;
    Ok(path)
}

/// Save configuration to `path`
///
/// Creates the parent directory if it doesn't exist.
pub fn save_to(config: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).map_err(|e| ConfigError::CreateDir(dir.to_path_buf(), e))?;
    }

    let contents = toml::to_string_pretty(config).map_err(ConfigError::Serialize)?;

    // Write atomically (write to temp, then rename)
    let temp_path = path.with_extension("toml.tmp");
    std::fs::write(&temp_path, &contents).map_err(|e| ConfigError::Write(temp_path.clone(), e))?;
    std::fs::rename(&temp_path, path)
        .map_err(|e| ConfigError::Rename(temp_path, path.to_path_buf(), e))?;

    tracing::info!("Saved config to {:?}", path);
    Ok(())
}

// ============================================================================
// Error Types
// ============================================================================

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to create config directory {0}: {1}")]
    CreateDir(PathBuf, std::io::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(toml::ser::Error),

    #[error("Failed to write config to {0}: {1}")]
    Write(PathBuf, std::io::Error),

    #[error("Failed to rename temp file {0} to {1}: {2}")]
    Rename(PathBuf, PathBuf, std::io::Error),
}

impl From<ConfigError> for crate::error::Error {
    fn from(e: ConfigError) -> Self {
        crate::error::Error::config(e.to_string())
    }
}

// ============================================================================
// Tests
// ============================================================================
