use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure
///
/// Every field has a default, so the utility runs without a config file;
/// a `config.toml` (or the file named by `MIR2GRAPH_CONFIG`) overrides
/// individual values.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub source: SourceConfig,
}

/// Local storage configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Path of the SQLite database file
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,
    /// Directory the downloaded feed is cached under
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            data_dir: default_data_dir(),
        }
    }
}

/// Upstream feed configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    /// URL of the miR2Disease TSV feed
    #[serde(default = "default_source_url")]
    pub url: String,
    /// If false, the feed is read straight from the URL and never cached
    #[serde(default = "default_cache")]
    pub cache: bool,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: default_source_url(),
            cache: default_cache(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("mir2disease.db")
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_source_url() -> String {
    crate::source::DATA_URL.to_string()
}

fn default_cache() -> bool {
    true
}

impl Config {
    /// Load configuration
    ///
    /// Loads environment variables from .env file (if present) first.
    /// Looks for a config file in this order:
    /// 1. Path specified in MIR2GRAPH_CONFIG environment variable
    /// 2. ./config.toml in current directory
    ///
    /// Missing file means defaults for everything.
    pub fn load() -> Result<Self> {
        // Load .env file if it exists (ignore errors - file is optional)
        let _ = dotenv::dotenv();

        let config_path = std::env::var("MIR2GRAPH_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config.toml"));

        let config = if config_path.exists() {
            let config_str = std::fs::read_to_string(&config_path)
                .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;
            toml::from_str(&config_str)
                .with_context(|| format!("Failed to parse {}", config_path.display()))?
        } else {
            log::debug!(
                "no config file at {}, using defaults",
                config_path.display()
            );
            Config::default()
        };

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    fn validate(&self) -> Result<()> {
        url::Url::parse(&self.source.url)
            .with_context(|| format!("source.url is not a valid URL: {}", self.source.url))?;

        if self.storage.db_path.as_os_str().is_empty() {
            anyhow::bail!("storage.db_path must not be empty");
        }

        Ok(())
    }

    /// Get database path
    pub fn db_path(&self) -> &Path {
        &self.storage.db_path
    }

    /// Get the directory the feed file is cached under
    pub fn data_dir(&self) -> &Path {
        &self.storage.data_dir
    }
}
