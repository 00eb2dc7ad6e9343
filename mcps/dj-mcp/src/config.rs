//! Configuration for the DJ MCP Server

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment variable naming an explicit config file
pub const CONFIG_PATH_ENV: &str = "DJ_CONFIG_PATH";

/// Environment variable overriding the database path
pub const DATABASE_ENV: &str = "DJ_DATABASE";

/// DJ MCP configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DjConfig {
    /// Database connection settings
    #[serde(default)]
    pub database: DatabaseConfig,
}

/// Database connection configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file, relative paths resolve against the
    /// working directory.
    /// Default: `database.db`
    #[serde(default = "default_path")]
    pub path: PathBuf,
}

fn default_path() -> PathBuf {
    PathBuf::from("database.db")
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
        }
    }
}

impl DjConfig {
    /// Load configuration from file
    ///
    /// Looks for config in:
    /// 1. `DJ_CONFIG_PATH` environment variable
    /// 2. `<config dir>/dj/config.toml`
    pub fn load() -> Result<Self> {
        let config_path = if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            PathBuf::from(path)
        } else {
            dirs::config_dir()
                .context("Could not determine config directory")?
                .join("dj")
                .join("config.toml")
        };

        Self::from_file(&config_path)
    }

    /// Parse a config file at an explicit path
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {:?}", path))?;

        toml::from_str(&content).with_context(|| format!("Failed to parse config from {:?}", path))
    }

    /// Resolve the startup configuration: config file if present, defaults
    /// otherwise, then the `DJ_DATABASE` override.
    pub fn resolve() -> Self {
        let mut config = Self::load().unwrap_or_else(|e| {
            tracing::warn!("Failed to load config: {:#}. Using default.", e);
            Self::default()
        });

        if let Ok(path) = std::env::var(DATABASE_ENV) {
            config.database.path = PathBuf::from(path);
        }

        config
    }

    /// Create a config pointing to a specific database
    pub fn with_database(path: impl Into<PathBuf>) -> Self {
        Self {
            database: DatabaseConfig { path: path.into() },
        }
    }
}
