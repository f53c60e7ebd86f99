use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct HearthConfig {
    pub log_level: String,
    pub storage: StorageConfig,
    pub embedding: EmbeddingConfig,
    pub retrieval: RetrievalConfig,
    pub provider: ProviderConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
    pub db_path: String,
    pub default_user: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub provider: String,
}

/// Search tuning knobs. The thresholds are carried over from the original
/// engine unchanged; they are configuration rather than constants so callers
/// can re-tune them without a rebuild.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Maximum results returned when the caller does not pass a limit.
    pub default_limit: usize,
    /// Minimum relevance a candidate needs on either search path.
    pub relevance_floor: f64,
    /// Weight applied to partial (substring) token matches in keyword scoring.
    pub partial_match_weight: f64,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct ProviderConfig {
    /// API key for the generation provider. Usually supplied via
    /// `HEARTH_API_KEY` rather than the config file.
    pub api_key: String,
}

impl Default for HearthConfig {
    fn default() -> Self {
        Self {
            log_level: "info".into(),
            storage: StorageConfig::default(),
            embedding: EmbeddingConfig::default(),
            retrieval: RetrievalConfig::default(),
            provider: ProviderConfig::default(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        let db_path = default_hearth_dir()
            .join("memory.db")
            .to_string_lossy()
            .into_owned();
        Self {
            db_path,
            default_user: "default_user".into(),
        }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: "hashed".into(),
        }
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            default_limit: 5,
            relevance_floor: 0.2,
            partial_match_weight: 0.5,
        }
    }
}

/// Returns `~/.hearth/`
pub fn default_hearth_dir() -> PathBuf {
    dirs::home_dir()
        .expect("home directory must exist")
        .join(".hearth")
}

/// Returns the default config file path: `~/.hearth/config.toml`
pub fn default_config_path() -> PathBuf {
    default_hearth_dir().join("config.toml")
}

impl HearthConfig {
    /// Load config from TOML file (if it exists) then apply env var overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(default_config_path())
    }

    /// Load from a specific path, then apply env var overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let contents =
                std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str(&contents).context("failed to parse config TOML")?
        } else {
            info!("no config file at {}, using defaults", path.display());
            HearthConfig::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides (HEARTH_DB, HEARTH_API_KEY,
    /// HEARTH_LOG_LEVEL).
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("HEARTH_DB") {
            self.storage.db_path = val;
        }
        if let Ok(val) = std::env::var("HEARTH_API_KEY") {
            self.provider.api_key = val;
        }
        if let Ok(val) = std::env::var("HEARTH_LOG_LEVEL") {
            self.log_level = val;
        }
    }

    /// Resolve the database path, expanding `~` if needed.
    pub fn resolved_db_path(&self) -> PathBuf {
        expand_tilde(&self.storage.db_path)
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        dirs::home_dir()
            .expect("home directory must exist")
            .join(rest)
    } else {
        PathBuf::from(path)
    }
}
