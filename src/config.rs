//! Session configuration module
//!
//! Handles loading and parsing of session configuration from files and environment variables.

use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::net::session::MAX_CHUNK_RADIUS;

/// Default location of the configuration file
pub const DEFAULT_CONFIG_PATH: &str = "config/session.toml";

/// Session layer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Path to the configuration file
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Chunk radius of new sessions, in chunks
    #[serde(default = "default_chunk_radius")]
    pub chunk_radius: u32,

    /// Upper bound for chunk radii requested by clients
    #[serde(default = "default_max_chunk_radius")]
    pub max_chunk_radius: u32,

    /// Capacity of each connection's outbound frame queue
    #[serde(default = "default_outbound_queue_size")]
    pub outbound_queue_size: usize,

    /// Emit logs as JSON
    #[serde(default)]
    pub log_json: bool,

    /// Enable debug logging
    #[serde(default)]
    pub debug: bool,
}

fn default_chunk_radius() -> u32 {
    8
}

fn default_max_chunk_radius() -> u32 {
    MAX_CHUNK_RADIUS
}

fn default_outbound_queue_size() -> usize {
    1024
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
            chunk_radius: default_chunk_radius(),
            max_chunk_radius: default_max_chunk_radius(),
            outbound_queue_size: default_outbound_queue_size(),
            log_json: false,
            debug: false,
        }
    }
}

impl SessionConfig {
    /// Load configuration from file and environment variables
    pub async fn load() -> Result<Self> {
        let config_path = env::var("BEDROCK_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));

        let mut config = if config_path.exists() {
            Self::read_file(&config_path).await?
        } else {
            tracing::warn!(
                "Config file not found at {}, using defaults",
                config_path.display()
            );
            Self::default()
        };

        config.config_path = config_path;
        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Load configuration from a specific file, without environment overrides
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = Self::read_file(path).await?;
        config.config_path = path.to_path_buf();
        config.validate()?;
        Ok(config)
    }

    async fn read_file(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = env::var("BEDROCK_CHUNK_RADIUS") {
            if let Ok(radius) = val.parse() {
                self.chunk_radius = radius;
            }
        }
        if let Ok(val) = env::var("BEDROCK_MAX_CHUNK_RADIUS") {
            if let Ok(radius) = val.parse() {
                self.max_chunk_radius = radius;
            }
        }
        if let Ok(val) = env::var("BEDROCK_OUTBOUND_QUEUE_SIZE") {
            if let Ok(size) = val.parse() {
                self.outbound_queue_size = size;
            }
        }
        if let Ok(val) = env::var("BEDROCK_LOG_JSON") {
            self.log_json = val == "1" || val.eq_ignore_ascii_case("true");
        }
        if let Ok(val) = env::var("BEDROCK_DEBUG") {
            self.debug = val == "1" || val.eq_ignore_ascii_case("true");
        }
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        if self.max_chunk_radius == 0 || self.max_chunk_radius > MAX_CHUNK_RADIUS {
            anyhow::bail!("Max chunk radius must be between 1 and {}", MAX_CHUNK_RADIUS);
        }

        if self.chunk_radius == 0 || self.chunk_radius > self.max_chunk_radius {
            anyhow::bail!(
                "Chunk radius must be between 1 and {}",
                self.max_chunk_radius
            );
        }

        if self.outbound_queue_size == 0 {
            anyhow::bail!("Outbound queue size must be at least 1");
        }

        Ok(())
    }

    /// Clamp a client-requested chunk radius to the configured bounds
    pub fn clamp_chunk_radius(&self, requested: i32) -> u32 {
        let max = self.max_chunk_radius.clamp(1, MAX_CHUNK_RADIUS) as i32;
        requested.clamp(1, max) as u32
    }
}
