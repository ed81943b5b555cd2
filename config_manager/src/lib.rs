use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error("Configuration loading error: {0}")]
    ConfigLoad(#[from] ConfigError),
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

pub type Result<T> = std::result::Result<T, ConfigurationError>;

/// Bubblegum program ids observed on mainnet. Default allow-list for the
/// compressed-NFT spam heuristic; override via config file or environment
/// when new variants appear, no rebuild needed.
const DEFAULT_BUBBLEGUM_PROGRAM_IDS: &[&str] = &[
    "BGUMApV3npVqfY3VhXv9Gqz3r3Gq5h5xQmYkYw2nVBoz",
    "BGUMAp7x2hAqHcC1EHnHCqB6fN5teLo75fW4rWuBbY",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExporterConfig {
    /// Helius enriched-transaction API settings
    pub helius: HeliusConfig,

    /// Export run settings
    pub export: ExportConfig,

    /// Spam heuristic settings
    pub spam: SpamConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeliusConfig {
    /// Helius API key; also picked up from HELIUS_API_KEY
    pub api_key: String,

    /// Helius API base URL
    pub api_base_url: String,

    /// Request timeout in seconds
    pub request_timeout_seconds: u64,

    /// Total attempts per page request, including the first
    pub max_retries: u32,

    /// Backoff base delay in milliseconds
    pub retry_base_delay_ms: u64,

    /// Backoff growth factor per attempt
    pub retry_growth: f64,

    /// Backoff cap per attempt in milliseconds
    pub retry_max_delay_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Default maximum transactions fetched per wallet
    pub default_limit: usize,

    /// How many wallets are fetched concurrently
    pub max_concurrent_wallets: usize,

    /// Default wallet list path (JSON array of base58 strings)
    pub wallets_path: String,

    /// Default CSV output path
    pub output_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpamConfig {
    /// Program ids counted as the Bubblegum cNFT family
    pub bubblegum_program_ids: Vec<String>,
}

impl SpamConfig {
    pub fn program_id_set(&self) -> HashSet<String> {
        self.bubblegum_program_ids.iter().cloned().collect()
    }
}

impl Default for ExporterConfig {
    fn default() -> Self {
        Self {
            helius: HeliusConfig {
                api_key: "".to_string(), // Must be set via flag, env or config file
                api_base_url: "https://api.helius.xyz/v0".to_string(),
                request_timeout_seconds: 30,
                max_retries: 5,
                retry_base_delay_ms: 800,
                retry_growth: 2.0,
                retry_max_delay_ms: 10_000,
            },
            export: ExportConfig {
                default_limit: 1000,
                max_concurrent_wallets: 4,
                wallets_path: "wallets.json".to_string(),
                output_path: "output.csv".to_string(),
            },
            spam: SpamConfig {
                bubblegum_program_ids: DEFAULT_BUBBLEGUM_PROGRAM_IDS
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
            },
        }
    }
}

impl HeliusConfig {
    /// Validate Helius configuration
    pub fn validate(&self) -> Result<()> {
        if self.api_key.is_empty() {
            return Err(ConfigurationError::InvalidValue(
                "Helius API key is required (--api-key, HELIUS_API_KEY, or config file)"
                    .to_string(),
            ));
        }

        if self.request_timeout_seconds == 0 {
            return Err(ConfigurationError::InvalidValue(
                "Request timeout must be greater than 0".to_string(),
            ));
        }

        if self.max_retries == 0 {
            return Err(ConfigurationError::InvalidValue(
                "max_retries must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

impl ExportConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_concurrent_wallets == 0 {
            return Err(ConfigurationError::InvalidValue(
                "max_concurrent_wallets must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

impl ExporterConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path("config.toml")
    }

    /// Load configuration from a specific file path
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        let mut config_builder = Config::builder()
            // Start with defaults
            .add_source(Config::try_from(&ExporterConfig::default())?);

        // Add config file if it exists
        if config_path.as_ref().exists() {
            info!(
                "Loading configuration from: {}",
                config_path.as_ref().display()
            );
            config_builder = config_builder.add_source(File::from(config_path.as_ref()));
        } else {
            debug!("Config file not found, using defaults and environment variables");
        }

        // Add environment variables with prefix, e.g. HELIUS__EXPORT__DEFAULT_LIMIT
        config_builder = config_builder.add_source(
            Environment::with_prefix("HELIUS")
                .try_parsing(true)
                .separator("__")
                .list_separator(","),
        );

        let config = config_builder.build()?;
        let mut exporter_config: ExporterConfig = config.try_deserialize()?;

        // The key the original script honored; keep it as a direct fallback
        if exporter_config.helius.api_key.is_empty() {
            if let Ok(key) = std::env::var("HELIUS_API_KEY") {
                debug!("Using API key from HELIUS_API_KEY");
                exporter_config.helius.api_key = key;
            }
        }

        Ok(exporter_config)
    }
}
