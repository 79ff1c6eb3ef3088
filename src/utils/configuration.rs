//! Configuration management for the overlap analysis pipeline
//!
//! Layered loading: built-in defaults, then an optional TOML file, then
//! `OVERLAP__`-prefixed environment variables. Everything the components
//! need (shard layout, delimiter, worker counts, wait budget) arrives
//! through here instead of process-wide constants, so tests can point the
//! pipeline at small synthetic fixtures.

use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::core::overlap::ShardLayout;

/// Top-level configuration for a pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PipelineConfiguration {
    /// General run settings
    pub general: GeneralConfig,
    /// Sharded corpus location and naming
    pub shards: ShardIoConfig,
    /// Containment filter settings
    pub filter: FilterConfig,
    /// Worker pool settings
    pub performance: PerformanceConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Run name used in report artifacts
    pub run_name: String,
    /// Directory for result artifacts
    pub output_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShardIoConfig {
    /// Directory holding the input shards
    pub dir: PathBuf,
    /// Common filename prefix, e.g. "chunk" for chunk0000..chunkNNNN
    pub prefix: String,
    /// Number of shards
    pub num_shards: usize,
    /// Field delimiter within a record
    pub delimiter: char,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Run the containment pre-filter before graph construction
    pub enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceConfig {
    /// Worker threads in the shard task pool
    pub worker_threads: usize,
    /// Ceiling on the pool-wide completion wait, in seconds
    pub wait_budget_secs: u64,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            run_name: "overlap-analysis".to_string(),
            output_dir: PathBuf::from("results"),
        }
    }
}

impl Default for ShardIoConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("splits"),
            prefix: "chunk".to_string(),
            num_shards: 0,
            delimiter: '\t',
        }
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            worker_threads: 8,
            wait_budget_secs: 60,
        }
    }
}

/// Configuration-level failures, distinct from runtime I/O errors.
#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error("configuration error: {message}")]
    Load { message: String },

    #[error("validation error: {field} is invalid: {reason}")]
    Validation { field: String, reason: String },
}

impl From<ConfigError> for ConfigurationError {
    fn from(err: ConfigError) -> Self {
        ConfigurationError::Load {
            message: err.to_string(),
        }
    }
}

impl PipelineConfiguration {
    /// Load from defaults, an optional TOML file, and `OVERLAP__*`
    /// environment overrides (e.g. `OVERLAP__SHARDS__NUM_SHARDS=641`).
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigurationError> {
        let mut builder = Config::builder();

        match config_path {
            Some(path) => {
                builder = builder.add_source(File::from(path.to_path_buf()));
            }
            None => {
                builder = builder.add_source(File::with_name("overlap-forge").required(false));
            }
        }
        builder = builder.add_source(Environment::with_prefix("OVERLAP").separator("__"));

        let config: PipelineConfiguration = match builder.build()?.try_deserialize() {
            Ok(config) => config,
            Err(e) => {
                warn!("failed to deserialize configuration: {e}, using built-in defaults");
                PipelineConfiguration::default()
            }
        };

        config.validate()?;
        info!(
            shards = config.shards.num_shards,
            workers = config.performance.worker_threads,
            "configuration loaded"
        );
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.shards.prefix.is_empty() {
            return Err(ConfigurationError::Validation {
                field: "shards.prefix".to_string(),
                reason: "must not be empty".to_string(),
            });
        }
        if self.performance.worker_threads == 0 {
            return Err(ConfigurationError::Validation {
                field: "performance.worker_threads".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        if self.performance.wait_budget_secs == 0 {
            return Err(ConfigurationError::Validation {
                field: "performance.wait_budget_secs".to_string(),
                reason: "must be at least 1 second".to_string(),
            });
        }
        Ok(())
    }

    /// Shard layout view of the I/O section.
    pub fn shard_layout(&self) -> ShardLayout {
        ShardLayout::new(
            &self.shards.dir,
            &self.shards.prefix,
            self.shards.num_shards,
        )
    }

    pub fn wait_budget(&self) -> Duration {
        Duration::from_secs(self.performance.wait_budget_secs)
    }
}
