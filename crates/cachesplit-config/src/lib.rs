//! Configuration system for cache split search.
//!
//! Load sweep configuration from TOML or YAML files to control the sequence
//! length, the split counts tried, parallelism, and the ratio-tracker study
//! without code changes.
//!
//! # Examples
//!
//! Load configuration from TOML string:
//!
//! ```
//! use cachesplit_config::{SweepConfig, ThreadCountConfig};
//!
//! let config = SweepConfig::from_toml_str(r#"
//!     sequence_length = 60
//!     max_splits = 4
//!     thread_count = { count = 2 }
//!
//!     [tracker]
//!     pi_values = [0.5, 0.72]
//!     iterations = 40
//! "#).unwrap();
//!
//! assert_eq!(config.sequence_length, 60);
//! assert_eq!(config.thread_count, ThreadCountConfig::Count(2));
//! assert_eq!(config.tracker.unwrap().pi_values.len(), 2);
//! ```
//!
//! Use default config when file is missing:
//!
//! ```
//! use cachesplit_config::SweepConfig;
//!
//! let config = SweepConfig::load("sweep.toml").unwrap_or_default();
//! assert!(config.validate().is_ok());
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default number of token positions.
pub const DEFAULT_SEQUENCE_LENGTH: usize = 100;

/// Default largest split count tried by the sweep.
pub const DEFAULT_MAX_SPLITS: usize = 7;

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Main sweep configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct SweepConfig {
    /// Number of token positions in the stream.
    #[serde(default = "default_sequence_length")]
    pub sequence_length: usize,

    /// Split counts `1..=max_splits` are tried.
    #[serde(default = "default_max_splits")]
    pub max_splits: usize,

    /// Number of search workers.
    #[serde(default)]
    pub thread_count: ThreadCountConfig,

    /// Pruning bound used by the search.
    #[serde(default)]
    pub bounder: BounderType,

    /// Ratio-tracker policy study, run alongside the sweep when present.
    #[serde(default)]
    pub tracker: Option<TrackerConfig>,
}

fn default_sequence_length() -> usize {
    DEFAULT_SEQUENCE_LENGTH
}

fn default_max_splits() -> usize {
    DEFAULT_MAX_SPLITS
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            sequence_length: DEFAULT_SEQUENCE_LENGTH,
            max_splits: DEFAULT_MAX_SPLITS,
            thread_count: ThreadCountConfig::default(),
            bounder: BounderType::default(),
            tracker: None,
        }
    }
}

impl SweepConfig {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns error if file doesn't exist, contains invalid TOML or fails
    /// validation.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let config = Self::from_toml_file(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Loads configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    /// Parses configuration from a YAML string.
    pub fn from_yaml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(s)?)
    }

    /// Sets the sequence length.
    pub fn with_sequence_length(mut self, sequence_length: usize) -> Self {
        self.sequence_length = sequence_length;
        self
    }

    /// Sets the largest split count tried.
    pub fn with_max_splits(mut self, max_splits: usize) -> Self {
        self.max_splits = max_splits;
        self
    }

    /// Sets the worker count.
    pub fn with_thread_count(mut self, thread_count: ThreadCountConfig) -> Self {
        self.thread_count = thread_count;
        self
    }

    /// Sets the pruning bound.
    pub fn with_bounder(mut self, bounder: BounderType) -> Self {
        self.bounder = bounder;
        self
    }

    /// Enables the ratio-tracker study.
    pub fn with_tracker(mut self, tracker: TrackerConfig) -> Self {
        self.tracker = Some(tracker);
        self
    }

    /// Checks value ranges that serde cannot express.
    ///
    /// Split counts above the sequence length are allowed; the sweep reports
    /// them as infeasible.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sequence_length == 0 {
            return Err(ConfigError::Invalid(
                "sequence_length must be positive".to_string(),
            ));
        }
        if self.max_splits == 0 {
            return Err(ConfigError::Invalid(
                "max_splits must be at least 1".to_string(),
            ));
        }
        if self.thread_count == ThreadCountConfig::Count(0) {
            return Err(ConfigError::Invalid(
                "thread_count must be at least 1".to_string(),
            ));
        }
        if let Some(tracker) = &self.tracker {
            tracker.validate()?;
        }
        Ok(())
    }
}

/// Search worker count configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ThreadCountConfig {
    /// One worker per available core.
    #[default]
    Auto,

    /// Run on the calling thread only.
    None,

    /// Specific number of workers.
    Count(usize),
}

/// Pruning bound selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BounderType {
    /// Structural remaining-cost estimate.
    #[default]
    Structural,

    /// No bound; every branch is explored.
    None,
}

impl std::fmt::Display for BounderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BounderType::Structural => write!(f, "Structural"),
            BounderType::None => write!(f, "None"),
        }
    }
}

/// Ratio-tracker study configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct TrackerConfig {
    /// Thresholds to compare.
    #[serde(default = "default_pi_values")]
    pub pi_values: Vec<f64>,

    /// Turns per workload.
    #[serde(default = "default_iterations")]
    pub iterations: usize,

    /// Workload seed; a fresh seed per run when absent.
    #[serde(default)]
    pub seed: Option<u64>,

    /// Smallest turn length in tokens.
    #[serde(default = "default_min_tokens")]
    pub min_tokens: u64,

    /// Largest turn length in tokens.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u64,
}

fn default_pi_values() -> Vec<f64> {
    vec![0.5, 0.72, 1.5, 2.0, 0.5]
}

fn default_iterations() -> usize {
    80
}

fn default_min_tokens() -> u64 {
    100
}

fn default_max_tokens() -> u64 {
    500
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            pi_values: default_pi_values(),
            iterations: default_iterations(),
            seed: None,
            min_tokens: default_min_tokens(),
            max_tokens: default_max_tokens(),
        }
    }
}

impl TrackerConfig {
    /// Sets the workload seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.min_tokens == 0 || self.min_tokens > self.max_tokens {
            return Err(ConfigError::Invalid(format!(
                "tracker token range {}..={} is empty",
                self.min_tokens, self.max_tokens
            )));
        }
        if self.pi_values.iter().any(|pi| !pi.is_finite() || *pi < 0.0) {
            return Err(ConfigError::Invalid(
                "tracker pi values must be finite and non-negative".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests;
