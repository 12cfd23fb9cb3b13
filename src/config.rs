//! Governance configuration file handling
//!
//! Provides default configuration generation and loading. Configuration files
//! are TOML and every field has a default, so an empty file is a valid config.
//!
//! ## Rules vs Operator Settings
//!
//! `[rules]` holds the consensus parameters (proposal duration, vote window,
//! bookkeeper population, approval percentage, text bounds). Every node in a
//! network must run the same rules or they will disagree about which votes
//! trigger issuance. `[logging]` is local to the operator.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default log level
const DEFAULT_LOG_LEVEL: &str = "info";

/// Blocks per day at a 15 second block interval.
pub const BLOCKS_PER_DAY: u64 = 5760;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write config file '{path}': {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{path}': {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid rule {rule}: {reason}")]
    InvalidRule { rule: &'static str, reason: String },
}

/// Full configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GovernanceConfig {
    #[serde(default)]
    pub rules: GovernanceRules,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Consensus rules for proposals and votes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GovernanceRules {
    /// `end_height` must be at least this many blocks above the current height.
    pub min_duration_blocks: u64,

    /// Votes are refused once the proposal is older than this many blocks.
    pub vote_window_blocks: u64,

    /// Fixed bookkeeper population the approval threshold is computed from.
    pub bookkeeper_population: u64,

    /// Approval percentage of the population (integer, 1..=100).
    pub approval_percent: u64,

    pub title_min_chars: usize,
    pub title_max_chars: usize,
    /// Counted in UTF-16 code units.
    pub description_max_chars: usize,
}

impl Default for GovernanceRules {
    fn default() -> Self {
        Self {
            min_duration_blocks: BLOCKS_PER_DAY,
            vote_window_blocks: BLOCKS_PER_DAY * 30,
            bookkeeper_population: 101,
            approval_percent: 51,
            title_min_chars: 10,
            title_max_chars: 100,
            description_max_chars: 4096,
        }
    }
}

impl GovernanceRules {
    /// `ceil(population * percent / 100)`, computed without floating point.
    ///
    /// A proposal is approved when its valid vote count is strictly greater
    /// than this value (52 with the defaults).
    pub fn approval_threshold(&self) -> u64 {
        (self.bookkeeper_population * self.approval_percent).div_ceil(100)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bookkeeper_population == 0 {
            return Err(ConfigError::InvalidRule {
                rule: "bookkeeper_population",
                reason: "must be at least 1".to_string(),
            });
        }
        if !(1..=100).contains(&self.approval_percent) {
            return Err(ConfigError::InvalidRule {
                rule: "approval_percent",
                reason: format!("must be within 1..=100, got {}", self.approval_percent),
            });
        }
        if self.title_min_chars > self.title_max_chars {
            return Err(ConfigError::InvalidRule {
                rule: "title_min_chars",
                reason: format!(
                    "{} exceeds title_max_chars {}",
                    self.title_min_chars, self.title_max_chars
                ),
            });
        }
        if self.vote_window_blocks == 0 {
            return Err(ConfigError::InvalidRule {
                rule: "vote_window_blocks",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format: pretty, compact or json
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Log file path (optional, logs to stderr if not specified)
    pub file: Option<PathBuf>,
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            format: default_log_format(),
            file: None,
        }
    }
}

impl GovernanceConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let config: GovernanceConfig =
            toml::from_str(&contents).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        config.rules.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(self)?;
        write_file(path, &contents)
    }

    /// Generate default configuration content as a string with comments
    pub fn generate_default_toml() -> String {
        let rules = GovernanceRules::default();
        format!(
            r#"# Asset Governance Configuration
#
# [rules] are consensus parameters. Every node in the network must use the
# same values or nodes will disagree on when an issuance proposal activates.

[rules]
# end_height must be at least this many blocks above the proposing block
min_duration_blocks = {min_duration}

# votes are refused once the proposal is older than this many blocks
vote_window_blocks = {vote_window}

# approval needs strictly more than ceil(population * percent / 100) votes
# from currently authorized bookkeepers
bookkeeper_population = {population}
approval_percent = {percent}

title_min_chars = {title_min}
title_max_chars = {title_max}
# counted in UTF-16 code units
description_max_chars = {description_max}

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Output format: pretty, compact, json
format = "pretty"

# Log file path (optional, logs to stderr if not specified)
# file = "/var/log/asset-governance/governance.log"
"#,
            min_duration = rules.min_duration_blocks,
            vote_window = rules.vote_window_blocks,
            population = rules.bookkeeper_population,
            percent = rules.approval_percent,
            title_min = rules.title_min_chars,
            title_max = rules.title_max_chars,
            description_max = rules.description_max_chars,
        )
    }

    /// Create and save a default configuration file
    pub fn create_default(config_path: &Path) -> Result<(), ConfigError> {
        write_file(config_path, &Self::generate_default_toml())
    }
}

fn write_file(path: &Path, contents: &str) -> Result<(), ConfigError> {
    let to_write_error = |source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    };

    // Create parent directory if needed
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(to_write_error)?;
    }

    fs::write(path, contents).map_err(to_write_error)
}

/// Default config file location (`<config dir>/asset-governance/config.toml`).
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("asset-governance")
        .join("config.toml")
}
