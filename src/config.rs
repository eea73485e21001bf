//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.gradecalc.toml` files.

use crate::grading::{ScoringPolicy, DEFAULT_LATE_PENALTY};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Name of the configuration file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = ".gradecalc.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Scoring settings.
    #[serde(default)]
    pub scoring: ScoringConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// General application settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Default output file path. Empty means stdout.
    #[serde(default)]
    pub output: String,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

/// Scoring settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Percentage points deducted from late submissions.
    #[serde(default = "default_late_penalty")]
    pub late_penalty: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            late_penalty: default_late_penalty(),
        }
    }
}

fn default_late_penalty() -> f64 {
    DEFAULT_LATE_PENALTY
}

impl From<&ScoringConfig> for ScoringPolicy {
    fn from(config: &ScoringConfig) -> Self {
        Self {
            late_penalty: config.late_penalty,
        }
    }
}

/// Report generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Decimal places for percentages in Markdown reports.
    #[serde(default = "default_precision")]
    pub precision: usize,

    /// List skipped submissions in Markdown reports.
    #[serde(default = "default_true")]
    pub include_skipped: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            precision: default_precision(),
            include_skipped: true,
        }
    }
}

fn default_precision() -> usize {
    2
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config.validate().with_context(|| {
            format!("Invalid configuration in {}", path.display())
        })?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(CONFIG_FILE_NAME);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Check values that parse but make no sense.
    pub fn validate(&self) -> Result<()> {
        if !self.scoring.late_penalty.is_finite() || self.scoring.late_penalty < 0.0 {
            anyhow::bail!(
                "late_penalty must be a non-negative number, got {}",
                self.scoring.late_penalty
            );
        }
        if self.report.precision > 10 {
            anyhow::bail!("precision must be at most 10, got {}", self.report.precision);
        }
        Ok(())
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// This method only overrides config when CLI provides explicit values.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(penalty) = args.late_penalty {
            self.scoring.late_penalty = penalty;
        }

        if let Some(precision) = args.precision {
            self.report.precision = precision;
        }

        if let Some(ref output) = args.output {
            self.general.output = output.display().to_string();
        }

        if args.no_skipped {
            self.report.include_skipped = false;
        }

        // Flags always override
        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Scoring policy described by this configuration.
    pub fn scoring_policy(&self) -> ScoringPolicy {
        ScoringPolicy::from(&self.scoring)
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
