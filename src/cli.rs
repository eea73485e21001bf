//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::timestamp::parse_timestamp;
use chrono::{DateTime, Utc};
use clap::Parser;
use std::path::PathBuf;

/// GradeCalc - per-learner assignment percentages and course averages
///
/// Reads a course, its assignment groups and learner submissions, and
/// reports each learner's percentage per assignment and overall average.
/// Assignments not yet due are ignored; late work loses a flat penalty.
///
/// Examples:
///   gradecalc --input course.json
///   gradecalc --input course.json --now 2024-01-01 --format markdown
///   gradecalc --sample --format records
///   gradecalc --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// JSON file with the course, assignment groups and submissions
    #[arg(
        short,
        long,
        value_name = "FILE",
        required_unless_present_any = ["sample", "init_config"],
        conflicts_with = "sample"
    )]
    pub input: Option<PathBuf>,

    /// Grade the built-in sample course instead of reading a file
    #[arg(long)]
    pub sample: bool,

    /// Reference time for deciding which assignments are due
    ///
    /// RFC 3339 or YYYY-MM-DD. Defaults to the current time.
    #[arg(long, value_name = "TIMESTAMP", value_parser = parse_timestamp)]
    pub now: Option<DateTime<Utc>>,

    /// Output file path (defaults to stdout)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format (json, markdown, records)
    #[arg(long, default_value = "json", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Percentage points deducted from late submissions
    ///
    /// Overrides the config file. Default: 10.
    #[arg(long, value_name = "POINTS")]
    pub late_penalty: Option<f64>,

    /// Decimal places for percentages in Markdown output
    #[arg(long, value_name = "DIGITS")]
    pub precision: Option<usize>,

    /// Leave skipped submissions out of Markdown output
    #[arg(long)]
    pub no_skipped: bool,

    /// Path to configuration file
    ///
    /// If not specified, looks for .gradecalc.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (errors only)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .gradecalc.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Full report as JSON (default)
    #[default]
    Json,
    /// Full report as Markdown
    Markdown,
    /// Only the learner records as a JSON array
    Records,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        if self.input.is_none() && !self.sample {
            return Err("Either --input or --sample is required".to_string());
        }

        if let Some(penalty) = self.late_penalty {
            if !penalty.is_finite() || penalty < 0.0 {
                return Err("Late penalty must be a non-negative number".to_string());
            }
        }

        if let Some(precision) = self.precision {
            if precision > 10 {
                return Err("Precision must be at most 10".to_string());
            }
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        // Validate input file if provided
        if let Some(ref input) = self.input {
            if !input.is_file() {
                return Err(format!("Input file does not exist: {}", input.display()));
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }

    /// Reference time for the run: `--now` if given, otherwise the clock.
    pub fn reference_time(&self) -> DateTime<Utc> {
        self.now.unwrap_or_else(Utc::now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn make_args() -> Args {
        Args {
            input: None,
            sample: true,
            now: None,
            output: None,
            format: OutputFormat::Json,
            late_penalty: None,
            precision: None,
            no_skipped: false,
            config: None,
            verbose: false,
            quiet: false,
            init_config: false,
        }
    }

    #[test]
    fn test_parse_from_command_line() {
        let args = Args::try_parse_from([
            "gradecalc",
            "--sample",
            "--now",
            "2024-10-01",
            "--format",
            "markdown",
            "--late-penalty",
            "5",
        ])
        .unwrap();

        assert!(args.sample);
        assert_eq!(args.format, OutputFormat::Markdown);
        assert_eq!(args.late_penalty, Some(5.0));
        assert_eq!(
            args.reference_time(),
            Utc.with_ymd_and_hms(2024, 10, 1, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_parse_rejects_bad_now() {
        let result = Args::try_parse_from(["gradecalc", "--sample", "--now", "tomorrow"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_input_conflicts_with_sample() {
        let result = Args::try_parse_from(["gradecalc", "--sample", "--input", "course.json"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_validation_missing_input_file() {
        let mut args = make_args();
        args.sample = false;
        args.input = Some(PathBuf::from("no/such/course.json"));
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_negative_penalty() {
        let mut args = make_args();
        args.late_penalty = Some(-1.0);
        assert!(args.validate().is_err());

        args.late_penalty = Some(0.0);
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(), tracing::Level::ERROR);
    }
}
