//! GradeCalc - per-learner assignment percentages and course averages
//!
//! Reads course data, scores every due submission and writes the learner
//! records or a full report.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (bad arguments, unreadable input or config, etc.)
//!   2 - Course data is inconsistent; no learner records were produced

use anyhow::{Context, Result};
use chrono::Utc;
use gradecalc::cli::{Args, OutputFormat};
use gradecalc::config::{Config, CONFIG_FILE_NAME};
use gradecalc::grading::ScoreAggregator;
use gradecalc::input;
use gradecalc::models::{CourseBundle, Report, ReportMetadata};
use gradecalc::report::{self, MarkdownOptions};
use std::path::Path;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    let mut config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    };
    config.merge_with_args(&args);

    init_logging(&args, &config)?;

    info!("GradeCalc v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    match run(&args, &config) {
        Ok(exit_code) => std::process::exit(exit_code),
        Err(e) => {
            error!("Grading failed: {:#}", e);
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .gradecalc.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(CONFIG_FILE_NAME);

    if path.exists() {
        eprintln!(
            "{} already exists. Remove it first or edit it manually.",
            CONFIG_FILE_NAME
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", CONFIG_FILE_NAME))?;

    println!("Created {} with default settings.", CONFIG_FILE_NAME);
    Ok(())
}

/// Initialize logging on stderr. `RUST_LOG` wins over the verbosity flags.
fn init_logging(args: &Args, config: &Config) -> Result<()> {
    let level = if !args.quiet && config.general.verbose {
        tracing::Level::DEBUG
    } else {
        args.log_level()
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_lowercase()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to set tracing subscriber: {}", e))
}

/// Grade the course and write the output. Returns the exit code (0 or 2).
fn run(args: &Args, config: &Config) -> Result<i32> {
    let bundle = load_bundle(args)?;
    let now = args.reference_time();
    let aggregator = ScoreAggregator::new(config.scoring_policy());

    info!(
        "Grading course {} ({}) as of {}",
        bundle.course.id,
        bundle.course.name,
        now.to_rfc3339()
    );

    let grading = match aggregator.compute(
        &bundle.course,
        &bundle.assignment_groups,
        &bundle.submissions,
        now,
    ) {
        Ok(grading) => grading,
        Err(e) => {
            error!("Error processing learner data: {}", e);
            if args.format == OutputFormat::Records {
                write_output(&config.general.output, &report::generate_learner_json(&[])?)?;
            }
            return Ok(2);
        }
    };

    info!(
        "Graded {} learners; {} submissions skipped",
        grading.records.len(),
        grading.skipped.len()
    );

    let output = match args.format {
        OutputFormat::Records => report::generate_learner_json(&grading.records)?,
        OutputFormat::Json | OutputFormat::Markdown => {
            let metadata = ReportMetadata {
                course_id: bundle.course.id,
                course_name: bundle.course.name.clone(),
                generated_at: Utc::now(),
                reference_time: now,
                late_penalty: aggregator.policy().late_penalty,
                submissions_total: bundle.submissions.len(),
            };
            let grade_report = Report::new(metadata, grading);

            if args.format == OutputFormat::Json {
                report::generate_json_report(&grade_report)?
            } else {
                report::generate_markdown_report(
                    &grade_report,
                    MarkdownOptions::from(&config.report),
                )
            }
        }
    };

    write_output(&config.general.output, &output)?;

    Ok(0)
}

/// Load the course data named on the command line.
fn load_bundle(args: &Args) -> Result<CourseBundle> {
    match args.input {
        Some(ref path) => input::load_bundle(path),
        None => {
            info!("Using built-in sample course");
            input::sample_bundle()
        }
    }
}

/// Write to the configured output file, or stdout when none is set.
fn write_output(destination: &str, content: &str) -> Result<()> {
    if destination.is_empty() {
        println!("{}", content);
        return Ok(());
    }

    std::fs::write(destination, content)
        .with_context(|| format!("Failed to write output to {}", destination))?;
    info!("Output saved to: {}", destination);

    Ok(())
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => Ok(config),
        Ok(None) => Ok(Config::default()),
        Err(e) => {
            eprintln!("Warning: {:#}; using defaults", e);
            Ok(Config::default())
        }
    }
}
