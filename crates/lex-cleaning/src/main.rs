//! CLI entry point for the CSV cleaning pipeline.

use anyhow::{Result, anyhow};
use clap::Parser;
use dotenv::dotenv;
use lex_cleaning::{CleaningConfig, Orchestrator, RunSummary};
use std::path::PathBuf;
use tracing::{debug, error, info};

#[derive(Parser, Debug)]
#[command(
    author = "Lex Machina Team",
    version,
    about = "CSV Cleaning Pipeline",
    long_about = "Removes duplicate rows and fills missing text values in a CSV file.\n\n\
                  EXAMPLES:\n  \
                  # Clean a file and print the report\n  \
                  lex-cleaning -i data.csv\n\n  \
                  # Write the cleaned dataset\n  \
                  lex-cleaning -i data.csv -o data_clean.csv\n\n  \
                  # Use a different sentinel, no progress ramp\n  \
                  lex-cleaning -i data.csv --sentinel UNKNOWN --no-progress\n\n  \
                  # Machine-readable report\n  \
                  lex-cleaning -i data.csv --json | jq .report"
)]
struct Args {
    /// Path to the CSV file to clean
    #[arg(short, long)]
    input: PathBuf,

    /// Where to write the cleaned CSV (overwritten if it exists)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// JSON configuration file
    ///
    /// Flags given on the command line take precedence over its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Value written into missing text cells
    #[arg(long)]
    sentinel: Option<String>,

    /// Delay between progress events in milliseconds
    #[arg(long)]
    progress_interval_ms: Option<u64>,

    /// Stop the progress ramp as soon as cleaning is done
    #[arg(long)]
    no_progress: bool,

    /// Output JSON to stdout instead of human-readable summary
    ///
    /// Disables all logs; only outputs the final JSON report.
    #[arg(long)]
    json: bool,

    /// Write the JSON report to this file
    #[arg(short = 'r', long)]
    emit_report: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show errors and final result)
    #[arg(short, long)]
    quiet: bool,
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is completely disabled to ensure
/// only JSON is written to stdout.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level, args.quiet, args.json);

    dotenv().ok();

    let config = build_config(&args)?;
    debug!("Using configuration: {:?}", config);

    let orchestrator = Orchestrator::new(config);
    if !args.no_progress {
        orchestrator.on_progress(|event| {
            if event.percent % 10 == 0 {
                info!(
                    "[{:>3}%] {:.2}s elapsed",
                    event.percent, event.elapsed_seconds
                );
            }
        });
    }

    let loaded = orchestrator.load(&args.input)?;
    info!(
        "Cleaning {} ({} bytes)",
        loaded.path.display(),
        loaded.size_bytes
    );

    let handle = orchestrator.process()?;
    if args.no_progress {
        handle.cancel_progress();
    }

    let (result, progress) = handle.finish().await;
    debug!("Progress ramp ended: {}", progress);

    let report = match result {
        Ok(report) => report,
        Err(e) => {
            error!("Cleaning failed: {}", e);
            for step in e.processing_log() {
                error!("  completed: {}", step);
            }
            return Err(anyhow!("[{}] {}", e.root_cause().error_code(), e));
        }
    };

    if let Some(ref output) = args.output {
        orchestrator.export(output)?;
    }

    let summary = RunSummary::new(
        &loaded.path,
        args.output.clone(),
        report,
        orchestrator.steps(),
    );

    if let Some(ref report_path) = args.emit_report {
        summary.write_to_file(report_path)?;
    }

    if args.json {
        println!("{}", summary.to_json()?);
        return Ok(());
    }

    print_human_readable_summary(&summary);
    Ok(())
}

/// Defaults, then the `--config` file, then individual flags.
fn build_config(args: &Args) -> Result<CleaningConfig> {
    let mut config = match args.config {
        Some(ref path) => CleaningConfig::from_json_file(path)?,
        None => CleaningConfig::default(),
    };

    if let Some(ref sentinel) = args.sentinel {
        config.sentinel = sentinel.clone();
    }
    if let Some(interval) = args.progress_interval_ms {
        config.progress_interval_ms = interval;
    }

    config.validate()?;
    Ok(config)
}

/// Print the report for a person at a terminal.
///
/// This is the default output when `--json` is not given.
fn print_human_readable_summary(summary: &RunSummary) {
    println!();
    println!("{}", "=".repeat(60));
    println!("CLEANING COMPLETE");
    println!("{}", "=".repeat(60));
    println!();

    println!("Input:  {}", summary.input_file.display());
    if let Some(ref output) = summary.output_file {
        println!("Output: {}", output.display());
    }
    println!();

    print!("{}", summary.report_text);
    println!();

    if !summary.steps.is_empty() {
        println!("Steps:");
        for step in &summary.steps {
            println!("  - {}", step);
        }
        println!();
    }

    println!("Use --json for machine-readable output");
    println!("{}", "=".repeat(60));
}
