//! trace-samples CLI
//!
//! Rebuilds sampling-profile call trees from Chrome trace files and
//! reports the hottest functions per thread.

use anyhow::Result;
use clap::{Parser, Subcommand};
use env_logger::Env;
use std::path::PathBuf;

use trace_samples::commands::{
    display_version, execute_analyze, validate_args, validate_report_file, AnalyzeArgs,
};
use trace_samples::utils::config::{DEFAULT_HOT_FUNCTION_COUNT, DEFAULT_LONG_TASK_THRESHOLD_MS};

/// trace-samples - sampling profile reconstruction for Chrome traces
#[derive(Parser, Debug)]
#[command(name = "trace-samples")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Analyze the sampling profiles of a trace file
    Analyze {
        /// Chrome trace JSON file
        #[arg(short, long)]
        trace: PathBuf,

        /// Output path for JSON report
        #[arg(short, long, default_value = "report.json")]
        output: PathBuf,

        /// Number of hot functions (and hot stacks per long task)
        #[arg(long, default_value_t = DEFAULT_HOT_FUNCTION_COUNT)]
        top: usize,

        /// Minimum self-time percentage for a hot function
        #[arg(long, default_value_t = 0.0)]
        min_self: f64,

        /// Long-task threshold in milliseconds (0 disables)
        #[arg(long, default_value_t = DEFAULT_LONG_TASK_THRESHOLD_MS)]
        long_task_ms: u64,

        /// Print text summary to stdout
        #[arg(long)]
        summary: bool,

        /// Keep frames whose code type is not JS
        #[arg(long)]
        keep_native: bool,

        /// Keep frames from browser extensions
        #[arg(long)]
        keep_extensions: bool,

        /// Filter frames when building the call tree, not only when resolving samples
        #[arg(long)]
        strict_tree: bool,
    },

    /// Validate a report JSON file
    Validate {
        /// Path to report JSON file
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Display version information
    Version,
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    // Execute command
    match cli.command {
        Commands::Analyze {
            trace,
            output,
            top,
            min_self,
            long_task_ms,
            summary,
            keep_native,
            keep_extensions,
            strict_tree,
        } => {
            let args = AnalyzeArgs {
                trace,
                output_json: output,
                top,
                min_self_percent: min_self,
                long_task_ms,
                print_summary: summary,
                config: AnalyzeArgs::config_from_flags(keep_native, keep_extensions, strict_tree),
            };

            // Validate args first
            validate_args(&args)?;

            execute_analyze(args)?;
        }

        Commands::Validate { file } => {
            validate_report_file(file)?;
        }

        Commands::Version => {
            display_version();
        }
    }

    Ok(())
}
