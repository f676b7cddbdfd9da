//! Analyze command implementation.
//!
//! The analyze command:
//! 1. Loads the trace file
//! 2. Feeds every event through the samples engine
//! 3. Finalizes the engine (trees, samples, merged calls)
//! 4. Builds the report
//! 5. Writes output files

use crate::engine::SamplesEngine;
use crate::output::{build_report, write_report, Report, ReportOptions};
use crate::parser::load_trace_file;
use crate::utils::config::{
    EngineConfig, FilterOptions, DEFAULT_HOT_FUNCTION_COUNT, DEFAULT_LONG_TASK_THRESHOLD_MS,
};
use anyhow::{Context, Result};
use log::{debug, info};
use std::path::PathBuf;
use std::time::Instant;

/// Arguments for the analyze command
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone)]
pub struct AnalyzeArgs {
    /// Chrome trace file to read
    pub trace: PathBuf,

    /// Output path for the JSON report
    pub output_json: PathBuf,

    /// Number of hot functions per thread and hot stacks per long task
    pub top: usize,

    /// Minimum self-time percentage for a hot function
    pub min_self_percent: f64,

    /// Long-task threshold in milliseconds (0 disables long tasks)
    pub long_task_ms: u64,

    /// Print text summary to stdout
    pub print_summary: bool,

    /// Engine configuration
    pub config: EngineConfig,
}

impl Default for AnalyzeArgs {
    fn default() -> Self {
        Self {
            trace: PathBuf::new(),
            output_json: PathBuf::from("report.json"),
            top: DEFAULT_HOT_FUNCTION_COUNT,
            min_self_percent: 0.0,
            long_task_ms: DEFAULT_LONG_TASK_THRESHOLD_MS,
            print_summary: false,
            config: EngineConfig::default(),
        }
    }
}

impl AnalyzeArgs {
    /// Engine configuration with CLI overrides applied
    ///
    /// `keep_native` disables the code-type check, `keep_extensions` the URL
    /// check, and `strict_tree` filters frames at tree admission as well.
    pub fn config_from_flags(keep_native: bool, keep_extensions: bool, strict_tree: bool) -> EngineConfig {
        let filter = FilterOptions {
            filter_code_types: !keep_native,
            filter_urls: !keep_extensions,
        };

        let config = EngineConfig::default().with_sample_filter(filter);
        if strict_tree {
            config.with_tree_filter(filter)
        } else {
            config
        }
    }

    fn report_options(&self) -> ReportOptions {
        ReportOptions {
            top: self.top,
            min_self_percent: self.min_self_percent,
            long_task_threshold_us: match self.long_task_ms {
                0 => None,
                ms => Some(i64::try_from(ms.saturating_mul(1000)).unwrap_or(i64::MAX)),
            },
        }
    }
}

/// Execute the analyze command
///
/// **Public** - main entry point called from main.rs
///
/// # Errors
/// * Trace file read or parse errors
/// * Engine protocol errors
/// * File write errors
pub fn execute_analyze(args: AnalyzeArgs) -> Result<Report> {
    let start_time = Instant::now();

    info!("Starting analysis of: {}", args.trace.display());

    // Step 1: Load trace
    info!("Step 1/5: Loading trace file...");
    let events = load_trace_file(&args.trace)
        .with_context(|| format!("Failed to load trace file {}", args.trace.display()))?;

    debug!("Loaded {} trace events", events.len());

    // Step 2: Feed events
    info!("Step 2/5: Handling {} events...", events.len());
    let mut engine = SamplesEngine::new(args.config);
    engine.reset();
    engine.initialize().context("Failed to initialize samples engine")?;
    for event in events {
        engine.handle_event(event).context("Failed to handle trace event")?;
    }

    // Step 3: Finalize
    info!("Step 3/5: Reconstructing samples and calls...");
    engine.finalize().context("Failed to finalize samples engine")?;

    // Step 4: Build report
    info!("Step 4/5: Building report...");
    let trace_name = args.trace.display().to_string();
    let report = build_report(&trace_name, &engine, &args.report_options())
        .context("Failed to build report")?;

    debug!("Report covers {} threads", report.threads.len());

    // Step 5: Write outputs
    info!("Step 5/5: Writing output files...");
    write_report(&report, &args.output_json).context("Failed to write report JSON")?;

    info!("✓ Report written to: {}", args.output_json.display());

    if args.print_summary {
        print_summary(&report);
    }

    let elapsed = start_time.elapsed();
    info!("Analysis completed in {:.2}s", elapsed.as_secs_f64());

    Ok(report)
}

/// Print a text summary of the report to stdout
///
/// **Private** - internal helper for execute_analyze
fn print_summary(report: &Report) {
    println!("\n{}", "=".repeat(80));
    println!("SAMPLES SUMMARY");
    println!("{}", "=".repeat(80));
    println!("Trace:   {}", report.trace);
    println!("Threads: {}", report.threads.len());

    for thread in &report.threads {
        println!();
        println!(
            "pid {} tid {} (profile {}): {} nodes, {} samples, {} calls, {} us",
            thread.pid,
            thread.tid,
            thread.profile_id,
            thread.node_count,
            thread.sample_count,
            thread.call_count,
            thread.total_dur_us
        );

        for (i, hot) in thread.hot_functions.iter().enumerate() {
            println!(
                "  {:>2}. {:>6.2}% self {:>6.2}% total  {}",
                i + 1,
                hot.self_dur_percent,
                hot.dur_percent,
                hot.label()
            );
        }

        if !thread.long_tasks.is_empty() {
            println!("  Long tasks: {}", thread.long_tasks.len());
        }
    }

    println!("{}", "=".repeat(80));
}

/// Validate analyze arguments
///
/// **Public** - can be called before execute_analyze for early validation
pub fn validate_args(args: &AnalyzeArgs) -> Result<()> {
    if args.trace.as_os_str().is_empty() {
        anyhow::bail!("Trace path cannot be empty");
    }

    if !args.trace.exists() {
        anyhow::bail!("Trace file does not exist: {}", args.trace.display());
    }

    if args.top == 0 {
        anyhow::bail!("top must be greater than 0");
    }

    if args.top > 1000 {
        anyhow::bail!("top is too large (max 1000)");
    }

    if !(0.0..=100.0).contains(&args.min_self_percent) {
        anyhow::bail!("min-self must be a percentage between 0 and 100");
    }

    Ok(())
}
