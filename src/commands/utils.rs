use crate::output::read_report;
use crate::utils::config::REPORT_SCHEMA_VERSION;
use anyhow::{Context, Result};
use std::path::PathBuf;

/// Validate a report JSON file
pub fn validate_report_file(file_path: PathBuf) -> Result<()> {
    println!("Validating report: {}", file_path.display());

    let report = read_report(&file_path)
        .with_context(|| format!("Failed to read report {}", file_path.display()))?;

    if report.version != REPORT_SCHEMA_VERSION {
        log::warn!(
            "Report schema v{} differs from current v{}",
            report.version,
            REPORT_SCHEMA_VERSION
        );
    }

    println!("✓ Valid report JSON");
    println!("  Version: {}", report.version);
    println!("  Trace: {}", report.trace);
    println!("  Generated: {}", report.generated_at);
    println!("  Threads: {}", report.threads.len());
    println!(
        "  Samples: {}",
        report.threads.iter().map(|thread| thread.sample_count).sum::<usize>()
    );

    Ok(())
}

/// Display version information
pub fn display_version() {
    println!("trace-samples v{}", env!("CARGO_PKG_VERSION"));
    println!("Report Schema: v{}", REPORT_SCHEMA_VERSION);
    println!();
    println!("Rebuilds call trees, samples and merged calls from Chrome sampling profiles.");
}
