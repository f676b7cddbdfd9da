//! Report schema and writers.
//!
//! This module handles:
//! - Building reports from a finalized engine
//! - Writing and reading JSON reports

pub mod json;
pub mod report;

// Re-export main functions
pub use json::{read_report, report_to_string, write_report};
pub use report::{build_report, frame_label, HotFunction, LongTask, Report, ReportOptions, ThreadReport};
