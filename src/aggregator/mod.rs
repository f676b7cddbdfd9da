//! Reconstruction of sampling profiles into trees, samples and calls.
//!
//! This module transforms decoded profile chunks into:
//! - A stack-trace tree per thread
//! - An ordered list of samples
//! - A forest of merged calls with self and total durations
//! - Hot-function summaries over a time window

pub mod boundaries;
pub mod call_frame;
pub mod classifier;
pub mod merge;
pub mod metrics;
pub mod samples;
pub mod stack_tree;

// Re-export main types and functions
pub use boundaries::collect_boundaries;
pub use call_frame::is_allowed;
pub use classifier::{category, Category};
pub use merge::{build_call_from_sample, merge_calls, MergedCalls, ProfileCall};
pub use metrics::{hot_functions, hot_stack_traces, FunctionSummary};
pub use samples::{collect_samples, find_topmost_allowed, ProfileSample};
pub use stack_tree::{collect_stack_traces, stack_trace_from_id, stack_trace_ids, ProfileNode, ProfileTree};
