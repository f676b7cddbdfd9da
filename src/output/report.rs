//! Report schema written by the analyze command.
//!
//! Schema is versioned to allow future evolution.

use crate::aggregator::{FunctionSummary, ProfileTree};
use crate::engine::{SamplesEngine, SamplesThread};
use crate::parser::{CallFrame, Micros, NodeId, Pid, ProfileId, Tid};
use crate::utils::config::{REPORT_SCHEMA_VERSION, RUN_TASK_EVENT};
use crate::utils::error::EngineError;
use serde::{Deserialize, Serialize};

/// Top-level report structure written to JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// Schema version for compatibility checking
    pub version: String,

    /// Trace the report was built from
    pub trace: String,

    /// One entry per sampled thread
    pub threads: Vec<ThreadReport>,

    /// Timestamp when the report was generated
    pub generated_at: String,
}

/// Summary of one sampled thread
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreadReport {
    pub pid: Pid,
    pub tid: Tid,
    pub profile_id: ProfileId,
    pub node_count: usize,
    pub sample_count: usize,
    pub call_count: usize,

    /// Summed duration of the top-level merged calls
    pub total_dur_us: Micros,

    /// Hottest functions over the thread's sampled span
    pub hot_functions: Vec<HotFunction>,

    /// Tasks at or above the long-task threshold
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub long_tasks: Vec<LongTask>,
}

/// A stack frame ranked by self time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HotFunction {
    pub node_id: NodeId,
    pub function_name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_number: Option<i64>,

    pub call_count: usize,
    pub dur_us: Micros,
    pub self_dur_us: Micros,
    pub dur_percent: f64,
    pub self_dur_percent: f64,
}

impl HotFunction {
    /// One-line label: `name (url:line)`, or just the name
    pub fn label(&self) -> String {
        match (self.url.as_deref(), self.line_number) {
            (Some(url), Some(line)) => format!("{} ({}:{})", self.function_name, url, line),
            (Some(url), None) => format!("{} ({})", self.function_name, url),
            _ => self.function_name.clone(),
        }
    }
}

/// A long task and the stacks that kept it busy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LongTask {
    pub ts: Micros,
    pub dur_us: Micros,

    /// Hot stack traces, each leaf frame first
    pub hot_stacks: Vec<Vec<String>>,
}

/// Knobs for report building
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReportOptions {
    /// Number of hot functions per thread and stacks per long task
    pub top: usize,

    pub min_self_percent: f64,

    /// `None` disables long-task reporting
    pub long_task_threshold_us: Option<Micros>,
}

/// Build a report from a finalized engine
///
/// **Public** - used by the analyze command
///
/// # Errors
/// * `EngineError::NotFinalized` - the engine has not been finalized
pub fn build_report(trace: &str, engine: &SamplesEngine, options: &ReportOptions) -> Result<Report, EngineError> {
    let mut threads = Vec::new();

    for (&pid, process) in engine.processes()? {
        for (&tid, thread) in &process.threads {
            let long_tasks = match options.long_task_threshold_us {
                Some(threshold) => build_long_tasks(engine, pid, tid, thread, threshold, options),
                None => Vec::new(),
            };
            threads.push(build_thread_report(pid, tid, thread, long_tasks, options));
        }
    }

    Ok(Report {
        version: REPORT_SCHEMA_VERSION.to_string(),
        trace: trace.to_string(),
        threads,
        generated_at: chrono::Utc::now().to_rfc3339(),
    })
}

fn build_thread_report(
    pid: Pid,
    tid: Tid,
    thread: &SamplesThread,
    long_tasks: Vec<LongTask>,
    options: &ReportOptions,
) -> ThreadReport {
    let hot_functions = match thread.span() {
        Some((begin, end)) => thread
            .hot_functions(begin, end, options.min_self_percent)
            .iter()
            .take(options.top)
            .map(|function| to_hot_function(&thread.tree, function))
            .collect(),
        None => Vec::new(),
    };

    ThreadReport {
        pid,
        tid,
        profile_id: thread.profile_id.clone(),
        node_count: thread.tree.len(),
        sample_count: thread.samples.len(),
        call_count: thread.calls.len(),
        total_dur_us: thread.total_dur,
        hot_functions,
        long_tasks,
    }
}

fn build_long_tasks(
    engine: &SamplesEngine,
    pid: Pid,
    tid: Tid,
    thread: &SamplesThread,
    threshold: Micros,
    options: &ReportOptions,
) -> Vec<LongTask> {
    engine
        .thread_events(pid, tid)
        .iter()
        .filter(|event| event.name == RUN_TASK_EVENT && event.dur.unwrap_or(0) >= threshold)
        .map(|task| LongTask {
            ts: task.ts,
            dur_us: task.dur.unwrap_or(0),
            hot_stacks: thread
                .task_hot_stacks(task, options.min_self_percent, options.top)
                .into_iter()
                .map(|frames| frames.into_iter().map(frame_label).collect())
                .collect(),
        })
        .collect()
}

fn to_hot_function(tree: &ProfileTree, function: &FunctionSummary<'_>) -> HotFunction {
    let frame = tree.get(function.node_id).map(|node| &node.call_frame);

    HotFunction {
        node_id: function.node_id,
        function_name: frame.map_or_else(String::new, display_name),
        url: frame.and_then(|frame| frame.url.clone()).filter(|url| !url.is_empty()),
        line_number: frame.and_then(|frame| frame.line_number),
        call_count: function.calls.len(),
        dur_us: function.total_dur(),
        self_dur_us: function.self_dur(),
        dur_percent: function.dur_percent,
        self_dur_percent: function.self_dur_percent,
    }
}

fn display_name(frame: &CallFrame) -> String {
    if frame.function_name.is_empty() {
        "(anonymous)".to_string()
    } else {
        frame.function_name.clone()
    }
}

/// One-line label of a frame: `name (url:line)`, or just the name
pub fn frame_label(frame: &CallFrame) -> String {
    let name = display_name(frame);
    match (frame.url.as_deref(), frame.line_number) {
        (Some(url), Some(line)) if !url.is_empty() => format!("{} ({}:{})", name, url, line),
        (Some(url), None) if !url.is_empty() => format!("{} ({})", name, url),
        _ => name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_label() {
        assert_eq!(frame_label(&CallFrame::new("")), "(anonymous)");
        assert_eq!(
            frame_label(&CallFrame::new("render").with_url("https://a.com/app.js").with_line(12)),
            "render (https://a.com/app.js:12)"
        );
        assert_eq!(frame_label(&CallFrame::new("init").with_url("https://a.com/app.js")), "init (https://a.com/app.js)");
        assert_eq!(frame_label(&CallFrame::new("(program)").with_url("")), "(program)");
    }

    #[test]
    fn test_build_report_requires_finalize() {
        let engine = SamplesEngine::default();
        let options = ReportOptions {
            top: 10,
            min_self_percent: 0.0,
            long_task_threshold_us: None,
        };
        assert_eq!(build_report("t.json", &engine, &options), Err(EngineError::NotFinalized));
    }
}
