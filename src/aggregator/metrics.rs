//! Hot-function queries over a merged call forest.
//!
//! Hot functions are the stack frames with the most self time inside a
//! time window. These are the primary targets for optimization.

use super::merge::ProfileCall;
use super::stack_tree::{stack_trace_from_id, ProfileTree};
use crate::parser::{CallFrame, Micros, NodeId};
use log::debug;
use std::collections::HashMap;

/// Aggregated time of one stack frame within a window
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionSummary<'a> {
    pub node_id: NodeId,

    /// Every contributing call of this frame, in walk order
    pub calls: Vec<&'a ProfileCall>,

    /// Summed call durations as a percentage of the window
    pub dur_percent: f64,

    /// Summed self durations as a percentage of the window
    pub self_dur_percent: f64,
}

impl<'a> FunctionSummary<'a> {
    fn new(node_id: NodeId) -> Self {
        Self {
            node_id,
            calls: Vec::new(),
            dur_percent: 0.0,
            self_dur_percent: 0.0,
        }
    }

    /// Summed duration of the contributing calls in microseconds
    pub fn total_dur(&self) -> Micros {
        self.calls.iter().map(|call| call.dur).sum()
    }

    /// Summed self duration of the contributing calls in microseconds
    pub fn self_dur(&self) -> Micros {
        self.calls.iter().map(|call| call.self_dur).sum()
    }
}

/// Get the hot functions between two timestamps
///
/// **Public** - main entry point for hot-function lookup
///
/// # Arguments
/// * `calls` - a thread's merged call forest
/// * `begin`, `end` - the window, inclusive on both ends
/// * `min_self_percent` - minimum self time, as a percentage of the window
///
/// # Returns
/// Summaries sorted by self time (descending). Only calls entirely inside
/// the window count; a call straddling either edge is skipped together with
/// its children. An empty window yields no functions.
pub fn hot_functions(
    calls: &[ProfileCall],
    begin: Micros,
    end: Micros,
    min_self_percent: f64,
) -> Vec<FunctionSummary<'_>> {
    if end <= begin {
        return Vec::new();
    }

    let mut index: HashMap<NodeId, usize> = HashMap::new();
    let mut functions: Vec<FunctionSummary<'_>> = Vec::new();
    collect_functions(calls, begin, end, &mut index, &mut functions);

    let mut hot: Vec<FunctionSummary<'_>> = functions
        .into_iter()
        .filter(|function| function.self_dur_percent >= min_self_percent)
        .collect();
    hot.sort_by(|a, b| b.self_dur_percent.total_cmp(&a.self_dur_percent));

    debug!(
        "Found {} hot functions between {} and {}",
        hot.len(),
        begin,
        end
    );

    hot
}

/// Recursive walk accumulating per-frame buckets in first-seen order
fn collect_functions<'a>(
    calls: &'a [ProfileCall],
    begin: Micros,
    end: Micros,
    index: &mut HashMap<NodeId, usize>,
    out: &mut Vec<FunctionSummary<'a>>,
) {
    let window = (end - begin) as f64;

    for call in calls {
        if call.ts < begin || call.end() > end {
            continue;
        }

        let slot = *index.entry(call.node_id).or_insert_with(|| {
            out.push(FunctionSummary::new(call.node_id));
            out.len() - 1
        });
        let function = &mut out[slot];
        function.calls.push(call);
        function.dur_percent += call.dur as f64 / window * 100.0;
        function.self_dur_percent += call.self_dur as f64 / window * 100.0;

        collect_functions(&call.children, begin, end, index, out);
    }
}

/// Stack traces of the hottest functions in a window, leaf frame first
///
/// **Public** - attribution primitive for task-level reports
///
/// # Arguments
/// * `tree` - the thread's stack-trace tree
/// * `calls` - the thread's merged call forest
/// * `max_count` - number of hot functions to keep
pub fn hot_stack_traces<'t>(
    tree: &'t ProfileTree,
    calls: &[ProfileCall],
    begin: Micros,
    end: Micros,
    min_self_percent: f64,
    max_count: usize,
) -> Vec<Vec<&'t CallFrame>> {
    hot_functions(calls, begin, end, min_self_percent)
        .iter()
        .take(max_count)
        .map(|function| {
            let mut frames = stack_trace_from_id(tree, function.node_id);
            frames.reverse();
            frames
        })
        .collect()
}
