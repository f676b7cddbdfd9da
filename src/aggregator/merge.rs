//! Coalescing of consecutive samples into calls.
//!
//! Given a stack-trace tree such as:
//!
//! ```text
//!   A   E
//!  / \
//! B   D
//! |
//! C
//! ```
//!
//! ...and samples over time (topmost frame per sample, stack growing down):
//!
//! ```text
//! |A|A|A|A|A|A|A|A|A|A|A|A|A|A|A|A|A| |E|E|E|E|E|E|
//! | |B|B|B|B|B|B| |D|D|D|D|D|D| | | | | | | | | | |
//! | | |C|C|C|C| | | | | | | | | | | | | | | | | | |
//! ```
//!
//! ...the merge produces a forest of calls with timestamps and durations:
//!
//! ```text
//! [-------- Call A --------][ Call E ]
//!  [- Call B -][- Call D -]
//!   [ Call C ]
//! ```
//!
//! Consecutive samples of one frame are not merged when a boundary lies
//! between them, when a different frame was sampled in between, or when
//! they are at least one sampling interval apart.

use super::boundaries::next_boundary_after;
use super::samples::ProfileSample;
use super::stack_tree::ProfileTree;
use crate::parser::{Micros, NodeId, Pid, Tid};
use log::warn;
use serde::{Deserialize, Serialize};

/// A contiguous run of samples of one stack frame
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileCall {
    pub node_id: NodeId,
    pub pid: Pid,
    pub tid: Tid,
    pub ts: Micros,
    pub dur: Micros,

    /// `dur` minus the durations of `children`
    pub self_dur: Micros,

    /// Calls made from this one, in time order
    pub children: Vec<ProfileCall>,
}

impl ProfileCall {
    /// Zero-length call of `node_id` at the time of `sample`
    pub fn new(node_id: NodeId, sample: &ProfileSample) -> Self {
        Self {
            node_id,
            pid: sample.pid,
            tid: sample.tid,
            ts: sample.ts,
            dur: 0,
            self_dur: 0,
            children: Vec::new(),
        }
    }

    pub fn end(&self) -> Micros {
        self.ts + self.dur
    }
}

/// Result of merging one level of calls
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergedCalls {
    pub calls: Vec<ProfileCall>,

    /// Sum of the durations of `calls`
    pub dur: Micros,
}

/// Turn a sample into a single-branch chain of calls, root first
///
/// **Public** - step 4 of the hierarchy build
///
/// Returns `None` when the sample's frame is not part of the tree, or when
/// its parent chain loops.
pub fn build_call_from_sample(tree: &ProfileTree, sample: &ProfileSample) -> Option<ProfileCall> {
    let mut walk = tree.ancestors(sample.topmost_node_id);
    let leaf_first: Vec<NodeId> = walk.by_ref().map(|node| node.id).collect();
    if walk.exhausted() {
        warn!(
            "Dropping sample at {}: parent chain of node {} loops",
            sample.ts, sample.topmost_node_id
        );
        return None;
    }

    leaf_first
        .into_iter()
        .fold(None, |child, node_id| {
            let mut call = ProfileCall::new(node_id, sample);
            call.children.extend(child);
            Some(call)
        })
}

/// Merge time-ordered calls, then recursively merge their children
///
/// **Public** - step 5 of the hierarchy build
///
/// # Arguments
/// * `calls` - calls sorted by timestamp
/// * `boundaries` - sorted boundary timestamps
/// * `sampling_interval` - gap at or above which calls are not merged
///
/// # Algorithm
/// A call at or past the current boundary always starts a new merge and
/// moves the boundary to the first one strictly after it. Otherwise the
/// call extends the previous one when both have the same frame and the gap
/// between the previous end and this start is below the sampling interval;
/// its children are appended to the previous call's children.
///
/// The boundary starts at 0, so the first call always opens a new merge.
///
/// A call whose children add up to more than its own duration is dropped
/// with a warning.
pub fn merge_calls(calls: Vec<ProfileCall>, boundaries: &[Micros], sampling_interval: Micros) -> MergedCalls {
    let mut merged: Vec<ProfileCall> = Vec::new();
    let mut boundary: Option<Micros> = Some(0);

    for call in calls {
        if boundary.is_some_and(|boundary| call.ts >= boundary) {
            boundary = next_boundary_after(boundaries, call.ts);
            merged.push(call);
            continue;
        }

        match merged.last_mut() {
            Some(previous)
                if previous.node_id == call.node_id && call.ts - previous.end() < sampling_interval =>
            {
                previous.dur = call.ts - previous.ts;
                previous.children.extend(call.children);
            }
            _ => merged.push(call),
        }
    }

    let mut out = MergedCalls {
        calls: Vec::with_capacity(merged.len()),
        dur: 0,
    };

    for mut call in merged {
        let children = merge_calls(std::mem::take(&mut call.children), boundaries, sampling_interval);
        call.children = children.calls;
        call.self_dur = call.dur - children.dur;

        if call.self_dur < 0 {
            warn!(
                "Dropping call of node {} at {}: children last {}us, call lasts {}us",
                call.node_id, call.ts, children.dur, call.dur
            );
            continue;
        }

        out.dur += call.dur;
        out.calls.push(call);
    }

    out
}
