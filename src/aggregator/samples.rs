//! Ordered sample collection from delta-encoded chunks.
//!
//! Each chunk carries samples at cumulative, possibly negative, deltas
//! relative to the profile's start time:
//!
//! ```text
//! Chunk 1: [A at +1, A at +2, B at -1, C at +2]
//! Chunk 2: [A at +1, D at +9, E at -1]
//! ```
//!
//! ...which become one list of absolute, ordered samples:
//!
//! ```text
//! [A at 1, B at 2, A at 3, C at 4, A at 5, E at 13, D at 14]
//! ```

use super::call_frame::is_allowed;
use super::stack_tree::ProfileTree;
use crate::parser::{Micros, NodeId, Pid, ProfileChunkData, Tid};
use crate::utils::config::FilterOptions;
use log::debug;
use serde::{Deserialize, Serialize};

/// A sampled stack trace, identified by its topmost allowed frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileSample {
    pub topmost_node_id: NodeId,
    pub pid: Pid,
    pub tid: Tid,
    pub ts: Micros,
}

/// Collect the samples of a thread as an ordered list
///
/// **Public** - step 3 of the hierarchy build
///
/// # Arguments
/// * `start_time` - absolute start time declared by the profile head
/// * `tree` - the thread's stack-trace tree
/// * `chunks` - the thread's chunk payloads, in processing order
/// * `options` - filter deciding which frames a sample may resolve to
///
/// Samples whose stack trace has no allowed frame, or whose node is not in
/// the tree at all, are dropped. The running timestamp still advances past
/// them.
pub fn collect_samples(
    pid: Pid,
    tid: Tid,
    start_time: Micros,
    tree: &ProfileTree,
    chunks: &[ProfileChunkData],
    options: FilterOptions,
) -> Vec<ProfileSample> {
    let mut samples = Vec::new();
    let mut ts = start_time;
    let mut dropped = 0usize;

    for chunk in chunks {
        let (Some(time_deltas), Some(cpu_profile)) = (&chunk.time_deltas, &chunk.cpu_profile) else {
            continue;
        };
        let node_ids = cpu_profile.samples.as_deref().unwrap_or(&[]);

        for (index, delta) in time_deltas.iter().enumerate() {
            ts += delta;

            let topmost = node_ids
                .get(index)
                .and_then(|&node_id| find_topmost_allowed(tree, node_id, options));

            match topmost {
                Some(topmost_node_id) => samples.push(ProfileSample {
                    topmost_node_id,
                    pid,
                    tid,
                    ts,
                }),
                None => dropped += 1,
            }
        }
    }

    // Stable: ties keep their arrival order
    samples.sort_by_key(|sample| sample.ts);

    debug!(
        "Collected {} samples for {}:{} ({} dropped)",
        samples.len(),
        pid,
        tid,
        dropped
    );

    samples
}

/// Walk up from `node_id` to the first frame that passes the filter
///
/// Returns `None` when the node is unknown or no frame on the way to the
/// root is allowed.
pub fn find_topmost_allowed(tree: &ProfileTree, node_id: NodeId, options: FilterOptions) -> Option<NodeId> {
    tree.ancestors(node_id)
        .find(|node| is_allowed(&node.call_frame, options))
        .map(|node| node.id)
}
