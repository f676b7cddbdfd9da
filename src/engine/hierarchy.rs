//! Finalize-time construction of per-thread profiles.
//!
//! Profile heads and chunks are only paired up here because they may arrive
//! out of order or incomplete. For every thread with a complete profile the
//! builder runs, in order: boundary collection, tree building, sample
//! collection, call construction and call merging.

use super::handler::RawProfile;
use crate::aggregator::{
    build_call_from_sample, collect_boundaries, collect_samples, collect_stack_traces, hot_functions,
    hot_stack_traces, merge_calls, FunctionSummary, ProfileCall, ProfileSample, ProfileTree,
};
use crate::parser::{CallFrame, Micros, Pid, ProfileChunkData, ProfileHeadData, ProfileId, Tid, TraceEvent};
use crate::utils::config::EngineConfig;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Complete events of every thread, keyed by pid then tid
pub type EventsByThread = BTreeMap<Pid, BTreeMap<Tid, Vec<TraceEvent>>>;

/// Reconstructed profile of one sampled thread
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplesThread {
    /// Profile the thread was built from
    pub profile_id: ProfileId,

    pub tree: ProfileTree,

    /// Sorted timestamps samples are never merged across
    pub boundaries: Vec<Micros>,

    /// Samples sorted by timestamp
    pub samples: Vec<ProfileSample>,

    /// Top-level merged calls sorted by timestamp
    pub calls: Vec<ProfileCall>,

    /// Summed duration of the top-level calls
    pub total_dur: Micros,
}

impl SamplesThread {
    /// First and last sample timestamps
    pub fn span(&self) -> Option<(Micros, Micros)> {
        let first = self.samples.first()?;
        let last = self.samples.last()?;
        Some((first.ts, last.ts))
    }

    /// Hot functions of this thread between two timestamps
    pub fn hot_functions(&self, begin: Micros, end: Micros, min_self_percent: f64) -> Vec<FunctionSummary<'_>> {
        hot_functions(&self.calls, begin, end, min_self_percent)
    }

    /// Stack traces (leaf first) of the hottest functions inside a task
    pub fn task_hot_stacks(&self, task: &TraceEvent, min_self_percent: f64, max_count: usize) -> Vec<Vec<&CallFrame>> {
        hot_stack_traces(&self.tree, &self.calls, task.ts, task.end(), min_self_percent, max_count)
    }
}

/// Sampled threads of one process
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SamplesProcess {
    pub threads: BTreeMap<Tid, SamplesThread>,
}

/// Build every sampled process and thread
///
/// **Public** - called once by `SamplesEngine::finalize`
///
/// Profiles without a head or without chunks are skipped. The pid and tid
/// come from the head, since the events are recorded on a different thread
/// than the one sampled. When two profiles target one thread, the first in
/// profile-id order wins.
pub fn build_processes(
    profiles: &mut BTreeMap<ProfileId, RawProfile>,
    events: &EventsByThread,
    config: &EngineConfig,
) -> BTreeMap<Pid, SamplesProcess> {
    let mut processes: BTreeMap<Pid, SamplesProcess> = BTreeMap::new();

    for (profile_id, profile) in profiles.iter_mut() {
        let Some(head) = &profile.head else {
            debug!("Skipping profile {}: no head", profile_id);
            continue;
        };
        if profile.chunks.is_empty() {
            debug!("Skipping profile {}: no chunks", profile_id);
            continue;
        }

        let (pid, tid) = (head.pid, head.tid);
        let process = processes.entry(pid).or_default();
        if process.threads.contains_key(&tid) {
            warn!(
                "Skipping profile {}: thread {}:{} already has a profile",
                profile_id, pid, tid
            );
            continue;
        }

        sort_trace_events(&mut profile.chunks);

        let thread_events = events
            .get(&pid)
            .and_then(|threads| threads.get(&tid))
            .map(Vec::as_slice)
            .unwrap_or(&[]);

        if let Some(thread) = build_thread(profile_id, profile, thread_events, config) {
            process.threads.insert(tid, thread);
        }
    }

    processes.retain(|_, process| !process.threads.is_empty());
    processes
}

/// Build one thread; `None` when its head payload is unusable
fn build_thread(
    profile_id: &ProfileId,
    profile: &RawProfile,
    thread_events: &[TraceEvent],
    config: &EngineConfig,
) -> Option<SamplesThread> {
    let head = profile.head.as_ref()?;
    let (pid, tid) = (head.pid, head.tid);

    let start_time = match ProfileHeadData::decode(head) {
        Ok(data) => data.start_time,
        Err(e) => {
            warn!("Skipping profile {}: unusable head: {}", profile_id, e);
            return None;
        }
    };

    // Step 1. Collect boundaries
    let boundaries = collect_boundaries(thread_events);

    let chunks: Vec<ProfileChunkData> = profile
        .chunks
        .iter()
        .enumerate()
        .filter_map(|(index, chunk)| match ProfileChunkData::decode(chunk) {
            Ok(data) => Some(data),
            Err(e) => {
                warn!("Dropping chunk {} of profile {}: {}", index, profile_id, e);
                None
            }
        })
        .collect();

    // Step 2. Collect all the complete stack traces into a tree
    let tree = collect_stack_traces(&chunks, config.tree_filter);

    // Step 3. Collect all the individual samples into a list
    let samples = collect_samples(pid, tid, start_time, &tree, &chunks, config.sample_filter);

    // Step 4. Coalesce samples
    let calls: Vec<ProfileCall> = samples
        .iter()
        .filter_map(|sample| build_call_from_sample(&tree, sample))
        .collect();
    let merged = merge_calls(calls, &boundaries, config.sampling_interval_us);

    debug!(
        "Built thread {}:{}: {} nodes, {} samples, {} calls, {}us",
        pid,
        tid,
        tree.len(),
        samples.len(),
        merged.calls.len(),
        merged.dur
    );

    Some(SamplesThread {
        profile_id: profile_id.clone(),
        tree,
        boundaries,
        samples,
        calls: merged.calls,
        total_dur: merged.dur,
    })
}

/// Sort events by start time; on ties the longer event comes first
pub fn sort_trace_events(events: &mut [TraceEvent]) {
    events.sort_by(|a, b| match a.ts.cmp(&b.ts) {
        Ordering::Equal => b.end().cmp(&a.end()),
        ordering => ordering,
    });
}
