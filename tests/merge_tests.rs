use pretty_assertions::assert_eq;
use trace_samples::aggregator::{
    build_call_from_sample, collect_stack_traces, merge_calls, ProfileCall, ProfileSample, ProfileTree,
};
use trace_samples::parser::{CallFrame, ChainLink, ChunkCpuProfile, ProfileChunkData};
use trace_samples::utils::config::SAMPLING_INTERVAL_US;
use trace_samples::utils::FilterOptions;

/// `(node_id, ts, dur, self_dur, children)`
#[derive(Debug, PartialEq)]
struct Shape(u64, i64, i64, i64, Vec<Shape>);

fn shape(calls: &[ProfileCall]) -> Vec<Shape> {
    calls
        .iter()
        .map(|call| Shape(call.node_id, call.ts, call.dur, call.self_dur, shape(&call.children)))
        .collect()
}

fn tree(links: &[(u64, Option<u64>, &str)]) -> ProfileTree {
    let links = links
        .iter()
        .map(|&(id, parent, name)| ChainLink::new(id, parent, CallFrame::new(name)))
        .collect();
    let chunk = ProfileChunkData {
        cpu_profile: Some(ChunkCpuProfile {
            nodes: Some(links),
            samples: None,
        }),
        time_deltas: None,
    };
    collect_stack_traces(&[chunk], FilterOptions::none())
}

fn calls(tree: &ProfileTree, samples: &[(u64, i64)]) -> Vec<ProfileCall> {
    samples
        .iter()
        .filter_map(|&(topmost_node_id, ts)| {
            build_call_from_sample(
                tree,
                &ProfileSample {
                    topmost_node_id,
                    pid: 1,
                    tid: 1,
                    ts,
                },
            )
        })
        .collect()
}

fn flat(node_id: u64, ts: i64) -> ProfileCall {
    ProfileCall {
        node_id,
        pid: 1,
        tid: 1,
        ts,
        dur: 0,
        self_dur: 0,
        children: Vec::new(),
    }
}

#[test]
fn test_nested_stacks_merge_into_call_forest() {
    //   A   E
    //  / \
    // B   D
    // |
    // C
    let tree = tree(&[
        (1, None, "A"),
        (2, Some(1), "B"),
        (3, Some(2), "C"),
        (4, Some(1), "D"),
        (5, None, "E"),
    ]);
    let samples = [(1, 0), (2, 10), (3, 20), (3, 30), (2, 40), (4, 50), (4, 60), (1, 70), (5, 80), (5, 90)];

    let merged = merge_calls(calls(&tree, &samples), &[], SAMPLING_INTERVAL_US);

    assert_eq!(
        shape(&merged.calls),
        vec![
            Shape(
                1,
                0,
                70,
                30,
                vec![
                    Shape(2, 10, 30, 20, vec![Shape(3, 20, 10, 10, vec![])]),
                    Shape(4, 50, 10, 10, vec![]),
                ]
            ),
            Shape(5, 80, 10, 10, vec![]),
        ]
    );
    assert_eq!(merged.dur, 80);
}

#[test]
fn test_samples_outside_tree_produce_no_call() {
    let tree = tree(&[(1, None, "A")]);
    assert!(calls(&tree, &[(42, 0)]).is_empty());
}

#[test]
fn test_gap_of_one_interval_splits() {
    let merged = merge_calls(vec![flat(1, 0), flat(1, 199), flat(1, 399)], &[], SAMPLING_INTERVAL_US);
    assert_eq!(shape(&merged.calls), vec![Shape(1, 0, 199, 199, vec![]), Shape(1, 399, 0, 0, vec![])]);
}

#[test]
fn test_boundary_starts_a_new_call() {
    let input = vec![flat(1, 0), flat(1, 10), flat(1, 20), flat(1, 30), flat(1, 40)];
    let merged = merge_calls(input, &[25], SAMPLING_INTERVAL_US);
    assert_eq!(shape(&merged.calls), vec![Shape(1, 0, 20, 20, vec![]), Shape(1, 30, 10, 10, vec![])]);

    // A sample exactly on a boundary opens the new call
    let input = vec![flat(1, 0), flat(1, 10), flat(1, 20), flat(1, 30)];
    let merged = merge_calls(input, &[20], SAMPLING_INTERVAL_US);
    assert_eq!(shape(&merged.calls), vec![Shape(1, 0, 10, 10, vec![]), Shape(1, 20, 10, 10, vec![])]);
}

#[test]
fn test_boundaries_apply_to_children() {
    let tree = tree(&[(1, None, "A"), (2, Some(1), "B")]);
    let samples = [(2, 0), (2, 10), (2, 20), (2, 30)];

    let merged = merge_calls(calls(&tree, &samples), &[0, 15], SAMPLING_INTERVAL_US);

    assert_eq!(
        shape(&merged.calls),
        vec![
            Shape(1, 0, 10, 0, vec![Shape(2, 0, 10, 10, vec![])]),
            Shape(1, 20, 10, 0, vec![Shape(2, 20, 10, 10, vec![])]),
        ]
    );
}

#[test]
fn test_time_zero_opens_a_call() {
    // Calls before zero merge normally; the first call at or after zero
    // always opens a new one
    let merged = merge_calls(vec![flat(1, -20), flat(1, -10), flat(1, 0), flat(1, 10)], &[], SAMPLING_INTERVAL_US);
    assert_eq!(shape(&merged.calls), vec![Shape(1, -20, 10, 10, vec![]), Shape(1, 0, 10, 10, vec![])]);
}

#[test]
fn test_call_shorter_than_children_is_dropped() {
    let mut parent = flat(1, 0);
    let mut child = flat(2, 0);
    child.dur = 10;
    parent.children.push(child);

    let merged = merge_calls(vec![parent, flat(3, 50)], &[], SAMPLING_INTERVAL_US);

    assert_eq!(shape(&merged.calls), vec![Shape(3, 50, 0, 0, vec![])]);
    assert_eq!(merged.dur, 0);
}

#[test]
fn test_custom_sampling_interval() {
    let merged = merge_calls(vec![flat(1, 0), flat(1, 50)], &[], 50);
    assert_eq!(merged.calls.len(), 2);

    let merged = merge_calls(vec![flat(1, 0), flat(1, 50)], &[], 51);
    assert_eq!(shape(&merged.calls), vec![Shape(1, 0, 50, 50, vec![])]);
}
