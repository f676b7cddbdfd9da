//! Merge boundaries from a thread's complete events.
//!
//! A set of nested and sequential tasks such as:
//!
//! ```text
//! |=========== Task A ===============|== Task E ==|
//!   |=== Task B ===|== Task D ==|
//!     |= Task C =|
//! ```
//!
//! ...becomes the ordered list of every start and end instant:
//!
//! ```text
//! X X X          X X            X    X            X
//! ```
//!
//! Samples are never coalesced across any of these instants.

use super::classifier::category;
use crate::parser::{Micros, TraceEvent};
use log::debug;
use std::collections::BTreeSet;

/// Collect the sorted, deduplicated boundary timestamps of a thread
///
/// **Public** - step 1 of the hierarchy build
///
/// Only events whose category is a boundary category contribute. Events
/// without a duration contribute a single zero-width boundary.
pub fn collect_boundaries(events: &[TraceEvent]) -> Vec<Micros> {
    let mut boundaries = BTreeSet::new();

    for event in events {
        if !category(&event.name).is_boundary() {
            continue;
        }
        boundaries.insert(event.ts);
        boundaries.insert(event.end());
    }

    debug!(
        "Collected {} boundaries from {} events",
        boundaries.len(),
        events.len()
    );

    boundaries.into_iter().collect()
}

/// First boundary strictly after `ts`, or `None` past the last one
pub fn next_boundary_after(boundaries: &[Micros], ts: Micros) -> Option<Micros> {
    let index = boundaries.partition_point(|&boundary| boundary <= ts);
    boundaries.get(index).copied()
}
