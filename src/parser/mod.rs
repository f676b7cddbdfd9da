//! Trace parsing and schema definitions.
//!
//! This module handles:
//! - Decoding raw JSON into trace events
//! - Decoding sampling profiler payloads
//! - Loading trace files

pub mod payload;
pub mod schema;
pub mod trace_file;

// Re-export main types
pub use payload::{ChainLink, ChunkCpuProfile, ProfileChunkData, ProfileHeadData};
pub use schema::{CallFrame, Micros, NodeId, Phase, Pid, ProfileId, Tid, TraceEvent};
pub use trace_file::{load_trace_file, parse_trace_events};
