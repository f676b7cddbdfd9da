//! The samples engine: event intake, lifecycle and finalize-time builds.

pub mod handler;
pub mod hierarchy;

pub use handler::{HandlerState, RawProfile, SamplesData, SamplesEngine};
pub use hierarchy::{build_processes, sort_trace_events, SamplesProcess, SamplesThread};
