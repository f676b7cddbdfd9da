//! trace-samples
//!
//! Sampling-profile reconstruction for Chrome trace events.
//!
//! The engine consumes a stream of trace events, groups the `Profile` and
//! `ProfileChunk` events by profile id, and on finalize rebuilds per thread:
//! the stack-trace tree, the ordered samples, and the merged calls with
//! their durations. Queries rank hot functions over a time window.
//!
//! ```ignore
//! use trace_samples::{SamplesEngine, EngineConfig};
//!
//! let mut engine = SamplesEngine::new(EngineConfig::default());
//! engine.reset();
//! engine.initialize()?;
//! for event in trace_samples::parser::load_trace_file("trace.json")? {
//!     engine.handle_event(event)?;
//! }
//! engine.finalize()?;
//! ```

pub mod aggregator;
pub mod commands;
pub mod engine;
pub mod output;
pub mod parser;
pub mod utils;

pub use aggregator::{
    hot_functions, hot_stack_traces, merge_calls, stack_trace_from_id, FunctionSummary, ProfileCall,
    ProfileNode, ProfileSample, ProfileTree,
};
pub use engine::{HandlerState, SamplesData, SamplesEngine, SamplesProcess, SamplesThread};
pub use parser::{CallFrame, TraceEvent};
pub use utils::{EngineConfig, EngineError, FilterOptions, ParseError};
