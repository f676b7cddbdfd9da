//! Samples engine lifecycle.
//!
//! One engine instance processes one trace:
//!
//! ```text
//! reset() -> initialize() -> handle_event()* -> finalize() -> data()
//! ```
//!
//! Events are only stored while the engine is initialized. All derived
//! structures are built once, in `finalize()`.

use super::hierarchy::{build_processes, EventsByThread, SamplesProcess, SamplesThread};
use crate::parser::{Pid, ProfileId, Tid, TraceEvent};
use crate::utils::config::EngineConfig;
use crate::utils::error::EngineError;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Lifecycle state of a [`SamplesEngine`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HandlerState {
    #[default]
    Uninitialized,
    Initialized,
    Finalized,
}

/// Head and chunks of one sampling profile, as received
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawProfile {
    pub head: Option<TraceEvent>,
    pub chunks: Vec<TraceEvent>,
}

/// Snapshot returned by [`SamplesEngine::data`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SamplesData {
    pub profiles: BTreeMap<ProfileId, RawProfile>,
    pub processes: BTreeMap<Pid, SamplesProcess>,
}

/// Sampling-profile reconstruction engine for one trace
#[derive(Debug, Default)]
pub struct SamplesEngine {
    config: EngineConfig,
    state: HandlerState,
    events: EventsByThread,
    profiles: BTreeMap<ProfileId, RawProfile>,
    processes: BTreeMap<Pid, SamplesProcess>,
}

impl SamplesEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn state(&self) -> HandlerState {
        self.state
    }

    /// Drop all state and return to `Uninitialized`. Valid in any state.
    pub fn reset(&mut self) {
        self.events.clear();
        self.profiles.clear();
        self.processes.clear();
        self.state = HandlerState::Uninitialized;
    }

    /// # Errors
    /// * `EngineError::NotReset` - the engine is not `Uninitialized`
    pub fn initialize(&mut self) -> Result<(), EngineError> {
        if self.state != HandlerState::Uninitialized {
            return Err(EngineError::NotReset);
        }
        self.state = HandlerState::Initialized;
        Ok(())
    }

    /// Store one event for finalization
    ///
    /// `Profile` and `ProfileChunk` events are grouped by profile id;
    /// complete events are grouped by pid and tid. Anything else is ignored.
    ///
    /// # Errors
    /// * `EngineError::NotInitialized` - the engine is not `Initialized`
    pub fn handle_event(&mut self, event: TraceEvent) -> Result<(), EngineError> {
        if self.state != HandlerState::Initialized {
            return Err(EngineError::NotInitialized);
        }

        if event.is_profile() || event.is_profile_chunk() {
            let Some(id) = event.id.clone() else {
                warn!("Ignoring {} event without a profile id at {}", event.name, event.ts);
                return Ok(());
            };
            let profile = self.profiles.entry(id).or_default();
            if event.is_profile() {
                profile.head = Some(event);
            } else {
                profile.chunks.push(event);
            }
            return Ok(());
        }

        if event.is_complete() {
            self.events
                .entry(event.pid)
                .or_default()
                .entry(event.tid)
                .or_default()
                .push(event);
        }

        Ok(())
    }

    /// Build trees, samples and calls for every sampled thread
    ///
    /// # Errors
    /// * `EngineError::NotInitialized` - the engine is not `Initialized`
    pub fn finalize(&mut self) -> Result<(), EngineError> {
        if self.state != HandlerState::Initialized {
            return Err(EngineError::NotInitialized);
        }

        self.processes = build_processes(&mut self.profiles, &self.events, &self.config);
        self.state = HandlerState::Finalized;

        debug!(
            "Finalized {} profiles into {} processes",
            self.profiles.len(),
            self.processes.len()
        );

        Ok(())
    }

    /// Copies of the received profiles and the built processes
    ///
    /// # Errors
    /// * `EngineError::NotFinalized` - the engine is not `Finalized`
    pub fn data(&self) -> Result<SamplesData, EngineError> {
        let processes = self.processes()?;
        Ok(SamplesData {
            profiles: self.profiles.clone(),
            processes: processes.clone(),
        })
    }

    /// Borrow the built processes without copying them
    ///
    /// # Errors
    /// * `EngineError::NotFinalized` - the engine is not `Finalized`
    pub fn processes(&self) -> Result<&BTreeMap<Pid, SamplesProcess>, EngineError> {
        if self.state != HandlerState::Finalized {
            return Err(EngineError::NotFinalized);
        }
        Ok(&self.processes)
    }

    /// Borrow one built thread, `None` when it was not sampled
    ///
    /// # Errors
    /// * `EngineError::NotFinalized` - the engine is not `Finalized`
    pub fn thread(&self, pid: Pid, tid: Tid) -> Result<Option<&SamplesThread>, EngineError> {
        Ok(self
            .processes()?
            .get(&pid)
            .and_then(|process| process.threads.get(&tid)))
    }

    /// Complete events stored for a thread
    pub fn thread_events(&self, pid: Pid, tid: Tid) -> &[TraceEvent] {
        self.events
            .get(&pid)
            .and_then(|threads| threads.get(&tid))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Phase;

    fn event(name: &str, ph: Phase, id: Option<&str>) -> TraceEvent {
        TraceEvent {
            name: name.to_string(),
            cat: None,
            pid: 1,
            tid: 2,
            ts: 0,
            dur: None,
            ph,
            id: id.map(str::to_string),
            args: serde_json::Value::Null,
        }
    }

    #[test]
    fn test_lifecycle_order() {
        let mut engine = SamplesEngine::default();
        assert_eq!(engine.state(), HandlerState::Uninitialized);

        assert_eq!(
            engine.handle_event(event("RunTask", Phase::Complete, None)),
            Err(EngineError::NotInitialized)
        );
        assert_eq!(engine.finalize(), Err(EngineError::NotInitialized));
        assert_eq!(engine.data(), Err(EngineError::NotFinalized));

        engine.initialize().unwrap();
        assert_eq!(engine.initialize(), Err(EngineError::NotReset));
        assert_eq!(engine.data(), Err(EngineError::NotFinalized));

        engine.finalize().unwrap();
        assert_eq!(engine.state(), HandlerState::Finalized);
        assert_eq!(engine.finalize(), Err(EngineError::NotInitialized));
        assert_eq!(
            engine.handle_event(event("RunTask", Phase::Complete, None)),
            Err(EngineError::NotInitialized)
        );
        assert_eq!(engine.data().unwrap(), SamplesData::default());
    }

    #[test]
    fn test_routing() {
        let mut engine = SamplesEngine::default();
        engine.initialize().unwrap();

        engine.handle_event(event("Profile", Phase::Sample, Some("0x1"))).unwrap();
        engine.handle_event(event("ProfileChunk", Phase::Sample, Some("0x1"))).unwrap();
        engine.handle_event(event("ProfileChunk", Phase::Sample, Some("0x1"))).unwrap();
        engine.handle_event(event("ProfileChunk", Phase::Sample, None)).unwrap();
        engine.handle_event(event("RunTask", Phase::Complete, None)).unwrap();
        engine.handle_event(event("Marker", Phase::Instant, None)).unwrap();

        let profile = &engine.profiles["0x1"];
        assert!(profile.head.is_some());
        assert_eq!(profile.chunks.len(), 2);
        assert_eq!(engine.profiles.len(), 1);
        assert_eq!(engine.thread_events(1, 2).len(), 1);
    }

    #[test]
    fn test_reset_recovers() {
        let mut engine = SamplesEngine::default();
        engine.reset();
        engine.reset();
        engine.initialize().unwrap();
        engine.handle_event(event("RunTask", Phase::Complete, None)).unwrap();
        engine.finalize().unwrap();

        engine.reset();
        assert_eq!(engine.state(), HandlerState::Uninitialized);
        assert!(engine.thread_events(1, 2).is_empty());
        engine.initialize().unwrap();
    }
}
