//! Sampling profiler payloads carried in `args.data`.
//!
//! A `Profile` head declares the capture's start time. Each `ProfileChunk`
//! carries a fragment of the stack-trace tree as bottom-up chain links plus
//! a run of samples whose timestamps are cumulative deltas.

use super::schema::{deserialize_micros, deserialize_optional_micros_list, CallFrame, Micros, NodeId, TraceEvent};
use crate::utils::error::ParseError;
use serde::{Deserialize, Serialize};

/// Payload of a `Profile` head event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileHeadData {
    /// Absolute start time the first chunk's deltas are relative to
    #[serde(deserialize_with = "deserialize_micros")]
    pub start_time: Micros,
}

/// Payload of a `ProfileChunk` event
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileChunkData {
    #[serde(default)]
    pub cpu_profile: Option<ChunkCpuProfile>,

    /// Signed cumulative deltas, parallel to `cpu_profile.samples`.
    /// Fractional deltas are rounded one by one.
    #[serde(default, deserialize_with = "deserialize_optional_micros_list")]
    pub time_deltas: Option<Vec<Micros>>,
}

/// Tree fragment and samples of one chunk
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChunkCpuProfile {
    #[serde(default)]
    pub nodes: Option<Vec<ChainLink>>,

    /// Topmost node id of each sample
    #[serde(default)]
    pub samples: Option<Vec<NodeId>>,
}

/// One link of a stack-trace chain: a node and the node that called it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainLink {
    pub id: NodeId,

    /// Absent for the bottommost frame of a stack trace
    #[serde(default)]
    pub parent: Option<NodeId>,

    pub call_frame: CallFrame,
}

impl ChainLink {
    pub fn new(id: NodeId, parent: Option<NodeId>, call_frame: CallFrame) -> Self {
        Self { id, parent, call_frame }
    }
}

impl ProfileHeadData {
    /// Decode the payload of a `Profile` head
    ///
    /// # Errors
    /// * `ParseError::MissingField` - the event has no `args.data`
    /// * `ParseError::JsonError` - `args.data` has no usable `startTime`
    pub fn decode(event: &TraceEvent) -> Result<Self, ParseError> {
        let data = payload(event)?;
        Ok(Self::deserialize(data)?)
    }
}

impl ProfileChunkData {
    /// Decode the payload of a `ProfileChunk`
    ///
    /// # Errors
    /// * `ParseError::MissingField` - the event has no `args.data`
    /// * `ParseError::JsonError` - `args.data` does not match the chunk shape
    pub fn decode(event: &TraceEvent) -> Result<Self, ParseError> {
        let data = payload(event)?;
        Ok(Self::deserialize(data)?)
    }

    /// Chain links of this chunk, empty when absent
    pub fn links(&self) -> &[ChainLink] {
        self.cpu_profile
            .as_ref()
            .and_then(|profile| profile.nodes.as_deref())
            .unwrap_or(&[])
    }
}

fn payload(event: &TraceEvent) -> Result<&serde_json::Value, ParseError> {
    event
        .args
        .get("data")
        .ok_or_else(|| ParseError::MissingField(format!("args.data of {} event", event.name)))
}
