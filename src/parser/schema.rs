//! Trace-event input schema.
//!
//! Mirrors the Chrome Trace Event Format closely enough to route sampling
//! profiler records (`Profile`/`ProfileChunk`) and complete task events.
//! Timestamps and durations are integer microseconds.

use crate::utils::error::ParseError;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

/// Absolute or relative time in microseconds
///
/// Fractional JSON values are rounded to the nearest microsecond one field
/// at a time, so sub-microsecond spans can collapse: a task at 100.4 lasting
/// 0.2 becomes a zero-width task at 100.
pub type Micros = i64;

/// Profile node id, unique within one profile
pub type NodeId = u64;

/// Process id
pub type Pid = u64;

/// Thread id
pub type Tid = u64;

/// Id linking a `Profile` head to its `ProfileChunk`s
pub type ProfileId = String;

/// Event name of a sampling profile head
pub const PROFILE_EVENT: &str = "Profile";

/// Event name of a sampling profile payload fragment
pub const PROFILE_CHUNK_EVENT: &str = "ProfileChunk";

/// Trace event phase.
///
/// The set of codes is closed: [`Phase::from_code`] rejects anything else
/// instead of guessing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Phase {
    Begin,
    End,
    Complete,
    Instant,
    Counter,
    AsyncNestableStart,
    AsyncNestableInstant,
    AsyncNestableEnd,
    AsyncStepInto,
    AsyncBegin,
    AsyncEnd,
    AsyncStepPast,
    FlowStart,
    FlowStep,
    FlowEnd,
    Sample,
    ObjectCreated,
    ObjectSnapshot,
    ObjectDestroyed,
    Metadata,
    MemoryDumpGlobal,
    MemoryDumpProcess,
    Mark,
    ClockSync,
    ContextEnter,
    ContextLeave,
    LinkIds,
}

impl Phase {
    /// Decode a phase code
    ///
    /// # Errors
    /// * `ParseError::UnknownPhase` - the code is not part of the format
    pub fn from_code(code: &str) -> Result<Self, ParseError> {
        let phase = match code {
            "B" => Self::Begin,
            "E" => Self::End,
            "X" => Self::Complete,
            "i" | "I" => Self::Instant,
            "C" => Self::Counter,
            "b" => Self::AsyncNestableStart,
            "n" => Self::AsyncNestableInstant,
            "e" => Self::AsyncNestableEnd,
            "T" => Self::AsyncStepInto,
            "S" => Self::AsyncBegin,
            "F" => Self::AsyncEnd,
            "p" => Self::AsyncStepPast,
            "s" => Self::FlowStart,
            "t" => Self::FlowStep,
            "f" => Self::FlowEnd,
            "P" => Self::Sample,
            "N" => Self::ObjectCreated,
            "O" => Self::ObjectSnapshot,
            "D" => Self::ObjectDestroyed,
            "M" => Self::Metadata,
            "V" => Self::MemoryDumpGlobal,
            "v" => Self::MemoryDumpProcess,
            "R" => Self::Mark,
            "c" => Self::ClockSync,
            "(" => Self::ContextEnter,
            ")" => Self::ContextLeave,
            "=" => Self::LinkIds,
            other => return Err(ParseError::UnknownPhase(other.to_string())),
        };
        Ok(phase)
    }

    /// The single-character code of this phase
    pub fn code(self) -> &'static str {
        match self {
            Self::Begin => "B",
            Self::End => "E",
            Self::Complete => "X",
            Self::Instant => "i",
            Self::Counter => "C",
            Self::AsyncNestableStart => "b",
            Self::AsyncNestableInstant => "n",
            Self::AsyncNestableEnd => "e",
            Self::AsyncStepInto => "T",
            Self::AsyncBegin => "S",
            Self::AsyncEnd => "F",
            Self::AsyncStepPast => "p",
            Self::FlowStart => "s",
            Self::FlowStep => "t",
            Self::FlowEnd => "f",
            Self::Sample => "P",
            Self::ObjectCreated => "N",
            Self::ObjectSnapshot => "O",
            Self::ObjectDestroyed => "D",
            Self::Metadata => "M",
            Self::MemoryDumpGlobal => "V",
            Self::MemoryDumpProcess => "v",
            Self::Mark => "R",
            Self::ClockSync => "c",
            Self::ContextEnter => "(",
            Self::ContextLeave => ")",
            Self::LinkIds => "=",
        }
    }
}

impl TryFrom<String> for Phase {
    type Error = ParseError;

    fn try_from(code: String) -> Result<Self, Self::Error> {
        Self::from_code(&code)
    }
}

impl From<Phase> for String {
    fn from(phase: Phase) -> Self {
        phase.code().to_string()
    }
}

/// A single decoded trace event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceEvent {
    /// Event name (e.g. "RunTask", "ProfileChunk")
    pub name: String,

    /// Comma-separated trace categories
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cat: Option<String>,

    #[serde(default)]
    pub pid: Pid,

    #[serde(default)]
    pub tid: Tid,

    /// Start time in microseconds
    #[serde(deserialize_with = "deserialize_micros")]
    pub ts: Micros,

    /// Duration in microseconds (complete events only)
    #[serde(
        default,
        deserialize_with = "deserialize_optional_micros",
        skip_serializing_if = "Option::is_none"
    )]
    pub dur: Option<Micros>,

    pub ph: Phase,

    /// Profile id for `Profile`/`ProfileChunk` events
    #[serde(
        default,
        deserialize_with = "deserialize_optional_string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<ProfileId>,

    #[serde(default)]
    pub args: serde_json::Value,
}

impl TraceEvent {
    /// End timestamp, treating a missing duration as zero
    pub fn end(&self) -> Micros {
        self.ts + self.dur.unwrap_or(0)
    }

    pub fn is_complete(&self) -> bool {
        self.ph == Phase::Complete
    }

    pub fn is_profile(&self) -> bool {
        self.name == PROFILE_EVENT
    }

    pub fn is_profile_chunk(&self) -> bool {
        self.name == PROFILE_CHUNK_EVENT
    }
}

/// Identifying metadata for one stack level
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallFrame {
    #[serde(default)]
    pub function_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_number: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_number: Option<i64>,

    /// Script id, which V8 emits as either a string or a number
    #[serde(
        default,
        deserialize_with = "deserialize_optional_string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub script_id: Option<String>,

    /// "JS" for JavaScript frames, "other" for native ones
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_type: Option<String>,
}

impl CallFrame {
    pub fn new(function_name: impl Into<String>) -> Self {
        Self {
            function_name: function_name.into(),
            url: None,
            line_number: None,
            column_number: None,
            script_id: None,
            code_type: None,
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_code_type(mut self, code_type: impl Into<String>) -> Self {
        self.code_type = Some(code_type.into());
        self
    }

    pub fn with_line(mut self, line: i64) -> Self {
        self.line_number = Some(line);
        self
    }
}

/// Read a microsecond value that may be encoded as an integer or a float.
fn micros_from_value(value: &serde_json::Value) -> Option<Micros> {
    value
        .as_i64()
        .or_else(|| value.as_f64().map(|f| f.round() as Micros))
}

pub(crate) fn deserialize_micros<'de, D>(deserializer: D) -> Result<Micros, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    micros_from_value(&value)
        .ok_or_else(|| D::Error::custom(format!("expected a number of microseconds, found {}", value)))
}

fn deserialize_optional_micros<'de, D>(deserializer: D) -> Result<Option<Micros>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<serde_json::Value> = Option::deserialize(deserializer)?;
    match value {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(value) => micros_from_value(&value)
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("expected a number of microseconds, found {}", value))),
    }
}

/// Read an optional list of microsecond values, each an integer or a float.
pub(crate) fn deserialize_optional_micros_list<'de, D>(deserializer: D) -> Result<Option<Vec<Micros>>, D::Error>
where
    D: Deserializer<'de>,
{
    let values: Option<Vec<serde_json::Value>> = Option::deserialize(deserializer)?;
    values
        .map(|values| {
            values
                .iter()
                .map(|value| {
                    micros_from_value(value).ok_or_else(|| {
                        D::Error::custom(format!("expected a number of microseconds, found {}", value))
                    })
                })
                .collect()
        })
        .transpose()
}

/// Deserialize an optional field that can be either a string or number.
fn deserialize_optional_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<serde_json::Value> = Option::deserialize(deserializer)?;
    match value {
        Some(serde_json::Value::String(s)) => Ok(Some(s)),
        Some(serde_json::Value::Number(n)) => Ok(Some(n.to_string())),
        Some(serde_json::Value::Null) | None => Ok(None),
        Some(other) => Err(D::Error::custom(format!("expected string or number, found {}", other))),
    }
}
