//! Trace file loading.
//!
//! Accepts both layouts of the Chrome trace format: a bare JSON array of
//! events, or an object with a `traceEvents` array.

use super::schema::{Phase, TraceEvent};
use crate::utils::error::ParseError;
use log::{debug, warn};
use serde::Deserialize;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Parse trace events from raw trace JSON
///
/// **Public** - main entry point for parsing
///
/// Events that do not decode are logged and skipped. An unknown phase code
/// aborts the whole parse since every derived structure depends on phases
/// being routed correctly.
///
/// # Errors
/// * `ParseError::InvalidFormat` - not an array/object layout, or no event decoded
/// * `ParseError::UnknownPhase` - an event declares a phase outside the format
pub fn parse_trace_events(raw_trace: &serde_json::Value) -> Result<Vec<TraceEvent>, ParseError> {
    let raw_events = match raw_trace {
        serde_json::Value::Array(events) => events,
        serde_json::Value::Object(obj) => obj
            .get("traceEvents")
            .and_then(|events| events.as_array())
            .ok_or_else(|| ParseError::InvalidFormat("Object trace has no traceEvents array".to_string()))?,
        _ => {
            return Err(ParseError::InvalidFormat(
                "Trace must be a JSON object or array".to_string(),
            ))
        }
    };

    let mut events = Vec::with_capacity(raw_events.len());

    for (index, raw_event) in raw_events.iter().enumerate() {
        if let Some(code) = raw_event.get("ph").and_then(|ph| ph.as_str()) {
            Phase::from_code(code)?;
        }

        match TraceEvent::deserialize(raw_event) {
            Ok(event) => events.push(event),
            Err(e) => {
                // Log but don't fail - some events may be malformed
                warn!("Failed to parse trace event {}: {}", index, e);
            }
        }
    }

    if events.is_empty() && !raw_events.is_empty() {
        return Err(ParseError::InvalidFormat(
            "All trace events failed to parse".to_string(),
        ));
    }

    debug!("Parsed {} of {} trace events", events.len(), raw_events.len());

    Ok(events)
}

/// Load and parse a trace file from disk
///
/// # Errors
/// * `ParseError::ReadFailed` - the file cannot be opened
/// * `ParseError::JsonError` - the file is not JSON
/// * anything [`parse_trace_events`] returns
pub fn load_trace_file(path: impl AsRef<Path>) -> Result<Vec<TraceEvent>, ParseError> {
    let path = path.as_ref();
    debug!("Reading trace from: {}", path.display());

    let file = File::open(path)?;
    let raw_trace: serde_json::Value = serde_json::from_reader(BufReader::new(file))?;

    parse_trace_events(&raw_trace)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_array_layout() {
        let raw = json!([
            { "name": "RunTask", "ph": "X", "pid": 1, "tid": 1, "ts": 0, "dur": 10 }
        ]);
        let events = parse_trace_events(&raw).unwrap();
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn test_object_layout_skips_malformed() {
        let raw = json!({
            "traceEvents": [
                { "name": "RunTask", "ph": "X", "pid": 1, "tid": 1, "ts": 0, "dur": 10 },
                { "name": "Broken", "ph": "X", "ts": "soon" }
            ]
        });
        let events = parse_trace_events(&raw).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].name, "RunTask");
    }

    #[test]
    fn test_unknown_phase_fails_loudly() {
        let raw = json!([
            { "name": "RunTask", "ph": "X", "ts": 0 },
            { "name": "Mystery", "ph": "?", "ts": 0 }
        ]);
        assert!(matches!(
            parse_trace_events(&raw),
            Err(ParseError::UnknownPhase(_))
        ));
    }

    #[test]
    fn test_scalar_trace_rejected() {
        assert!(parse_trace_events(&json!(42)).is_err());
        assert!(parse_trace_events(&json!({ "events": [] })).is_err());
    }
}
