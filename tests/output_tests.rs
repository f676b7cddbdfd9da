use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::path::PathBuf;
use tempfile::tempdir;
use trace_samples::commands::{execute_analyze, validate_args, AnalyzeArgs};
use trace_samples::engine::SamplesEngine;
use trace_samples::output::{build_report, read_report, report_to_string, write_report, ReportOptions};
use trace_samples::parser::parse_trace_events;
use trace_samples::utils::config::REPORT_SCHEMA_VERSION;

fn trace() -> Value {
    json!({
        "traceEvents": [
            { "name": "Profile", "ph": "P", "pid": 1, "tid": 7, "ts": 0, "id": "0x1",
              "args": { "data": { "startTime": 0 } } },
            { "name": "RunTask", "ph": "X", "pid": 1, "tid": 7, "ts": 0, "dur": 100, "args": {} },
            { "name": "RunTask", "ph": "X", "pid": 1, "tid": 7, "ts": 200, "dur": 5, "args": {} },
            { "name": "ProfileChunk", "ph": "P", "pid": 1, "tid": 9, "ts": 10, "id": "0x1",
              "args": { "data": {
                  "cpuProfile": {
                      "nodes": [
                          { "id": 1, "callFrame": { "functionName": "main", "codeType": "JS" } },
                          { "id": 2, "parent": 1, "callFrame": {
                              "functionName": "work", "url": "https://example.com/app.js",
                              "lineNumber": 3, "codeType": "JS" } }
                      ],
                      "samples": [2, 2, 2]
                  },
                  "timeDeltas": [10, 10, 10]
              } } }
        ]
    })
}

fn finalized_engine() -> SamplesEngine {
    let mut engine = SamplesEngine::default();
    engine.reset();
    engine.initialize().unwrap();
    for event in parse_trace_events(&trace()).unwrap() {
        engine.handle_event(event).unwrap();
    }
    engine.finalize().unwrap();
    engine
}

fn options(long_task_threshold_us: Option<i64>) -> ReportOptions {
    ReportOptions {
        top: 10,
        min_self_percent: 0.0,
        long_task_threshold_us,
    }
}

#[test]
fn test_build_report() {
    let report = build_report("trace.json", &finalized_engine(), &options(Some(50))).unwrap();

    assert_eq!(report.version, REPORT_SCHEMA_VERSION);
    assert_eq!(report.trace, "trace.json");
    assert_eq!(report.threads.len(), 1);

    let thread = &report.threads[0];
    assert_eq!((thread.pid, thread.tid), (1, 7));
    assert_eq!(thread.profile_id, "0x1");
    assert_eq!(thread.node_count, 2);
    assert_eq!(thread.sample_count, 3);
    assert_eq!(thread.call_count, 1);
    assert_eq!(thread.total_dur_us, 20);

    let hot: Vec<(&str, f64, f64)> = thread
        .hot_functions
        .iter()
        .map(|f| (f.function_name.as_str(), f.self_dur_percent, f.dur_percent))
        .collect();
    assert_eq!(hot, vec![("work", 100.0, 100.0), ("main", 0.0, 100.0)]);
    assert_eq!(thread.hot_functions[0].label(), "work (https://example.com/app.js:3)");
    assert_eq!(thread.hot_functions[0].self_dur_us, 20);

    // Only the first task reaches the threshold
    assert_eq!(thread.long_tasks.len(), 1);
    assert_eq!(thread.long_tasks[0].ts, 0);
    assert_eq!(thread.long_tasks[0].dur_us, 100);
    assert_eq!(
        thread.long_tasks[0].hot_stacks,
        vec![
            vec!["work (https://example.com/app.js:3)".to_string(), "main".to_string()],
            vec!["main".to_string()],
        ]
    );
}

#[test]
fn test_build_report_limits_and_thresholds() {
    let report = build_report(
        "trace.json",
        &finalized_engine(),
        &ReportOptions {
            top: 1,
            min_self_percent: 50.0,
            long_task_threshold_us: None,
        },
    )
    .unwrap();

    let thread = &report.threads[0];
    assert_eq!(thread.hot_functions.len(), 1);
    assert_eq!(thread.hot_functions[0].function_name, "work");
    assert!(thread.long_tasks.is_empty());
}

#[test]
fn test_report_round_trips_through_file() {
    let report = build_report("trace.json", &finalized_engine(), &options(Some(50))).unwrap();
    let dir = tempdir().unwrap();
    let path = dir.path().join("out/report.json");

    write_report(&report, &path).unwrap();

    assert_eq!(read_report(&path).unwrap(), report);
    let written: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(written["threads"][0]["hot_functions"][0]["line_number"], json!(3));
    let from_string: Value = serde_json::from_str(&report_to_string(&report).unwrap()).unwrap();
    assert_eq!(from_string, written);
}

#[test]
fn test_write_report_rejects_directory() {
    let report = build_report("trace.json", &finalized_engine(), &options(None)).unwrap();
    let dir = tempdir().unwrap();
    assert!(write_report(&report, dir.path()).is_err());
}

#[test]
fn test_execute_analyze_end_to_end() {
    let dir = tempdir().unwrap();
    let trace_path = dir.path().join("trace.json");
    std::fs::write(&trace_path, trace().to_string()).unwrap();

    let args = AnalyzeArgs {
        trace: trace_path,
        output_json: dir.path().join("report.json"),
        long_task_ms: 0,
        ..Default::default()
    };
    validate_args(&args).unwrap();

    let report = execute_analyze(args.clone()).unwrap();

    assert!(args.output_json.exists());
    assert_eq!(read_report(&args.output_json).unwrap(), report);
    assert_eq!(report.threads[0].sample_count, 3);
    assert!(report.threads[0].long_tasks.is_empty());
}

#[test]
fn test_execute_analyze_missing_trace() {
    let dir = tempdir().unwrap();
    let args = AnalyzeArgs {
        trace: PathBuf::from("/definitely/not/here.json"),
        output_json: dir.path().join("report.json"),
        ..Default::default()
    };

    assert!(validate_args(&args).is_err());
    assert!(execute_analyze(args).is_err());
}
