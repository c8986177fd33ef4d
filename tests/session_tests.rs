//! Integration tests for the mindstream loop
//!
//! These tests validate the public surface of the session loop:
//! - Worker cycles end-to-end against stub completion engines
//! - Gate behavior at the probability extremes
//! - Session log shape after N cycles
//! - Mailbox hand-off ordering to the display side
//! - Config loading and defaults

use async_trait::async_trait;
use mindstream::config::MindstreamConfig;
use mindstream::logger::SessionLogger;
use mindstream::sensors::SensorArray;
use mindstream::session::{CycleOutcome, DisplayState, Worker};
use mindstream_llm::{CompletionEngine, GenerationError, GenerationResult};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use tempfile::TempDir;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

// ============================================================
// Stub engines
// ============================================================

/// Returns the same continuation every cycle.
struct FixedEngine(&'static str);

#[async_trait]
impl CompletionEngine for FixedEngine {
    fn name(&self) -> &str {
        "fixed"
    }
    async fn complete(&self, _prefix: &str, _max_tokens: u32) -> GenerationResult<String> {
        Ok(self.0.to_string())
    }
}

/// Fails on exactly one call (1-based), succeeds otherwise.
struct FlakyEngine {
    calls: AtomicU32,
    fail_on: u32,
}

#[async_trait]
impl CompletionEngine for FlakyEngine {
    fn name(&self) -> &str {
        "flaky"
    }
    async fn complete(&self, _prefix: &str, _max_tokens: u32) -> GenerationResult<String> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if call == self.fail_on {
            Err(GenerationError::RequestFailed("stub failure".into()))
        } else {
            Ok(format!("thought from call {}", call))
        }
    }
}

/// Records the prefix it was handed, then echoes a marker.
struct PrefixCapture {
    seen: std::sync::Mutex<Vec<String>>,
}

#[async_trait]
impl CompletionEngine for PrefixCapture {
    fn name(&self) -> &str {
        "capture"
    }
    async fn complete(&self, prefix: &str, _max_tokens: u32) -> GenerationResult<String> {
        self.seen.lock().unwrap().push(prefix.to_string());
        Ok("noted".to_string())
    }
}

// ============================================================
// Helpers
// ============================================================

fn test_config(probability: f64) -> MindstreamConfig {
    let mut config = MindstreamConfig::default();
    config.cycle.communication_probability = probability;
    config.cycle.seed = Some(42);
    config.cycle.poll_interval_secs = 0.01;
    config
}

struct Rig {
    worker: Worker,
    state_rx: watch::Receiver<DisplayState>,
    log_path: PathBuf,
    _tmp: TempDir,
}

fn build_rig(engine: Arc<dyn CompletionEngine>, probability: f64) -> Rig {
    let tmp = TempDir::new().unwrap();
    let logger = SessionLogger::open(tmp.path()).unwrap();
    let log_path = logger.path().to_path_buf();
    let (state_tx, state_rx) = watch::channel(DisplayState::default());
    let worker = Worker::new(
        engine,
        SensorArray::new(),
        logger,
        &test_config(probability),
        state_tx,
    );
    Rig {
        worker,
        state_rx,
        log_path,
        _tmp: tmp,
    }
}

fn read_lines(path: &std::path::Path) -> Vec<serde_json::Value> {
    std::fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

fn thought_lines(lines: &[serde_json::Value]) -> Vec<&serde_json::Value> {
    lines.iter().filter(|v| v.get("thought_number").is_some()).collect()
}

fn emergence_lines(lines: &[serde_json::Value]) -> Vec<&serde_json::Value> {
    lines.iter().filter(|v| v.get("type").is_some()).collect()
}

// ============================================================
// End-to-end: always surface
// ============================================================

#[tokio::test]
async fn five_cycles_at_probability_one_all_surface_in_order() {
    let mut rig = build_rig(Arc::new(FixedEngine("hello")), 1.0);

    for expected in 1..=5u64 {
        let outcome = rig.worker.run_cycle().await.unwrap();
        assert_eq!(outcome, CycleOutcome::Surfaced);
        // Mailbox hands each surfaced thought over, in order
        let state = rig.state_rx.borrow().clone();
        let latest = state.latest.expect("surfaced thought in mailbox");
        assert_eq!(latest.number, expected);
        assert_eq!(latest.text, "hello");
    }

    let lines = read_lines(&rig.log_path);
    let thoughts = thought_lines(&lines);
    assert_eq!(thoughts.len(), 5);
    for (i, line) in thoughts.iter().enumerate() {
        assert_eq!(line["was_output"], true);
        assert_eq!(line["thought"], "hello");
        assert_eq!(line["thought_number"], (i + 1) as u64);
        assert!(line["sensors"].is_object());
        assert_eq!(line["thought_length"], 5);
    }
}

// ============================================================
// End-to-end: never surface
// ============================================================

#[tokio::test]
async fn five_cycles_at_probability_zero_none_surface() {
    let mut rig = build_rig(Arc::new(FixedEngine("hello")), 0.0);

    for _ in 0..5 {
        let outcome = rig.worker.run_cycle().await.unwrap();
        assert_eq!(outcome, CycleOutcome::Kept);
    }

    let lines = read_lines(&rig.log_path);
    let thoughts = thought_lines(&lines);
    assert_eq!(thoughts.len(), 5);
    assert!(thoughts.iter().all(|line| line["was_output"] == false));
    assert!(emergence_lines(&lines).is_empty());

    let state = rig.state_rx.borrow().clone();
    assert!(state.latest.is_none(), "nothing should reach the mailbox");
    assert_eq!(state.thoughts, 5);
    assert_eq!(state.surfaced, 0);
}

// ============================================================
// End-to-end: completion failure mid-run
// ============================================================

#[tokio::test]
async fn completion_failure_skips_the_cycle_and_continues() {
    let mut rig = build_rig(
        Arc::new(FlakyEngine {
            calls: AtomicU32::new(0),
            fail_on: 3,
        }),
        0.0,
    );

    let mut outcomes = Vec::new();
    for _ in 0..5 {
        outcomes.push(rig.worker.run_cycle().await.unwrap());
    }

    assert_eq!(outcomes[2], CycleOutcome::NoThought);
    assert_eq!(
        outcomes.iter().filter(|o| **o == CycleOutcome::Kept).count(),
        4
    );

    // Cycles 1, 2, 4, 5 logged; numbering stays monotonic with no gap
    let lines = read_lines(&rig.log_path);
    let thoughts = thought_lines(&lines);
    assert_eq!(thoughts.len(), 4);
    let numbers: Vec<u64> = thoughts
        .iter()
        .map(|line| line["thought_number"].as_u64().unwrap())
        .collect();
    assert_eq!(numbers, vec![1, 2, 3, 4]);
}

// ============================================================
// End-to-end: emergence records on surfaced thoughts
// ============================================================

#[tokio::test]
async fn surfaced_self_referential_thought_logs_emergence() {
    let mut rig = build_rig(
        Arc::new(FixedEngine("I wonder if I am aware of this moment?")),
        1.0,
    );
    rig.worker.run_cycle().await.unwrap();

    let lines = read_lines(&rig.log_path);
    assert_eq!(thought_lines(&lines).len(), 1);

    let events = emergence_lines(&lines);
    let kinds: Vec<&str> = events
        .iter()
        .map(|line| line["event_type"].as_str().unwrap())
        .collect();
    assert!(kinds.contains(&"self_reference"), "kinds were {:?}", kinds);
    assert!(kinds.contains(&"consciousness_questioning"));
    assert!(kinds.contains(&"temporal_self_awareness"));
    for event in &events {
        assert_eq!(event["type"], "emergence");
        assert_eq!(
            event["description"],
            "I wonder if I am aware of this moment?"
        );
    }
}

#[tokio::test]
async fn kept_thoughts_are_not_scanned_for_emergence() {
    let mut rig = build_rig(
        Arc::new(FixedEngine("I wonder if I am aware of this moment?")),
        0.0,
    );
    rig.worker.run_cycle().await.unwrap();

    let lines = read_lines(&rig.log_path);
    assert_eq!(thought_lines(&lines).len(), 1);
    assert!(emergence_lines(&lines).is_empty());
}

// ============================================================
// Context hand-off to the engine
// ============================================================

#[tokio::test]
async fn engine_receives_bounded_context_tail() {
    let capture = Arc::new(PrefixCapture {
        seen: std::sync::Mutex::new(Vec::new()),
    });
    let tmp = TempDir::new().unwrap();
    let logger = SessionLogger::open(tmp.path()).unwrap();
    let (state_tx, _state_rx) = watch::channel(DisplayState::default());
    let mut config = test_config(0.0);
    config.cycle.max_context_chars = 120;
    let mut worker = Worker::new(
        capture.clone(),
        SensorArray::new(),
        logger,
        &config,
        state_tx,
    );

    for _ in 0..10 {
        worker.run_cycle().await.unwrap();
    }

    let seen = capture.seen.lock().unwrap();
    assert_eq!(seen.len(), 10);
    for prefix in seen.iter() {
        assert!(
            prefix.chars().count() <= 120,
            "prefix exceeded budget: {} chars",
            prefix.chars().count()
        );
    }
    // Later prefixes carry the most recent appends
    assert!(seen.last().unwrap().contains("noted"));
}

// ============================================================
// Graceful stop via cancellation
// ============================================================

#[tokio::test]
async fn cancellation_finishes_in_flight_cycle_and_reports_summary() {
    let tmp = TempDir::new().unwrap();
    let logger = SessionLogger::open(tmp.path()).unwrap();
    let log_path = logger.path().to_path_buf();
    let (state_tx, _state_rx) = watch::channel(DisplayState::default());
    let worker = Worker::new(
        Arc::new(FixedEngine("hello")),
        SensorArray::new(),
        logger,
        &test_config(1.0),
        state_tx,
    );

    let token = CancellationToken::new();
    let handle = tokio::spawn(worker.run(token.clone()));

    tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    token.cancel();
    let summary = handle.await.unwrap().unwrap();

    assert!(summary.thoughts >= 1, "at least one cycle should complete");
    assert_eq!(summary.surfaced, summary.thoughts);
    assert_eq!(summary.log_path, log_path);

    // Every logged cycle made it to disk before the stop
    let lines = read_lines(&log_path);
    assert_eq!(thought_lines(&lines).len() as u64, summary.thoughts);
}

// ============================================================
// Config
// ============================================================

#[test]
fn config_defaults_match_the_recognized_options() {
    let config = MindstreamConfig::default();
    assert!((config.cycle.communication_probability - 0.05).abs() < f64::EPSILON);
    assert!((config.cycle.poll_interval_secs - 3.0).abs() < f64::EPSILON);
    assert_eq!(config.cycle.max_context_chars, 4_000);
    assert!(config.cycle.seed.is_none());
    assert_eq!(config.model.max_generation_tokens, 60);
    assert_eq!(config.display.refresh_ms, 500);
}

#[test]
fn config_roundtrips_through_toml() {
    let config = MindstreamConfig::default();
    let toml_str = config.to_toml();
    assert!(toml_str.contains("communication_probability"));
    assert!(toml_str.contains("max_context_chars"));

    let parsed: MindstreamConfig = toml::from_str(&toml_str).unwrap();
    assert!((parsed.cycle.communication_probability - 0.05).abs() < f64::EPSILON);
    assert_eq!(parsed.model.name, config.model.name);
}

#[test]
fn config_partial_toml_fills_defaults() {
    let partial = r#"
[cycle]
communication_probability = 0.5

[model]
name = "qwen2:0.5b"
"#;
    let config: MindstreamConfig = toml::from_str(partial).unwrap();
    assert!((config.cycle.communication_probability - 0.5).abs() < f64::EPSILON);
    assert_eq!(config.model.name, "qwen2:0.5b");
    // Unspecified fields get defaults
    assert!((config.cycle.poll_interval_secs - 3.0).abs() < f64::EPSILON);
    assert_eq!(config.display.refresh_ms, 500);
}

#[test]
fn config_load_missing_file_returns_defaults() {
    let config = MindstreamConfig::load(std::path::Path::new("/nonexistent/mindstream.toml"));
    assert!((config.cycle.communication_probability - 0.05).abs() < f64::EPSILON);
}

#[test]
fn config_load_corrupt_file_returns_defaults() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("bad.toml");
    std::fs::write(&path, "this is not [[[ valid toml!!!").unwrap();
    let config = MindstreamConfig::load(&path);
    assert_eq!(config.model.max_generation_tokens, 60);
}
