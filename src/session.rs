//! Worker loop
//!
//! The orchestrator: one strictly sequential sense→think→decide→log cycle
//! per interval. The completion call is the only slow step and is awaited
//! in place; the loop blocks on it by design. Cancellation is honored
//! between cycles, never inside one: the in-flight cycle always finishes.

use crate::config::MindstreamConfig;
use crate::emergence;
use crate::gate::DecisionGate;
use crate::logger::{unix_now, EmergenceRecord, SessionLogger, ThoughtRecord};
use crate::sensors::SensorArray;
use crate::stream::ThoughtStream;
use mindstream_llm::CompletionEngine;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// A thought the gate selected for display.
#[derive(Debug, Clone)]
pub struct SurfacedThought {
    pub number: u64,
    pub text: String,
    pub at: f64,
}

/// Snapshot published to the display loop after every cycle. The watch
/// channel keeps only the latest one: a slow display drops intermediates
/// and never blocks the worker.
#[derive(Debug, Clone, Default)]
pub struct DisplayState {
    pub thoughts: u64,
    pub surfaced: u64,
    pub emergences: u64,
    pub buffer_chars: usize,
    pub log_path: PathBuf,
    pub latest: Option<SurfacedThought>,
}

/// What one cycle did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Thought generated and logged, kept internal.
    Kept,
    /// Thought generated, logged, and handed to the display.
    Surfaced,
    /// Completion failed: no thought this cycle.
    NoThought,
}

/// Totals reported when the worker stops gracefully.
#[derive(Debug, Clone)]
pub struct SessionSummary {
    pub thoughts: u64,
    pub surfaced: u64,
    pub emergences: u64,
    pub log_path: PathBuf,
}

pub struct Worker {
    engine: Arc<dyn CompletionEngine>,
    sensors: SensorArray,
    stream: ThoughtStream,
    gate: DecisionGate,
    logger: SessionLogger,
    poll_interval: Duration,
    communication_probability: f64,
    max_context_chars: usize,
    max_generation_tokens: u32,
    state_tx: watch::Sender<DisplayState>,
    thought_number: u64,
    last_surfaced: Option<SurfacedThought>,
}

impl Worker {
    pub fn new(
        engine: Arc<dyn CompletionEngine>,
        sensors: SensorArray,
        logger: SessionLogger,
        config: &MindstreamConfig,
        state_tx: watch::Sender<DisplayState>,
    ) -> Self {
        Self {
            engine,
            sensors,
            stream: ThoughtStream::new(),
            gate: DecisionGate::from_optional_seed(config.cycle.seed),
            logger,
            poll_interval: Duration::from_secs_f64(config.cycle.poll_interval_secs.max(0.0)),
            communication_probability: config.cycle.communication_probability,
            max_context_chars: config.cycle.max_context_chars,
            max_generation_tokens: config.model.max_generation_tokens,
            state_tx,
            thought_number: 0,
            last_surfaced: None,
        }
    }

    /// One sense→think→decide→log cycle. Public so tests can step the loop
    /// deterministically.
    pub async fn run_cycle(&mut self) -> std::io::Result<CycleOutcome> {
        let reading = self.sensors.read();
        self.stream.append(&reading.summary());

        let prefix = self.stream.tail(self.max_context_chars).to_string();
        let thought = match self
            .engine
            .complete(&prefix, self.max_generation_tokens)
            .await
        {
            Ok(text) => text,
            Err(e) => {
                // No thought this cycle: skip the append and the log line,
                // carry on next interval.
                warn!("completion failed: {e}");
                self.publish();
                return Ok(CycleOutcome::NoThought);
            }
        };

        self.stream.append(&thought);
        self.thought_number += 1;

        let surfaced = self.gate.decide(self.communication_probability);
        let record = ThoughtRecord {
            timestamp: unix_now(),
            thought_number: self.thought_number,
            thought: thought.clone(),
            sensors: reading,
            was_output: surfaced,
            thought_length: thought.chars().count(),
        };
        self.logger.log_thought(&record)?;
        debug!(
            "thought {} logged ({} chars, surfaced={})",
            self.thought_number,
            record.thought_length,
            surfaced
        );

        if surfaced {
            for kind in emergence::scan(&thought) {
                self.logger
                    .log_emergence(&EmergenceRecord::new(kind, &thought))?;
            }
            self.last_surfaced = Some(SurfacedThought {
                number: self.thought_number,
                text: thought,
                at: record.timestamp,
            });
            self.publish();
            return Ok(CycleOutcome::Surfaced);
        }

        self.publish();
        Ok(CycleOutcome::Kept)
    }

    /// Drive cycles until cancelled. Returns the session totals, or the
    /// log-write error that ended the run early.
    pub async fn run(mut self, token: CancellationToken) -> std::io::Result<SessionSummary> {
        info!(
            "worker started: interval={:?} p={}",
            self.poll_interval, self.communication_probability
        );
        while !token.is_cancelled() {
            self.run_cycle().await?;
            tokio::select! {
                _ = tokio::time::sleep(self.poll_interval) => {}
                _ = token.cancelled() => break,
            }
        }
        info!("worker stopping after {} thoughts", self.logger.thought_count());
        Ok(self.summary())
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            thoughts: self.logger.thought_count(),
            surfaced: self.logger.surfaced_count(),
            emergences: self.logger.emergence_count(),
            log_path: self.logger.path().to_path_buf(),
        }
    }

    fn publish(&self) {
        // Receiver gone means the display already exited; nothing to do.
        let _ = self.state_tx.send(DisplayState {
            thoughts: self.logger.thought_count(),
            surfaced: self.logger.surfaced_count(),
            emergences: self.logger.emergence_count(),
            buffer_chars: self.stream.chars(),
            log_path: self.logger.path().to_path_buf(),
            latest: self.last_surfaced.clone(),
        });
    }
}
