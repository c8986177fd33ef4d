//! Mindstream — an experiential sense→think→decide→log loop
//!
//! Architecture:
//! - Sensor array: polls machine/environment metrics, fails soft per metric
//! - Context stream: append-only text buffer, bounded tail fed to the model
//! - Completion engine: opaque local-model capability (mindstream-llm)
//! - Decision gate: one uniform draw per cycle against a fixed probability
//! - Session logger: append-only JSONL file, one flushed line per record
//! - Display loop: independent cadence, fed through a one-slot mailbox
//!
//! The worker owns all mutable session state. The display loop shares
//! nothing with it beyond a watch channel that keeps only the latest
//! snapshot: a slow display drops intermediates and never blocks thinking.

pub mod config;
pub mod display;
pub mod emergence;
pub mod gate;
pub mod logger;
pub mod sensors;
pub mod session;
pub mod shutdown;
pub mod stream;
