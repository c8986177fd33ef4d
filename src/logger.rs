//! Session logger
//!
//! The JSONL session file is the product of the experiment: one file per
//! run, named by start time, one line per record, flushed per call. A
//! write failure is fatal for the session and propagates to the worker.

use crate::emergence::EmergenceKind;
use crate::sensors::SensorReading;
use chrono::{Local, Utc};
use serde::Serialize;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

/// Current wall clock as unix seconds.
pub fn unix_now() -> f64 {
    Utc::now().timestamp_millis() as f64 / 1000.0
}

/// One thought, as written to the session file.
#[derive(Debug, Serialize)]
pub struct ThoughtRecord {
    pub timestamp: f64,
    pub thought_number: u64,
    pub thought: String,
    pub sensors: SensorReading,
    pub was_output: bool,
    pub thought_length: usize,
}

/// One detected emergence pattern, as written to the session file.
#[derive(Debug, Serialize)]
pub struct EmergenceRecord {
    pub timestamp: f64,
    #[serde(rename = "type")]
    pub record_type: &'static str,
    pub event_type: &'static str,
    pub description: String,
}

impl EmergenceRecord {
    pub fn new(kind: EmergenceKind, source: &str) -> Self {
        Self {
            timestamp: unix_now(),
            record_type: "emergence",
            event_type: kind.tag(),
            description: source.to_string(),
        }
    }
}

pub struct SessionLogger {
    file: File,
    path: PathBuf,
    session_id: String,
    thoughts: u64,
    surfaced: u64,
    emergences: u64,
}

impl SessionLogger {
    /// Create the session file under `dir`, named by start time.
    pub fn open(dir: &Path) -> std::io::Result<Self> {
        fs::create_dir_all(dir)?;
        let session_id = format!(
            "mindstream_session_{}",
            Local::now().format("%Y%m%d_%H%M%S")
        );
        let path = dir.join(format!("{session_id}.jsonl"));
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        info!("session log at {}", path.display());
        Ok(Self {
            file,
            path,
            session_id,
            thoughts: 0,
            surfaced: 0,
            emergences: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Append one thought line and flush.
    pub fn log_thought(&mut self, record: &ThoughtRecord) -> std::io::Result<()> {
        self.write_line(record)?;
        self.thoughts += 1;
        if record.was_output {
            self.surfaced += 1;
        }
        Ok(())
    }

    /// Append one emergence line and flush.
    pub fn log_emergence(&mut self, record: &EmergenceRecord) -> std::io::Result<()> {
        self.write_line(record)?;
        self.emergences += 1;
        Ok(())
    }

    fn write_line<T: Serialize>(&mut self, record: &T) -> std::io::Result<()> {
        let mut line = serde_json::to_string(record)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        line.push('\n');
        self.file.write_all(line.as_bytes())?;
        self.file.flush()
    }

    pub fn thought_count(&self) -> u64 {
        self.thoughts
    }

    pub fn surfaced_count(&self) -> u64 {
        self.surfaced
    }

    pub fn emergence_count(&self) -> u64 {
        self.emergences
    }
}
