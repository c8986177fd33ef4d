//! Runtime configuration
//!
//! All tunable parameters in one place. Loaded from TOML at startup,
//! falls back to defaults if no config file exists.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MindstreamConfig {
    /// Model selection and generation limits.
    pub model: ModelConfig,
    /// Think-cycle pacing and the decision gate.
    pub cycle: CycleConfig,
    /// Session log location and diagnostic level.
    pub logging: LoggingConfig,
    /// Display loop cadence.
    pub display: DisplayConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Model name as known to the local inference server.
    pub name: String,
    /// Base URL of the local inference server.
    pub base_url: String,
    /// Max new tokens per continuation.
    pub max_generation_tokens: u32,
    /// Sampling temperature passed through to the server.
    pub temperature: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CycleConfig {
    /// Seconds between think cycles.
    pub poll_interval_secs: f64,
    /// Probability that a cycle's thought is surfaced to the display.
    pub communication_probability: f64,
    /// Character budget for the context tail fed to the model.
    pub max_context_chars: usize,
    /// Fixed seed for the decision gate. None = OS entropy.
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Directory for session JSONL files.
    pub dir: String,
    /// Diagnostic filter used when RUST_LOG is unset.
    pub level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Milliseconds between display repaints.
    pub refresh_ms: u64,
}

// ============================================================
// Defaults
// ============================================================

impl Default for MindstreamConfig {
    fn default() -> Self {
        Self {
            model: ModelConfig::default(),
            cycle: CycleConfig::default(),
            logging: LoggingConfig::default(),
            display: DisplayConfig::default(),
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: "phi3:mini".into(),
            base_url: "http://127.0.0.1:11434".into(),
            max_generation_tokens: 60,
            temperature: 0.9,
        }
    }
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 3.0,
            communication_probability: 0.05,
            max_context_chars: 4_000,
            seed: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            dir: "mindstream_logs".into(),
            level: "mindstream=info".into(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self { refresh_ms: 500 }
    }
}

// ============================================================
// Loading
// ============================================================

impl MindstreamConfig {
    /// Load config from a TOML file, falling back to defaults.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => {
                    tracing::info!("Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to parse {}: {} — using defaults", path.display(), e);
                    Self::default()
                }
            },
            Err(_) => {
                tracing::info!("No config at {} — using defaults", path.display());
                Self::default()
            }
        }
    }

    /// Write the current config as TOML (for generating a default config file).
    pub fn to_toml(&self) -> String {
        toml::to_string_pretty(self).unwrap_or_default()
    }
}
