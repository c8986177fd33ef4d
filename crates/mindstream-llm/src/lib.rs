//! Completion engine for mindstream
//!
//! The language model is an opaque text-completion capability: given a text
//! prefix, produce a short continuation. Everything else in the workspace
//! depends only on the `CompletionEngine` trait; the one concrete provider
//! talks to a locally running Ollama-compatible server.

pub mod engine;
pub mod ollama;

pub use engine::{CompletionEngine, GenerationError, GenerationResult};
pub use ollama::OllamaEngine;
