//! Completion engine trait

use async_trait::async_trait;

/// Result type for generation operations
pub type GenerationResult<T> = Result<T, GenerationError>;

/// Generation error types
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("request failed: {0}")]
    RequestFailed(String),

    #[error("model not available: {0}")]
    ModelMissing(String),

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("network error: {0}")]
    NetworkError(#[from] reqwest::Error),
}

/// Opaque text-completion capability. Given a prefix, produce a short
/// continuation. Tokenization and inference are the implementation's
/// business; callers see only text in, text out.
#[async_trait]
pub trait CompletionEngine: Send + Sync {
    fn name(&self) -> &str;

    /// Complete `prefix` with at most `max_tokens` new tokens.
    async fn complete(&self, prefix: &str, max_tokens: u32) -> GenerationResult<String>;
}
