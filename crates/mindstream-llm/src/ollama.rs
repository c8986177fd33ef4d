//! Ollama-compatible local provider
//!
//! Drives the /api/generate endpoint of a locally running inference server,
//! non-streaming: the caller blocks on the full continuation. The HTTP
//! client carries no request timeout, so a hung server hangs the caller.

use crate::engine::{CompletionEngine, GenerationError, GenerationResult};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:11434";

pub struct OllamaEngine {
    client: Client,
    base_url: String,
    model: String,
    temperature: Option<f32>,
}

impl OllamaEngine {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: model.into(),
            temperature: None,
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Serialize)]
struct GenerateOptions {
    num_predict: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

#[async_trait::async_trait]
impl CompletionEngine for OllamaEngine {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn complete(&self, prefix: &str, max_tokens: u32) -> GenerationResult<String> {
        let body = GenerateRequest {
            model: &self.model,
            prompt: prefix,
            stream: false,
            options: GenerateOptions {
                num_predict: max_tokens,
                temperature: self.temperature,
            },
        };

        debug!("generate request: model={} prefix_chars={}", self.model, prefix.chars().count());

        let response = self
            .client
            .post(format!("{}/api/generate", self.base_url))
            .json(&body)
            .send()
            .await?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("generate error {}: {}", status, error_text);

            if status.as_u16() == 404 {
                return Err(GenerationError::ModelMissing(format!(
                    "{}: {}",
                    self.model, error_text
                )));
            }
            return Err(GenerationError::RequestFailed(format!("{}: {}", status, error_text)));
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::InvalidResponse(e.to_string()))?;

        Ok(parsed.response)
    }
}
