//! Ollama local-model gateway.
//!
//! Uses the non-streaming `/api/generate` endpoint of a local Ollama server.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use referag_core::{Llm, LlmError};

/// The default Ollama host.
const OLLAMA_HOST: &str = "http://localhost:11434";

/// An [`Llm`] backed by a local Ollama server.
///
/// # Example
///
/// ```rust,ignore
/// use referag_model::OllamaClient;
///
/// let llm = OllamaClient::new("http://localhost:11434", "llama3");
/// let text = llm.complete("", "Say hello").await?;
/// ```
pub struct OllamaClient {
    client: reqwest::Client,
    host: String,
    model: String,
}

impl OllamaClient {
    /// Create a new client for `host` and `model`.
    pub fn new(host: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            host: host.into().trim_end_matches('/').to_string(),
            model: model.into(),
        }
    }

    /// Create a client for the default local host.
    pub fn local(model: impl Into<String>) -> Self {
        Self::new(OLLAMA_HOST, model)
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    system: &'a str,
    stream: bool,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

#[async_trait]
impl Llm for OllamaClient {
    fn name(&self) -> &str {
        &self.model
    }

    async fn complete(&self, system: &str, prompt: &str) -> Result<String, LlmError> {
        let body =
            GenerateRequest { model: &self.model, prompt, system, stream: false };

        debug!(provider = "Ollama", model = %self.model, prompt_len = prompt.len(), "generate request");

        let response = self
            .client
            .post(format!("{}/api/generate", self.host))
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!(provider = "Ollama", error = %e, "request failed");
                LlmError::Transport { provider: "Ollama".into(), message: e.to_string() }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            error!(provider = "Ollama", %status, "API error");
            return Err(LlmError::Provider {
                provider: "Ollama".into(),
                message: format!("API returned {status}: {detail}"),
            });
        }

        let parsed: GenerateResponse = response.json().await.map_err(|e| LlmError::Provider {
            provider: "Ollama".into(),
            message: format!("failed to parse response: {e}"),
        })?;

        Ok(parsed.response)
    }
}
