//! OpenAI-compatible chat completion client.
//!
//! Talks to `/v1/chat/completions` directly with `reqwest`. Setting a custom
//! base URL makes this client work against any OpenAI-compatible gateway.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use referag_core::{Llm, LlmError};

/// The default OpenAI API base URL.
const OPENAI_API_BASE: &str = "https://api.openai.com/v1";

/// An [`Llm`] backed by the OpenAI chat completions API.
///
/// # Configuration
///
/// - `model` — e.g. `gpt-4o-mini`.
/// - `base_url` — override for OpenAI-compatible APIs.
/// - `api_key` — from the constructor or the `OPENAI_API_KEY` environment
///   variable via [`from_env`](OpenAiChat::from_env).
pub struct OpenAiChat {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    temperature: Option<f32>,
}

impl OpenAiChat {
    /// Create a new client with the given API key and model.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Result<Self, LlmError> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(LlmError::Config("API key must not be empty".into()));
        }
        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: OPENAI_API_BASE.to_string(),
            model: model.into(),
            temperature: None,
        })
    }

    /// Create a client using the `OPENAI_API_KEY` environment variable.
    pub fn from_env(model: impl Into<String>) -> Result<Self, LlmError> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| LlmError::Config("OPENAI_API_KEY environment variable not set".into()))?;
        Self::new(api_key, model)
    }

    /// Create a client for an OpenAI-compatible API at `base_url`.
    pub fn compatible(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
    ) -> Result<Self, LlmError> {
        let mut client = Self::new(api_key, model)?;
        client.base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(client)
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

// ── OpenAI API request/response types ──────────────────────────────

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

#[async_trait]
impl Llm for OpenAiChat {
    fn name(&self) -> &str {
        &self.model
    }

    async fn complete(&self, system: &str, prompt: &str) -> Result<String, LlmError> {
        let mut messages = Vec::with_capacity(2);
        if !system.is_empty() {
            messages.push(ChatMessage { role: "system", content: system });
        }
        messages.push(ChatMessage { role: "user", content: prompt });

        let body = ChatRequest { model: &self.model, messages, temperature: self.temperature };

        debug!(provider = "OpenAI", model = %self.model, prompt_len = prompt.len(), "chat completion request");

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!(provider = "OpenAI", error = %e, "request failed");
                LlmError::Transport { provider: "OpenAI".into(), message: e.to_string() }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            error!(provider = "OpenAI", %status, "API error");
            return Err(LlmError::Provider {
                provider: "OpenAI".into(),
                message: format!("API returned {status}: {detail}"),
            });
        }

        let parsed: ChatResponse = response.json().await.map_err(|e| LlmError::Provider {
            provider: "OpenAI".into(),
            message: format!("failed to parse response: {e}"),
        })?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| LlmError::Provider {
                provider: "OpenAI".into(),
                message: "response contained no choices".into(),
            })
    }
}
