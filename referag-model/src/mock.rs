//! Mock LLM for tests.

use std::sync::Mutex;

use async_trait::async_trait;

use referag_core::{Llm, LlmError};

/// A recorded call made against a [`MockLlm`].
#[derive(Debug, Clone)]
pub struct RecordedCall {
    /// The system prompt of the call.
    pub system: String,
    /// The user prompt of the call.
    pub prompt: String,
}

/// An [`Llm`] that replays scripted responses and records every call.
///
/// When the script runs out, the fallback response is returned instead of
/// failing, so tests that only care about call counts stay short.
///
/// # Example
///
/// ```rust,ignore
/// use referag_model::MockLlm;
///
/// let llm = MockLlm::with_responses(["first", "second"]);
/// assert_eq!(llm.complete("", "x").await?, "first");
/// assert_eq!(llm.calls().len(), 1);
/// ```
pub struct MockLlm {
    responses: Mutex<Vec<String>>,
    calls: Mutex<Vec<RecordedCall>>,
    fallback: String,
}

impl MockLlm {
    /// Create a mock that always answers with `fallback`.
    pub fn new(fallback: impl Into<String>) -> Self {
        Self {
            responses: Mutex::new(Vec::new()),
            calls: Mutex::new(Vec::new()),
            fallback: fallback.into(),
        }
    }

    /// Create a mock that replays `responses` in order, then the empty fallback.
    pub fn with_responses<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut queued: Vec<String> = responses.into_iter().map(Into::into).collect();
        queued.reverse();
        Self {
            responses: Mutex::new(queued),
            calls: Mutex::new(Vec::new()),
            fallback: String::new(),
        }
    }

    /// All calls made so far, in order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of calls made so far.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl Llm for MockLlm {
    fn name(&self) -> &str {
        "mock"
    }

    async fn complete(&self, system: &str, prompt: &str) -> Result<String, LlmError> {
        self.calls
            .lock()
            .unwrap()
            .push(RecordedCall { system: system.to_string(), prompt: prompt.to_string() });
        let next = self.responses.lock().unwrap().pop();
        Ok(next.unwrap_or_else(|| self.fallback.clone()))
    }
}
