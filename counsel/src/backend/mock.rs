//! Mock LLM backend for testing.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::time::Duration;

use super::traits::*;

/// Mock backend for testing.
///
/// Returns a canned response, optionally after a delay, and counts calls.
pub struct MockBackend {
    model_id: String,
    available: AtomicBool,
    response_content: String,
    delay: Option<Duration>,
    call_count: AtomicU32,
}

impl MockBackend {
    /// Create a new mock backend.
    pub fn new(model_id: impl Into<String>) -> Self {
        Self {
            model_id: model_id.into(),
            available: AtomicBool::new(true),
            response_content: r#"{"category": "ABSTAIN", "rationale": "Mock opinion"}"#.to_string(),
            delay: None,
            call_count: AtomicU32::new(0),
        }
    }

    /// Set the response content.
    pub fn with_response(mut self, content: impl Into<String>) -> Self {
        self.response_content = content.into();
        self
    }

    /// Set availability.
    pub fn with_available(self, available: bool) -> Self {
        self.available.store(available, Ordering::SeqCst);
        self
    }

    /// Delay every completion, to exercise caller timeouts.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Get the number of times complete was called.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::SeqCst)
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new("mock-model")
    }
}

#[async_trait]
impl LlmBackend for MockBackend {
    fn id(&self) -> &str {
        &self.model_id
    }

    async fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if !self.available.load(Ordering::SeqCst) {
            return Err(LlmError::Unavailable("Mock backend disabled".to_string()));
        }

        // Estimate token counts
        let prompt_tokens: u32 = request
            .messages
            .iter()
            .map(|m| m.content.len() as u32 / 4)
            .sum();

        Ok(CompletionResponse {
            content: self.response_content.clone(),
            usage: Usage {
                prompt_tokens,
                completion_tokens: self.response_content.len() as u32 / 4,
            },
        })
    }
}
