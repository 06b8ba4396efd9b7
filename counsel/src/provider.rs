//! Opinion providers.
//!
//! An [`OpinionProvider`] answers one question: how would this node vote on
//! this action, and why. The LLM-backed provider asks a backend for a JSON
//! answer and validates it.

use std::sync::Arc;

use async_trait::async_trait;
use axioms::VoteCategory;
use serde::Deserialize;
use tracing::debug;

use crate::backend::{CompletionRequest, LlmBackend};
use crate::prompt;
use crate::types::{NodeBrief, Opinion, OpinionError, Result};

/// Source of outside opinions for parliament nodes.
#[async_trait]
pub trait OpinionProvider: Send + Sync {
    /// Provider identifier, recorded on every opinion it produces.
    fn id(&self) -> &str;

    /// Ask for an opinion on `action` from the point of view of `node`.
    async fn ask_opinion(&self, node: &NodeBrief, action: &str) -> Result<Opinion>;
}

/// Raw JSON answer from a collaborator.
#[derive(Debug, Deserialize)]
struct RawOpinion {
    category: String,
    #[serde(default)]
    rationale: String,
}

/// Opinion provider backed by an [`LlmBackend`].
pub struct LlmOpinionProvider {
    backend: Arc<dyn LlmBackend>,
    max_tokens: u32,
    temperature: f32,
}

impl LlmOpinionProvider {
    pub fn new(backend: Arc<dyn LlmBackend>) -> Self {
        Self {
            backend,
            max_tokens: 256,
            temperature: 0.2,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

#[async_trait]
impl OpinionProvider for LlmOpinionProvider {
    fn id(&self) -> &str {
        self.backend.id()
    }

    async fn ask_opinion(&self, node: &NodeBrief, action: &str) -> Result<Opinion> {
        let request = CompletionRequest::user(prompt::action_prompt(action))
            .with_system(prompt::system_prompt(node))
            .with_max_tokens(self.max_tokens)
            .with_temperature(self.temperature)
            .with_json_output();

        let response = self.backend.complete(request).await?;
        debug!(
            node = %node.node,
            provider = %self.backend.id(),
            tokens = response.usage.total(),
            "Collaborator answered"
        );

        let (category, rationale) = parse_opinion(&response.content)?;
        Ok(Opinion {
            category,
            rationale,
            provider: self.backend.id().to_string(),
        })
    }
}

/// Parse a collaborator answer into a category and rationale.
///
/// Tolerates prose or code fences around the JSON object. A `VETO` category
/// is refused; vetoes belong to the node's own trigger phrases.
pub fn parse_opinion(content: &str) -> Result<(VoteCategory, String)> {
    let start = content
        .find('{')
        .ok_or_else(|| OpinionError::Malformed("no JSON object in answer".to_string()))?;
    let end = content
        .rfind('}')
        .filter(|end| *end > start)
        .ok_or_else(|| OpinionError::Malformed("unterminated JSON object".to_string()))?;

    let raw: RawOpinion = serde_json::from_str(&content[start..=end])
        .map_err(|e| OpinionError::Malformed(e.to_string()))?;

    let category: VoteCategory = raw.category.parse().map_err(OpinionError::Malformed)?;
    if category == VoteCategory::Veto {
        return Err(OpinionError::Malformed(
            "collaborators may not cast a veto".to_string(),
        ));
    }

    Ok((category, raw.rationale.trim().to_string()))
}
