//! Core types for collaborator opinions.

use axioms::{AxiomId, VoteCategory};
use serde::{Deserialize, Serialize};

use crate::backend::LlmError;

/// What a collaborator is told about the node it speaks for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeBrief {
    /// Node identifier (e.g. "MNEMOSYNE")
    pub node: String,
    /// The node's philosophy string
    pub philosophy: String,
    /// Primary axiom id
    pub primary_axiom: AxiomId,
    /// Human-readable name of the primary axiom
    pub primary_axiom_name: String,
    /// Supporting axioms, id and name
    pub supporting: Vec<(AxiomId, String)>,
    /// Phrases that make this node veto unconditionally
    pub veto_phrases: Vec<String>,
    /// The vote the node's local heuristic already reached
    pub heuristic_vote: Option<VoteCategory>,
}

impl NodeBrief {
    pub fn new(
        node: impl Into<String>,
        philosophy: impl Into<String>,
        primary_axiom: AxiomId,
        primary_axiom_name: impl Into<String>,
    ) -> Self {
        Self {
            node: node.into(),
            philosophy: philosophy.into(),
            primary_axiom,
            primary_axiom_name: primary_axiom_name.into(),
            supporting: Vec::new(),
            veto_phrases: Vec::new(),
            heuristic_vote: None,
        }
    }

    pub fn with_supporting(mut self, id: AxiomId, name: impl Into<String>) -> Self {
        self.supporting.push((id, name.into()));
        self
    }

    pub fn with_veto_phrases<I, S>(mut self, phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.veto_phrases = phrases.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_heuristic_vote(mut self, vote: VoteCategory) -> Self {
        self.heuristic_vote = Some(vote);
        self
    }
}

/// An outside opinion on one action, on behalf of one node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Opinion {
    /// Category the collaborator would vote
    pub category: VoteCategory,
    /// Free-text rationale
    pub rationale: String,
    /// Which provider produced it
    pub provider: String,
}

/// Errors from opinion providers.
#[derive(Debug, thiserror::Error)]
pub enum OpinionError {
    #[error("Backend error: {0}")]
    Backend(#[from] LlmError),

    #[error("Malformed opinion: {0}")]
    Malformed(String),

    #[error("Provider {provider} timed out after {timeout_ms}ms")]
    Timeout { provider: String, timeout_ms: u64 },
}

pub type Result<T> = std::result::Result<T, OpinionError>;
