//! Core types for the deliberation engine.

use axioms::{AxiomId, Governance, HardBlock, SignalSet, VoteCategory};
use serde::{Deserialize, Serialize};

/// Errors that can occur in the parliament crate.
#[derive(Debug, thiserror::Error)]
pub enum ParliamentError {
    #[error("Rule table error: {0}")]
    Table(#[from] axioms::TableError),

    #[error("Store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Federation error: {0}")]
    Federation(String),
}

pub type Result<T> = std::result::Result<T, ParliamentError>;

/// Note left on a vote by an outside collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CounselNote {
    /// Category the collaborator would have cast
    pub category: VoteCategory,
    /// Provider that answered
    pub provider: String,
}

/// One node's vote on one action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeVote {
    /// Node identifier
    pub node: String,
    /// The node's primary axiom
    pub primary_axiom: AxiomId,
    /// Signed score in [-20, 20]
    pub score: i32,
    /// Categorical vote
    pub category: VoteCategory,
    /// Why the node voted this way
    pub rationale: String,
    /// Whether a veto trigger fired
    pub veto: bool,
    /// Friction factor applied to the score, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub friction_factor: Option<f64>,
    /// Outside opinion attached to this vote, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub counsel: Option<CounselNote>,
}

/// Two axioms pulled apart by approving and rejecting nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TensionRecord {
    /// Canonical (sorted) axiom pair
    pub axioms: (AxiomId, AxiomId),
    /// Nodes speaking for the first axiom of the pair
    pub side_a: Vec<String>,
    /// Nodes speaking for the second axiom of the pair
    pub side_b: Vec<String>,
    /// Third-way synthesis, or a hold-open statement for unknown pairs
    pub synthesis: String,
    /// Whether the synthesis came from the fixed table
    pub known: bool,
}

impl TensionRecord {
    pub fn involves(&self, axiom: &AxiomId) -> bool {
        &self.axioms.0 == axiom || &self.axioms.1 == axiom
    }
}

/// Outcome of one deliberation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParliamentResult {
    /// The deliberated text
    pub action: String,
    /// Per-node votes; empty when the kernel blocked
    pub votes: Vec<NodeVote>,
    /// Signed approval balance in [-1, 1]
    pub approval_ratio: f64,
    /// Nodes that vetoed
    pub veto_nodes: Vec<String>,
    /// Axioms with detected signals, in registry order
    pub violated_axioms: Vec<AxiomId>,
    /// Evidence behind the violated axioms
    pub signals: SignalSet,
    /// Axiom pairs in tension
    pub tensions: Vec<TensionRecord>,
    /// Final verdict
    pub governance: Governance,
    /// Whether the call ran in analysis mode
    pub analysis_mode: bool,
    /// Kernel block, when one fired
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hard_block: Option<HardBlock>,
    /// Escalation trail, most decisive step first
    pub reasoning: Vec<String>,
}

impl ParliamentResult {
    /// Vote cast by a node, if the parliament sat.
    pub fn vote_of(&self, node: &str) -> Option<&NodeVote> {
        self.votes.iter().find(|v| v.node == node)
    }

    pub fn is_hard_blocked(&self) -> bool {
        self.hard_block.is_some()
    }

    pub fn violates(&self, axiom: &str) -> bool {
        self.violated_axioms.iter().any(|a| a.as_str() == axiom)
    }
}

/// Which layer produced a governance decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DecisionSource {
    Kernel,
    Parliament,
}

/// Result of the single-call `check_action` surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GovernanceResult {
    /// Whether the action may go ahead
    pub allowed: bool,
    /// Axioms with detected signals
    pub violated_axioms: Vec<AxiomId>,
    /// Verdict
    pub governance: Governance,
    /// Human-readable reasoning
    pub reasoning: String,
    /// Which layer decided
    pub source: DecisionSource,
}

impl From<&ParliamentResult> for GovernanceResult {
    fn from(result: &ParliamentResult) -> Self {
        let source = if result.hard_block.is_some() {
            DecisionSource::Kernel
        } else {
            DecisionSource::Parliament
        };

        Self {
            allowed: !result.governance.is_stopping(),
            violated_axioms: result.violated_axioms.clone(),
            governance: result.governance,
            reasoning: result.reasoning.join("; "),
            source,
        }
    }
}

/// Two opposing framings of one situation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dilemma {
    horn_1: String,
    horn_2: String,
    context: String,
    stakeholders: Vec<String>,
}

impl Dilemma {
    pub fn new(horn_1: impl Into<String>, horn_2: impl Into<String>) -> Self {
        Self {
            horn_1: horn_1.into(),
            horn_2: horn_2.into(),
            context: String::new(),
            stakeholders: Vec::new(),
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = context.into();
        self
    }

    pub fn with_stakeholders<I, S>(mut self, stakeholders: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.stakeholders = stakeholders.into_iter().map(Into::into).collect();
        self
    }

    pub fn horn_1(&self) -> &str {
        &self.horn_1
    }

    pub fn horn_2(&self) -> &str {
        &self.horn_2
    }

    pub fn context(&self) -> &str {
        &self.context
    }

    pub fn stakeholders(&self) -> &[String] {
        &self.stakeholders
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(governance: Governance) -> ParliamentResult {
        ParliamentResult {
            action: "x".into(),
            votes: Vec::new(),
            approval_ratio: 0.0,
            veto_nodes: Vec::new(),
            violated_axioms: vec![AxiomId::from("A8")],
            signals: SignalSet::new(),
            tensions: Vec::new(),
            governance,
            analysis_mode: false,
            hard_block: None,
            reasoning: vec!["first".into(), "second".into()],
        }
    }

    #[test]
    fn test_governance_result_from_parliament() {
        let g = GovernanceResult::from(&result(Governance::Review));
        assert!(g.allowed);
        assert_eq!(g.source, DecisionSource::Parliament);
        assert_eq!(g.reasoning, "first; second");

        let g = GovernanceResult::from(&result(Governance::Halt));
        assert!(!g.allowed);
    }

    #[test]
    fn test_hold_is_not_stopping() {
        assert!(GovernanceResult::from(&result(Governance::Hold)).allowed);
    }

    #[test]
    fn test_dilemma_accessors() {
        let d = Dilemma::new("go fast", "go fair")
            .with_context("release planning")
            .with_stakeholders(["users", "staff"]);
        assert_eq!(d.horn_1(), "go fast");
        assert_eq!(d.horn_2(), "go fair");
        assert_eq!(d.context(), "release planning");
        assert_eq!(d.stakeholders().len(), 2);
    }
}
