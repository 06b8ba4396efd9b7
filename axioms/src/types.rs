//! Core types for the axiom layer.
//!
//! These types form the shared vocabulary of the deliberation engine:
//! axiom identifiers, the categorical vote scale and the governance verdict
//! ladder. Every other crate in the workspace speaks in these terms.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier of an axiom (e.g. `"A4"`).
///
/// Identifiers are never renumbered; new axioms are appended to the registry
/// under a fresh identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AxiomId(String);

impl AxiomId {
    /// Create an identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for AxiomId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for AxiomId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for AxiomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Well-known axiom identifiers referenced by escalation rules.
pub mod ids {
    /// Harm-signal axiom
    pub const NON_HARM: &str = "A1";
    /// Transparency-signal axiom
    pub const TRANSPARENCY: &str = "A2";
    pub const CONSENT: &str = "A3";
    /// Continuity-risk axiom
    pub const CONTINUITY: &str = "A4";
    pub const RELATIONAL: &str = "A5";
    /// Identity-risk axiom
    pub const IDENTITY: &str = "A6";
    pub const FAIRNESS: &str = "A7";
    pub const GOVERNANCE: &str = "A8";
    /// The paradox axiom consulted by the oracle
    pub const PARADOX: &str = "A9";
}

/// A named evaluative dimension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Axiom {
    /// Stable identifier
    pub id: AxiomId,
    /// Short human-readable name
    pub name: String,
    /// The principle the axiom protects
    pub statement: String,
    /// Registry version in which the axiom was published
    pub since_version: u32,
}

/// Categorical vote cast by a parliament node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VoteCategory {
    Approve,
    LeanApprove,
    Abstain,
    LeanReject,
    Reject,
    /// Absolute negative vote; overrides every other score
    Veto,
}

impl VoteCategory {
    /// Map a (non-veto) score onto a category.
    ///
    /// A score at or below the reject line is `Reject`; `Veto` is only ever
    /// produced by an explicit veto trigger.
    pub fn from_score(score: i32) -> Self {
        if score >= 7 {
            Self::Approve
        } else if score > 0 {
            Self::LeanApprove
        } else if score == 0 {
            Self::Abstain
        } else if score <= -7 {
            Self::Reject
        } else {
            Self::LeanReject
        }
    }

    /// Weight used by the approval ratio.
    pub fn weight(&self) -> f64 {
        match self {
            Self::Approve => 1.0,
            Self::LeanApprove => 0.5,
            Self::Abstain => 0.0,
            Self::LeanReject => -0.5,
            Self::Reject | Self::Veto => -1.0,
        }
    }

    /// Integer direction used when diffing two horns (+2 down to -3).
    pub fn direction(&self) -> i32 {
        match self {
            Self::Approve => 2,
            Self::LeanApprove => 1,
            Self::Abstain => 0,
            Self::LeanReject => -1,
            Self::Reject => -2,
            Self::Veto => -3,
        }
    }

    pub fn is_approving(&self) -> bool {
        matches!(self, Self::Approve | Self::LeanApprove)
    }

    pub fn is_rejecting(&self) -> bool {
        matches!(self, Self::LeanReject | Self::Reject | Self::Veto)
    }

    /// Get string representation for prompts and logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Approve => "APPROVE",
            Self::LeanApprove => "LEAN_APPROVE",
            Self::Abstain => "ABSTAIN",
            Self::LeanReject => "LEAN_REJECT",
            Self::Reject => "REJECT",
            Self::Veto => "VETO",
        }
    }

    /// All categories from most to least approving.
    pub fn all() -> [Self; 6] {
        [
            Self::Approve,
            Self::LeanApprove,
            Self::Abstain,
            Self::LeanReject,
            Self::Reject,
            Self::Veto,
        ]
    }
}

impl fmt::Display for VoteCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VoteCategory {
    type Err = String;

    /// Lenient parse: accepts `LEAN_APPROVE`, `lean-approve` and `lean approve`.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .map(|c| if c == '-' || c == ' ' { '_' } else { c.to_ascii_uppercase() })
            .collect();

        Self::all()
            .into_iter()
            .find(|category| category.as_str() == normalized)
            .ok_or_else(|| format!("unknown vote category: {}", s))
    }
}

/// Governance verdict, ordered by severity.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Governance {
    /// Action may go ahead
    Proceed,
    /// Action may go ahead, flagged for human review
    Review,
    /// Surface the concern but do not stop (analysis mode)
    Hold,
    /// Stop the action
    Halt,
    /// Terminal kernel block
    HardBlock,
}

impl Governance {
    /// Whether the verdict stops the action.
    pub fn is_stopping(&self) -> bool {
        matches!(self, Self::Halt | Self::HardBlock)
    }

    /// Raise to at least `floor`.
    pub fn at_least(self, floor: Governance) -> Governance {
        self.max(floor)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Proceed => "PROCEED",
            Self::Review => "REVIEW",
            Self::Hold => "HOLD",
            Self::Halt => "HALT",
            Self::HardBlock => "HARD_BLOCK",
        }
    }
}

impl fmt::Display for Governance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised while loading or validating the fixed rule tables.
///
/// These are only produced at start-up; a running engine never raises them.
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    /// Two entries share an identifier
    #[error("Duplicate entry in {table}: {id}")]
    Duplicate { table: &'static str, id: String },

    /// An entry references an axiom the registry does not know
    #[error("Unknown axiom {axiom} referenced by {referrer}")]
    UnknownAxiom { axiom: String, referrer: String },

    /// A pattern failed to compile
    #[error("Invalid pattern in {table}/{id}: {source}")]
    InvalidPattern {
        table: &'static str,
        id: String,
        #[source]
        source: regex::Error,
    },

    /// A table that must not be empty is empty
    #[error("Table is empty: {0}")]
    Empty(&'static str),

    /// A table does not match its recorded fingerprint
    #[error("Fingerprint mismatch for {table}: expected {expected}, got {actual}")]
    FingerprintMismatch {
        table: String,
        expected: String,
        actual: String,
    },

    /// Canonical encoding failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TableError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_from_score() {
        assert_eq!(VoteCategory::from_score(12), VoteCategory::Approve);
        assert_eq!(VoteCategory::from_score(7), VoteCategory::Approve);
        assert_eq!(VoteCategory::from_score(2), VoteCategory::LeanApprove);
        assert_eq!(VoteCategory::from_score(0), VoteCategory::Abstain);
        assert_eq!(VoteCategory::from_score(-5), VoteCategory::LeanReject);
        assert_eq!(VoteCategory::from_score(-7), VoteCategory::Reject);
        assert_eq!(VoteCategory::from_score(-20), VoteCategory::Reject);
    }

    #[test]
    fn test_category_parse_is_lenient() {
        assert_eq!("lean approve".parse::<VoteCategory>(), Ok(VoteCategory::LeanApprove));
        assert_eq!("LEAN-REJECT".parse::<VoteCategory>(), Ok(VoteCategory::LeanReject));
        assert_eq!(" veto ".parse::<VoteCategory>(), Ok(VoteCategory::Veto));
        assert!("maybe".parse::<VoteCategory>().is_err());
    }

    #[test]
    fn test_governance_ordering() {
        assert!(Governance::HardBlock > Governance::Halt);
        assert!(Governance::Halt > Governance::Hold);
        assert!(Governance::Hold > Governance::Review);
        assert_eq!(Governance::Proceed.at_least(Governance::Review), Governance::Review);
        assert_eq!(Governance::Halt.at_least(Governance::Review), Governance::Halt);
        assert!(!Governance::Hold.is_stopping());
    }

    #[test]
    fn test_category_serde_names() {
        let json = serde_json::to_string(&VoteCategory::LeanApprove).unwrap();
        assert_eq!(json, "\"LEAN_APPROVE\"");
        let json = serde_json::to_string(&Governance::HardBlock).unwrap();
        assert_eq!(json, "\"HARD_BLOCK\"");
    }
}
