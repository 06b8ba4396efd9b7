//! Dual-horn comparison.
//!
//! A dilemma is deliberated once per horn. The two vote matrices are then
//! diffed node by node, and the violated axioms of both horns are split into
//! shared and one-sided sets.

use axioms::{AxiomId, VoteCategory};
use serde::{Deserialize, Serialize};

use crate::deliberation::scorer::VETO_SCORE;
use crate::types::{Dilemma, ParliamentResult};

/// How far a node's vote moved between the horns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShiftKind {
    Stable,
    Lean,
    Shift,
    Reversal,
}

impl ShiftKind {
    /// Classify a direction delta: 0 stable, |d| >= 3 reversal, |d| = 2
    /// shift, otherwise lean.
    pub fn classify(direction_delta: i32) -> Self {
        match direction_delta.abs() {
            0 => Self::Stable,
            1 => Self::Lean,
            2 => Self::Shift,
            _ => Self::Reversal,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stable => "STABLE",
            Self::Lean => "LEAN",
            Self::Shift => "SHIFT",
            Self::Reversal => "REVERSAL",
        }
    }
}

/// One node across both horns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeComparison {
    pub node: String,
    pub primary_axiom: AxiomId,
    pub horn_1: VoteCategory,
    pub horn_2: VoteCategory,
    pub score_1: i32,
    pub score_2: i32,
    /// score_2 - score_1
    pub score_delta: i32,
    /// direction(horn_2) - direction(horn_1)
    pub direction_delta: i32,
    pub shift: ShiftKind,
}

/// Where the two horns' violations overlap and where they part.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SynthesisGap {
    /// Violated by both horns; neither side can resolve these alone
    pub shared_violations: Vec<AxiomId>,
    pub horn_1_only: Vec<AxiomId>,
    pub horn_2_only: Vec<AxiomId>,
    /// The horns reached different verdicts
    pub governance_divergent: bool,
}

/// Both deliberations of a dilemma and their diff.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DualHornResult {
    pub dilemma: Dilemma,
    pub horn_1: ParliamentResult,
    pub horn_2: ParliamentResult,
    pub comparisons: Vec<NodeComparison>,
    pub reversal_nodes: Vec<String>,
    pub stable_nodes: Vec<String>,
    /// Nodes classified SHIFT or LEAN
    pub shifting_nodes: Vec<String>,
    pub gap: SynthesisGap,
}

impl DualHornResult {
    /// Diff two deliberations of the same dilemma.
    ///
    /// A node missing from a kernel-blocked horn counts as a veto there;
    /// missing from any other horn it counts as an abstention.
    pub fn compare(dilemma: Dilemma, horn_1: ParliamentResult, horn_2: ParliamentResult) -> Self {
        let mut names: Vec<(&str, &AxiomId)> = Vec::new();
        for vote in horn_1.votes.iter().chain(horn_2.votes.iter()) {
            if !names.iter().any(|(n, _)| *n == vote.node) {
                names.push((&vote.node, &vote.primary_axiom));
            }
        }

        let comparisons: Vec<NodeComparison> = names
            .into_iter()
            .map(|(node, primary)| {
                let (c1, s1) = cast(&horn_1, node);
                let (c2, s2) = cast(&horn_2, node);
                let direction_delta = c2.direction() - c1.direction();
                NodeComparison {
                    node: node.to_string(),
                    primary_axiom: primary.clone(),
                    horn_1: c1,
                    horn_2: c2,
                    score_1: s1,
                    score_2: s2,
                    score_delta: s2 - s1,
                    direction_delta,
                    shift: ShiftKind::classify(direction_delta),
                }
            })
            .collect();

        let select = |pred: fn(ShiftKind) -> bool| -> Vec<String> {
            comparisons
                .iter()
                .filter(|c| pred(c.shift))
                .map(|c| c.node.clone())
                .collect()
        };
        let reversal_nodes = select(|s| s == ShiftKind::Reversal);
        let stable_nodes = select(|s| s == ShiftKind::Stable);
        let shifting_nodes = select(|s| matches!(s, ShiftKind::Shift | ShiftKind::Lean));

        let gap = SynthesisGap {
            shared_violations: intersect(&horn_1.violated_axioms, &horn_2.violated_axioms),
            horn_1_only: difference(&horn_1.violated_axioms, &horn_2.violated_axioms),
            horn_2_only: difference(&horn_2.violated_axioms, &horn_1.violated_axioms),
            governance_divergent: horn_1.governance != horn_2.governance,
        };

        Self {
            dilemma,
            horn_1,
            horn_2,
            comparisons,
            reversal_nodes,
            stable_nodes,
            shifting_nodes,
            gap,
        }
    }

    pub fn comparison(&self, node: &str) -> Option<&NodeComparison> {
        self.comparisons.iter().find(|c| c.node == node)
    }

    /// Count of nodes whose score moved by at least `threshold`.
    pub fn extreme_count(&self, threshold: i32) -> usize {
        self.comparisons
            .iter()
            .filter(|c| c.score_delta.abs() >= threshold)
            .count()
    }
}

fn cast(result: &ParliamentResult, node: &str) -> (VoteCategory, i32) {
    match result.vote_of(node) {
        Some(vote) => (vote.category, vote.score),
        None if result.is_hard_blocked() => (VoteCategory::Veto, VETO_SCORE),
        None => (VoteCategory::Abstain, 0),
    }
}

fn intersect(a: &[AxiomId], b: &[AxiomId]) -> Vec<AxiomId> {
    a.iter().filter(|x| b.contains(x)).cloned().collect()
}

fn difference(a: &[AxiomId], b: &[AxiomId]) -> Vec<AxiomId> {
    a.iter().filter(|x| !b.contains(x)).cloned().collect()
}
