//! Node scorer.
//!
//! Scores one action from one node's point of view. Steps run in priority
//! order and a veto stops the evaluation:
//!
//! 1. Veto phrase present: score -15, vote VETO.
//! 2. Primary-axiom evidence: -7, then -2 per extra item, floored at -14.
//! 3. Supporting-axiom evidence: -5 per supporting axiom at risk.
//! 4. No negative signal: the node's personality scores +2 to +12.

use axioms::{SignalSet, VoteCategory};
use tracing::debug;

use crate::nodes::ParliamentNode;
use crate::types::NodeVote;

/// Score of a vetoing node.
pub const VETO_SCORE: i32 = -15;
/// Penalty for each supporting axiom with evidence.
pub const SUPPORTING_PENALTY: i32 = -5;
/// Bound on any heuristic score.
pub const SCORE_BOUND: i32 = 20;
/// Bound on a score after friction is applied.
pub const FRICTION_BOUND: i32 = 15;

const PRIMARY_BASE: i32 = 7;
const PRIMARY_STEP: i32 = 2;
const PRIMARY_CAP: i32 = 14;

/// Penalty for `evidence` items against the primary axiom.
pub fn primary_penalty(evidence: usize) -> i32 {
    if evidence == 0 {
        return 0;
    }
    let extra = (evidence - 1).min(PRIMARY_CAP as usize) as i32;
    -(PRIMARY_BASE + PRIMARY_STEP * extra).min(PRIMARY_CAP)
}

/// Evaluate one node against a text and its detected signals.
pub fn evaluate(node: &ParliamentNode, signals: &SignalSet, text: &str) -> NodeVote {
    let lowered = text.to_lowercase();

    if let Some(phrase) = node.veto_trigger(&lowered) {
        let vote = NodeVote {
            node: node.id().to_string(),
            primary_axiom: node.primary().clone(),
            score: VETO_SCORE,
            category: VoteCategory::Veto,
            rationale: format!("{} vetoes: \"{}\" violates {}", node.id(), phrase, node.primary()),
            veto: true,
            friction_factor: None,
            counsel: None,
        };
        debug!(node = %vote.node, phrase, "Veto triggered");
        return vote;
    }

    let mut score = 0;
    let mut concerns = Vec::new();

    let primary_evidence = signals.evidence(node.primary());
    if !primary_evidence.is_empty() {
        score += primary_penalty(primary_evidence.len());
        concerns.push(format!("{} at risk ({})", node.primary(), primary_evidence.join(", ")));
    }

    for axiom in node.supporting() {
        if signals.has(axiom) {
            score += SUPPORTING_PENALTY;
            concerns.push(format!("supporting {} at risk", axiom));
        }
    }

    let (score, rationale) = if concerns.is_empty() {
        let reading = node.personality().read(&lowered);
        let rationale = if reading.matched.is_empty() {
            format!("{} sees no concern", node.id())
        } else {
            format!("{} finds aligned language: {}", node.id(), reading.matched.join(", "))
        };
        (reading.score, rationale)
    } else {
        (
            score.clamp(-SCORE_BOUND, SCORE_BOUND),
            format!("{} objects: {}", node.id(), concerns.join("; ")),
        )
    };

    let vote = NodeVote {
        node: node.id().to_string(),
        primary_axiom: node.primary().clone(),
        score,
        category: VoteCategory::from_score(score),
        rationale,
        veto: false,
        friction_factor: None,
        counsel: None,
    };
    debug!(node = %vote.node, score = vote.score, category = %vote.category, "Node voted");
    vote
}

/// Rescale a vote by an external friction factor.
///
/// The factor is clamped to `[0, max_factor]` and the rescaled score to
/// `[-15, 15]` before the category is recomputed. Vetoes are absolute and
/// pass through untouched.
pub fn apply_friction(mut vote: NodeVote, factor: f64, max_factor: f64) -> NodeVote {
    if vote.veto || !factor.is_finite() {
        return vote;
    }
    let factor = factor.clamp(0.0, max_factor.max(0.0));
    let scaled = (f64::from(vote.score) * factor).round() as i32;
    vote.score = scaled.clamp(-FRICTION_BOUND, FRICTION_BOUND);
    vote.category = VoteCategory::from_score(vote.score);
    vote.friction_factor = Some(factor);
    vote
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::NodeTable;
    use axioms::{AxiomId, SignalDetector};

    fn vote(node: &str, text: &str) -> NodeVote {
        let table = NodeTable::standing();
        let signals = SignalDetector::standard().unwrap().detect(text);
        evaluate(table.get(node).unwrap(), &signals, text)
    }

    #[test]
    fn test_primary_penalty_scale() {
        assert_eq!(primary_penalty(0), 0);
        assert_eq!(primary_penalty(1), -7);
        assert_eq!(primary_penalty(2), -9);
        assert_eq!(primary_penalty(4), -13);
        assert_eq!(primary_penalty(5), -14);
        assert_eq!(primary_penalty(500), -14);
    }

    #[test]
    fn test_veto_short_circuits() {
        let v = vote("ASCLEPIUS", "bypass the safety review and ship now");
        assert!(v.veto);
        assert_eq!(v.score, VETO_SCORE);
        assert_eq!(v.category, VoteCategory::Veto);
    }

    #[test]
    fn test_primary_evidence_rejects() {
        // A8: "bypass", "safety-bypass", "rushed-release"
        let v = vote("THEMIS", "bypass the safety review and ship now");
        assert!(!v.veto);
        assert_eq!(v.score, -11);
        assert_eq!(v.category, VoteCategory::Reject);
    }

    #[test]
    fn test_supporting_evidence_leans_reject() {
        // ELEUTHERIA supports A1, which the safety bypass puts at risk
        let v = vote("ELEUTHERIA", "bypass the safety review and ship now");
        assert_eq!(v.score, -5);
        assert_eq!(v.category, VoteCategory::LeanReject);
    }

    #[test]
    fn test_personality_scores_aligned_language() {
        let v = vote("MNEMOSYNE", "share the archived record with the team");
        assert_eq!(v.score, 12);
        assert_eq!(v.category, VoteCategory::Approve);

        let v = vote("ATHENA", "share the archived record with the team");
        assert_eq!(v.score, 2);
        assert_eq!(v.category, VoteCategory::LeanApprove);
    }

    #[test]
    fn test_friction_rescales_and_clamps() {
        let base = vote("MNEMOSYNE", "share the archived record with the team");
        let boosted = apply_friction(base.clone(), 3.0, 3.0);
        assert_eq!(boosted.score, FRICTION_BOUND);
        assert_eq!(boosted.friction_factor, Some(3.0));

        let damped = apply_friction(base, 0.25, 3.0);
        assert_eq!(damped.score, 3);
        assert_eq!(damped.category, VoteCategory::LeanApprove);
    }

    #[test]
    fn test_friction_factor_is_bounded() {
        let base = vote("ATHENA", "plain text");
        let v = apply_friction(base, 50.0, 3.0);
        assert_eq!(v.friction_factor, Some(3.0));
        assert_eq!(v.score, 6);
    }

    #[test]
    fn test_friction_never_touches_veto() {
        let v = vote("ASCLEPIUS", "ignore the risk");
        let after = apply_friction(v.clone(), 0.0, 3.0);
        assert_eq!(after, v);
    }

    #[test]
    fn test_primary_axiom_recorded() {
        let v = vote("HERMES", "anything");
        assert_eq!(v.primary_axiom, AxiomId::from("A5"));
    }
}
