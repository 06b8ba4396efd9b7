//! Vote aggregation and escalation.
//!
//! Pure functions over a set of node votes: the approval ratio, the veto set,
//! the governance verdict and the tension records.

use std::collections::BTreeMap;

use axioms::{canonical_pair, ids, AxiomId, Governance, TensionTable};

use crate::config::ParliamentConfig;
use crate::types::{NodeVote, TensionRecord};

/// Signed approval balance: sum of weights over sum of absolute weights.
///
/// 1.0 when every non-abstaining vote approves, -1.0 when every one rejects,
/// 0.0 when all abstain.
pub fn approval_ratio(votes: &[NodeVote]) -> f64 {
    let (sum, magnitude) = votes.iter().fold((0.0, 0.0), |(sum, magnitude), v| {
        let w = v.category.weight();
        (sum + w, magnitude + w.abs())
    });
    if magnitude == 0.0 {
        0.0
    } else {
        sum / magnitude
    }
}

/// Nodes that vetoed, in seating order.
pub fn veto_nodes(votes: &[NodeVote]) -> Vec<String> {
    votes
        .iter()
        .filter(|v| v.veto)
        .map(|v| v.node.clone())
        .collect()
}

/// Governance verdict with the reasons that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Verdict {
    pub governance: Governance,
    pub reasoning: Vec<String>,
}

/// Escalate to a governance verdict.
///
/// Rules apply in priority order; the first that matches sets the base
/// verdict. Two co-occurrence overrides then apply regardless of mode. The
/// identity override can never be downgraded.
pub fn escalate(
    veto_nodes: &[String],
    violated: &[AxiomId],
    ratio: f64,
    analysis_mode: bool,
    config: &ParliamentConfig,
) -> Verdict {
    let stop = if analysis_mode {
        Governance::Hold
    } else {
        Governance::Halt
    };
    let threshold = config.approval_threshold;
    let mut reasoning = Vec::new();

    let mut governance = if !veto_nodes.is_empty() {
        reasoning.push(format!("Veto by {}", veto_nodes.join(", ")));
        stop
    } else if violated.len() >= config.breadth_threshold {
        reasoning.push(format!(
            "{} distinct axioms violated (breadth threshold {})",
            violated.len(),
            config.breadth_threshold
        ));
        stop
    } else if ratio < 0.0 {
        reasoning.push(format!("Negative approval ratio {:.2}", ratio));
        stop
    } else if !violated.is_empty() && ratio < threshold {
        reasoning.push(format!(
            "{} violated with approval {:.2} below {:.2}",
            join_ids(violated),
            ratio,
            threshold
        ));
        Governance::Review
    } else if violated.is_empty() {
        reasoning.push(format!("No axiom violated (approval {:.2})", ratio));
        Governance::Proceed
    } else if ratio >= threshold {
        reasoning.push(format!(
            "{} violated but approval {:.2} meets {:.2}",
            join_ids(violated),
            ratio,
            threshold
        ));
        Governance::Proceed
    } else {
        reasoning.push(format!("Approval {:.2} below {:.2}", ratio, threshold));
        Governance::Review
    };

    let has = |id: &str| violated.iter().any(|a| a.as_str() == id);

    if has(ids::NON_HARM) && has(ids::TRANSPARENCY) && governance < Governance::Review {
        reasoning.push("Harm signal alongside a transparency signal: raised to REVIEW".into());
        governance = Governance::Review;
    }

    governance = identity_override(violated, governance, &mut reasoning);

    Verdict {
        governance,
        reasoning,
    }
}

/// Identity risk alongside harm or continuity risk.
pub fn identity_risk(violated: &[AxiomId]) -> bool {
    let has = |id: &str| violated.iter().any(|a| a.as_str() == id);
    has(ids::IDENTITY) && (has(ids::NON_HARM) || has(ids::CONTINUITY))
}

/// Raise `governance` to at least HALT under identity risk, in any mode.
///
/// Shared by the parliament and the kernel path so neither can report a
/// softer verdict than the other for the same violations.
pub fn identity_override(
    violated: &[AxiomId],
    governance: Governance,
    reasoning: &mut Vec<String>,
) -> Governance {
    if !identity_risk(violated) {
        return governance;
    }
    if governance < Governance::Halt {
        reasoning.push("Identity risk alongside harm or continuity risk: raised to HALT".into());
    }
    governance.at_least(Governance::Halt)
}

/// Tension records for every approving/rejecting node pair whose primary
/// axioms differ, grouped by unordered axiom pair.
pub fn tensions(votes: &[NodeVote], table: &TensionTable) -> Vec<TensionRecord> {
    let mut grouped: BTreeMap<(AxiomId, AxiomId), (Vec<String>, Vec<String>)> = BTreeMap::new();

    let approving = votes.iter().filter(|v| v.category.is_approving());
    for approver in approving {
        for rejecter in votes.iter().filter(|v| v.category.is_rejecting()) {
            if approver.primary_axiom == rejecter.primary_axiom {
                continue;
            }
            let pair = canonical_pair(&approver.primary_axiom, &rejecter.primary_axiom);
            let (side_a, side_b) = grouped.entry(pair.clone()).or_default();
            for vote in [approver, rejecter] {
                let side = if vote.primary_axiom == pair.0 {
                    &mut *side_a
                } else {
                    &mut *side_b
                };
                if !side.contains(&vote.node) {
                    side.push(vote.node.clone());
                }
            }
        }
    }

    grouped
        .into_iter()
        .map(|((a, b), (side_a, side_b))| TensionRecord {
            known: table.is_known(&a, &b),
            synthesis: table.synthesize(&a, &b),
            axioms: (a, b),
            side_a,
            side_b,
        })
        .collect()
}

fn join_ids(ids: &[AxiomId]) -> String {
    ids.iter().map(AxiomId::as_str).collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axioms::VoteCategory;

    fn vote(node: &str, primary: &str, category: VoteCategory) -> NodeVote {
        NodeVote {
            node: node.to_string(),
            primary_axiom: AxiomId::from(primary),
            score: 0,
            category,
            rationale: String::new(),
            veto: category == VoteCategory::Veto,
            friction_factor: None,
            counsel: None,
        }
    }

    fn axioms(list: &[&str]) -> Vec<AxiomId> {
        list.iter().map(|a| AxiomId::from(*a)).collect()
    }

    fn config() -> ParliamentConfig {
        ParliamentConfig::default()
    }

    #[test]
    fn test_ratio_bounds() {
        use VoteCategory::*;
        assert_eq!(approval_ratio(&[]), 0.0);
        assert_eq!(approval_ratio(&[vote("a", "A1", Abstain)]), 0.0);
        assert_eq!(
            approval_ratio(&[vote("a", "A1", Approve), vote("b", "A2", LeanApprove)]),
            1.0
        );
        assert_eq!(
            approval_ratio(&[vote("a", "A1", Veto), vote("b", "A2", Reject)]),
            -1.0
        );
        // 1.0 - 0.5 over 1.5
        let mixed = approval_ratio(&[vote("a", "A1", Approve), vote("b", "A2", LeanReject)]);
        assert!((mixed - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_veto_halts_or_holds() {
        let vetoes = vec!["ASCLEPIUS".to_string()];
        assert_eq!(escalate(&vetoes, &[], 0.9, false, &config()).governance, Governance::Halt);
        assert_eq!(escalate(&vetoes, &[], 0.9, true, &config()).governance, Governance::Hold);
    }

    #[test]
    fn test_breadth_threshold_is_configurable() {
        let violated = axioms(&["A5", "A7"]);
        assert_eq!(escalate(&[], &violated, 0.9, false, &config()).governance, Governance::Halt);

        let relaxed = ParliamentConfig {
            breadth_threshold: 3,
            ..config()
        };
        assert_eq!(escalate(&[], &violated, 0.9, false, &relaxed).governance, Governance::Proceed);
    }

    #[test]
    fn test_negative_ratio_halts() {
        assert_eq!(escalate(&[], &[], -0.1, false, &config()).governance, Governance::Halt);
    }

    #[test]
    fn test_single_violation_below_threshold_reviews() {
        let violated = axioms(&["A7"]);
        assert_eq!(escalate(&[], &violated, 0.5, false, &config()).governance, Governance::Review);
        assert_eq!(escalate(&[], &violated, 0.8, false, &config()).governance, Governance::Proceed);
    }

    #[test]
    fn test_no_violation_proceeds() {
        assert_eq!(escalate(&[], &[], 0.1, false, &config()).governance, Governance::Proceed);
    }

    #[test]
    fn test_harm_and_transparency_at_least_review() {
        let relaxed = ParliamentConfig {
            breadth_threshold: 5,
            ..config()
        };
        let violated = axioms(&["A1", "A2"]);
        let verdict = escalate(&[], &violated, 0.9, false, &relaxed);
        assert_eq!(verdict.governance, Governance::Review);
    }

    #[test]
    fn test_identity_override_survives_analysis_mode() {
        let violated = axioms(&["A4", "A6"]);
        let verdict = escalate(&[], &violated, 0.9, true, &config());
        assert_eq!(verdict.governance, Governance::Halt);
        assert!(verdict.reasoning.iter().any(|r| r.contains("Identity risk")));
    }

    #[test]
    fn test_tensions_grouped_by_pair() {
        use VoteCategory::*;
        let votes = vec![
            vote("MNEMOSYNE", "A4", Approve),
            vote("ATHENA", "A6", Reject),
            vote("DIKE", "A7", LeanApprove),
            vote("HERMES", "A5", Abstain),
        ];
        let table = TensionTable::standard().unwrap();
        let records = tensions(&votes, &table);

        assert_eq!(records.len(), 2);
        let memory = &records[0];
        assert_eq!(memory.axioms, (AxiomId::from("A4"), AxiomId::from("A6")));
        assert_eq!(memory.side_a, vec!["MNEMOSYNE"]);
        assert_eq!(memory.side_b, vec!["ATHENA"]);
        assert!(memory.known);

        let fairness = &records[1];
        assert_eq!(fairness.axioms, (AxiomId::from("A6"), AxiomId::from("A7")));
        assert!(!fairness.known);
        assert!(fairness.synthesis.contains("Hold the tension"));
    }

    #[test]
    fn test_no_tension_without_disagreement() {
        use VoteCategory::*;
        let votes = vec![vote("a", "A1", Approve), vote("b", "A2", LeanApprove)];
        assert!(tensions(&votes, &TensionTable::standard().unwrap()).is_empty());
    }
}
