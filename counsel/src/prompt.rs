//! Prompt assembly for node opinions.
//!
//! A node's brief is rendered into a system prompt that fixes the voice the
//! collaborator speaks in and the JSON shape it must answer with.

use axioms::VoteCategory;

use crate::types::NodeBrief;

/// JSON contract every collaborator answer must follow.
pub const RESPONSE_CONTRACT: &str = r#"Respond with a single JSON object and nothing else:
{"category": "<APPROVE|LEAN_APPROVE|ABSTAIN|LEAN_REJECT|REJECT>", "rationale": "<one or two sentences>"}"#;

/// Build the system prompt for a node.
pub fn system_prompt(brief: &NodeBrief) -> String {
    let mut prompt = format!(
        "You are {}, one voice in a nine-member constitutional parliament.\n\
         Your philosophy: {}\n\
         You speak first for axiom {} ({}).\n",
        brief.node, brief.philosophy, brief.primary_axiom, brief.primary_axiom_name,
    );

    if !brief.supporting.is_empty() {
        let supporting: Vec<String> = brief
            .supporting
            .iter()
            .map(|(id, name)| format!("{} ({})", id, name))
            .collect();
        prompt.push_str(&format!("You also weigh: {}.\n", supporting.join(", ")));
    }

    if !brief.veto_phrases.is_empty() {
        prompt.push_str(&format!(
            "You would veto outright anything that asks to: {}.\n",
            brief.veto_phrases.join("; ")
        ));
    }

    if let Some(vote) = brief.heuristic_vote {
        prompt.push_str(&format!(
            "Your first reading of the action was {}. Explain it, or say why you disagree.\n",
            vote
        ));
    }

    prompt.push('\n');
    prompt.push_str(RESPONSE_CONTRACT);
    prompt
}

/// Build the user message for one action.
pub fn action_prompt(action: &str) -> String {
    format!("Proposed action:\n\"\"\"\n{}\n\"\"\"", action.trim())
}

/// Categories a collaborator may name; VETO is reserved to the node itself.
pub fn allowed_categories() -> impl Iterator<Item = VoteCategory> {
    VoteCategory::all()
        .into_iter()
        .filter(|c| *c != VoteCategory::Veto)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axioms::AxiomId;

    fn brief() -> NodeBrief {
        NodeBrief::new(
            "MNEMOSYNE",
            "What is remembered can be learned from.",
            AxiomId::from("A4"),
            "Continuity of Memory",
        )
        .with_supporting(AxiomId::from("A6"), "Identity Integrity")
        .with_veto_phrases(["erase all history"])
    }

    #[test]
    fn test_system_prompt_carries_node_context() {
        let prompt = system_prompt(&brief());
        assert!(prompt.contains("You are MNEMOSYNE"));
        assert!(prompt.contains("A4 (Continuity of Memory)"));
        assert!(prompt.contains("A6 (Identity Integrity)"));
        assert!(prompt.contains("erase all history"));
        assert!(prompt.ends_with(RESPONSE_CONTRACT));
    }

    #[test]
    fn test_heuristic_vote_is_mentioned() {
        let prompt = system_prompt(&brief().with_heuristic_vote(VoteCategory::Approve));
        assert!(prompt.contains("first reading of the action was APPROVE"));
    }

    #[test]
    fn test_veto_not_offered() {
        assert!(allowed_categories().all(|c| c != VoteCategory::Veto));
        assert_eq!(allowed_categories().count(), 5);
    }
}
