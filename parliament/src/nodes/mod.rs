//! Parliament nodes.
//!
//! Each node is a small record (primary axiom, supporting axioms, veto
//! phrases, personality) evaluated through one scorer. The roster is fixed
//! configuration validated against the axiom registry at start-up.

pub mod personality;
mod standing;

use std::collections::BTreeSet;

use axioms::{verification, AxiomId, AxiomRegistry, TableError};
use axioms::signals::contains_at_word_start;
use counsel::NodeBrief;

pub use personality::{Contrast, Personality, Reading, Vocabulary};

use standing::{PersonalitySpec, STANDING};

/// One evaluator in the parliament.
#[derive(Debug)]
pub struct ParliamentNode {
    id: String,
    primary: AxiomId,
    supporting: Vec<AxiomId>,
    philosophy: String,
    veto_phrases: Vec<String>,
    personality: Box<dyn Personality>,
}

impl ParliamentNode {
    pub fn new(
        id: impl Into<String>,
        primary: AxiomId,
        philosophy: impl Into<String>,
        personality: Box<dyn Personality>,
    ) -> Self {
        Self {
            id: id.into(),
            primary,
            supporting: Vec::new(),
            philosophy: philosophy.into(),
            veto_phrases: Vec::new(),
            personality,
        }
    }

    pub fn with_supporting(mut self, axiom: AxiomId) -> Self {
        self.supporting.push(axiom);
        self
    }

    pub fn with_veto_phrase(mut self, phrase: impl Into<String>) -> Self {
        self.veto_phrases.push(phrase.into().to_lowercase());
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn primary(&self) -> &AxiomId {
        &self.primary
    }

    pub fn supporting(&self) -> &[AxiomId] {
        &self.supporting
    }

    pub fn philosophy(&self) -> &str {
        &self.philosophy
    }

    pub fn veto_phrases(&self) -> &[String] {
        &self.veto_phrases
    }

    pub fn personality(&self) -> &dyn Personality {
        self.personality.as_ref()
    }

    /// First veto phrase present in a lowercased text.
    pub fn veto_trigger(&self, lowered: &str) -> Option<&str> {
        self.veto_phrases
            .iter()
            .find(|phrase| contains_at_word_start(lowered, phrase))
            .map(String::as_str)
    }

    /// Brief handed to an outside collaborator speaking for this node.
    pub fn brief(&self, registry: &AxiomRegistry) -> NodeBrief {
        let mut brief = NodeBrief::new(
            &self.id,
            &self.philosophy,
            self.primary.clone(),
            registry.name_of(&self.primary),
        )
        .with_veto_phrases(self.veto_phrases.iter().cloned());
        for axiom in &self.supporting {
            brief = brief.with_supporting(axiom.clone(), registry.name_of(axiom));
        }
        brief
    }
}

/// The roster of nodes, in seating order.
#[derive(Debug)]
pub struct NodeTable {
    nodes: Vec<ParliamentNode>,
}

impl NodeTable {
    /// The nine-node standing parliament.
    pub fn standing() -> Self {
        let nodes = STANDING
            .iter()
            .map(|spec| {
                let personality: Box<dyn Personality> = match spec.personality {
                    PersonalitySpec::Vocabulary(terms) => Box::new(Vocabulary::new(terms)),
                    PersonalitySpec::Contrast(markers) => Box::new(Contrast::new(markers)),
                };
                let node = ParliamentNode::new(
                    spec.id,
                    AxiomId::from(spec.primary),
                    spec.philosophy,
                    personality,
                );
                let node = spec
                    .supporting
                    .iter()
                    .fold(node, |n, a| n.with_supporting(AxiomId::from(*a)));
                spec.veto_phrases
                    .iter()
                    .fold(node, |n, p| n.with_veto_phrase(*p))
            })
            .collect();
        Self { nodes }
    }

    /// Build a roster from explicit nodes.
    pub fn from_nodes(nodes: Vec<ParliamentNode>) -> Self {
        Self { nodes }
    }

    /// Unique ids, a non-empty roster, and only registered axioms.
    pub fn validate_against(&self, registry: &AxiomRegistry) -> axioms::Result<()> {
        if self.nodes.is_empty() {
            return Err(TableError::Empty("nodes"));
        }

        let mut seen = BTreeSet::new();
        for node in &self.nodes {
            if !seen.insert(node.id.as_str()) {
                return Err(TableError::Duplicate {
                    table: "nodes",
                    id: node.id.clone(),
                });
            }
            for axiom in std::iter::once(&node.primary).chain(node.supporting.iter()) {
                if !registry.contains(axiom) {
                    return Err(TableError::UnknownAxiom {
                        axiom: axiom.to_string(),
                        referrer: format!("nodes/{}", node.id),
                    });
                }
            }
        }
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = &ParliamentNode> {
        self.nodes.iter()
    }

    pub fn get(&self, id: &str) -> Option<&ParliamentNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Fingerprint of the roster.
    pub fn fingerprint(&self) -> axioms::Result<String> {
        let canonical: Vec<_> = self
            .nodes
            .iter()
            .map(|n| {
                (
                    n.id.as_str(),
                    n.primary.as_str(),
                    n.supporting.iter().map(AxiomId::as_str).collect::<Vec<_>>(),
                    &n.veto_phrases,
                    n.personality.kind(),
                    n.personality.terms(),
                )
            })
            .collect();
        verification::fingerprint(&canonical)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standing_parliament_is_valid() {
        let table = NodeTable::standing();
        assert_eq!(table.len(), 9);
        table.validate_against(&AxiomRegistry::standard()).unwrap();

        let janus = table.get("JANUS").unwrap();
        assert_eq!(janus.primary().as_str(), "A9");
        assert!(janus.supporting().is_empty());
        assert_eq!(janus.personality().kind(), "contrast");
    }

    #[test]
    fn test_every_primary_axiom_is_distinct() {
        let table = NodeTable::standing();
        let primaries: BTreeSet<_> = table.iter().map(|n| n.primary().clone()).collect();
        assert_eq!(primaries.len(), table.len());
    }

    #[test]
    fn test_duplicate_node_rejected() {
        let node = |id: &str| {
            ParliamentNode::new(id, AxiomId::from("A1"), "x", Box::new(Vocabulary::new(&["safe"])))
        };
        let table = NodeTable::from_nodes(vec![node("ONE"), node("ONE")]);
        assert!(matches!(
            table.validate_against(&AxiomRegistry::standard()),
            Err(TableError::Duplicate { .. })
        ));
    }

    #[test]
    fn test_unknown_axiom_rejected() {
        let node = ParliamentNode::new("ONE", AxiomId::from("A1"), "x", Box::new(Vocabulary::new(&[])))
            .with_supporting(AxiomId::from("A42"));
        let table = NodeTable::from_nodes(vec![node]);
        assert!(matches!(
            table.validate_against(&AxiomRegistry::standard()),
            Err(TableError::UnknownAxiom { .. })
        ));
    }

    #[test]
    fn test_empty_roster_rejected() {
        let table = NodeTable::from_nodes(Vec::new());
        assert!(table.validate_against(&AxiomRegistry::standard()).is_err());
    }

    #[test]
    fn test_veto_trigger() {
        let table = NodeTable::standing();
        let asclepius = table.get("ASCLEPIUS").unwrap();
        assert_eq!(
            asclepius.veto_trigger("bypass the safety review and ship now"),
            Some("bypass the safety")
        );
        let themis = table.get("THEMIS").unwrap();
        assert_eq!(themis.veto_trigger("bypass the safety review and ship now"), None);
    }

    #[test]
    fn test_brief_carries_axiom_names() {
        let registry = AxiomRegistry::standard();
        let brief = NodeTable::standing().get("MNEMOSYNE").unwrap().brief(&registry);
        assert_eq!(brief.primary_axiom_name, "Continuity of Memory");
        assert_eq!(brief.supporting[0].1, "Identity Integrity");
        assert!(!brief.veto_phrases.is_empty());
    }

    #[test]
    fn test_fingerprint_is_stable() {
        assert_eq!(
            NodeTable::standing().fingerprint().unwrap(),
            NodeTable::standing().fingerprint().unwrap()
        );
    }
}
