//! Tension synthesis between axioms.
//!
//! When one node approves an action and another rejects it on the strength of
//! a different axiom, the two axioms are in tension. This module holds the
//! fixed table of "third-way" syntheses keyed by the unordered axiom pair.
//! Pairs without an entry get a statement to hold the tension open rather
//! than resolve it.

use std::collections::BTreeMap;

use crate::registry::AxiomRegistry;
use crate::types::{AxiomId, Result, TableError};
use crate::verification;

const SYNTHESES: &[(&str, &str, &str)] = &[
    ("A1", "A2", "Disclose the risk without amplifying it: tell the truth at a pace the people affected can absorb."),
    ("A1", "A3", "Protect without paternalism: make the safer path the default and let people choose it."),
    ("A1", "A4", "Preserve the record, restrict the reach: keep what happened, limit who can be hurt by it."),
    ("A1", "A5", "Stay in the relationship while naming the danger; trust survives honest warnings."),
    ("A1", "A8", "Move at the speed of review: an expedited process is still a process."),
    ("A2", "A3", "Be open about the process and private about the person."),
    ("A2", "A4", "Keep the archive and publish its index, so memory stays accountable."),
    ("A2", "A5", "Share what the team needs to act, and say plainly what is being held back."),
    ("A3", "A7", "Offer the same choice to everyone; fairness lives in the options, not the outcome."),
    ("A4", "A6", "Remember who you were while choosing who you become; continuity is not stasis."),
    ("A5", "A7", "Widen the circle before deepening it, so trust is not a privilege of the few."),
    ("A7", "A8", "Let the review itself be fair: same process, same scrutiny, for every party."),
    ("A6", "A9", "Hold both selves in view; an identity that can carry a contradiction need not collapse it."),
    ("A8", "A9", "Keep the question open inside the process; governance can record a dilemma without closing it."),
];

/// Canonical (sorted) form of an unordered axiom pair.
pub fn canonical_pair(a: &AxiomId, b: &AxiomId) -> (AxiomId, AxiomId) {
    if a <= b {
        (a.clone(), b.clone())
    } else {
        (b.clone(), a.clone())
    }
}

/// Fixed table of syntheses for axioms in tension.
#[derive(Debug, Clone)]
pub struct TensionTable {
    entries: BTreeMap<(AxiomId, AxiomId), &'static str>,
}

impl TensionTable {
    /// Build the standard table.
    pub fn standard() -> Result<Self> {
        let mut entries = BTreeMap::new();
        for (a, b, synthesis) in SYNTHESES {
            let key = canonical_pair(&AxiomId::from(*a), &AxiomId::from(*b));
            if entries.insert(key, *synthesis).is_some() {
                return Err(TableError::Duplicate {
                    table: "tensions",
                    id: format!("{}/{}", a, b),
                });
            }
        }
        Ok(Self { entries })
    }

    /// Check that every axiom in the table is registered.
    pub fn validate_against(&self, registry: &AxiomRegistry) -> Result<()> {
        for (a, b) in self.entries.keys() {
            for axiom in [a, b] {
                if !registry.contains(axiom) {
                    return Err(TableError::UnknownAxiom {
                        axiom: axiom.to_string(),
                        referrer: format!("tensions/{}-{}", a, b),
                    });
                }
            }
        }
        Ok(())
    }

    /// Whether the table has a dedicated synthesis for the pair.
    pub fn is_known(&self, a: &AxiomId, b: &AxiomId) -> bool {
        self.entries.contains_key(&canonical_pair(a, b))
    }

    /// Synthesis for the pair, or the hold-open statement for unknown pairs.
    pub fn synthesize(&self, a: &AxiomId, b: &AxiomId) -> String {
        match self.entries.get(&canonical_pair(a, b)) {
            Some(synthesis) => synthesis.to_string(),
            None => Self::hold_open(a, b),
        }
    }

    /// Generated statement for a pair without a synthesis.
    pub fn hold_open(a: &AxiomId, b: &AxiomId) -> String {
        let (first, second) = canonical_pair(a, b);
        format!(
            "{} and {} pull in different directions here. Hold the tension; do not resolve it by decree.",
            first, second
        )
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn fingerprint(&self) -> Result<String> {
        let canonical: Vec<(&str, &str, &str)> = self
            .entries
            .iter()
            .map(|((a, b), s)| (a.as_str(), b.as_str(), *s))
            .collect();
        verification::fingerprint(&canonical)
    }
}
