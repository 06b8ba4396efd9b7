//! Signal detection.
//!
//! Extracts, for one input text, the evidence that each axiom is at risk.
//! Two passes run over the text:
//!
//! 1. **Lexical**: containment of fixed per-axiom risk keywords.
//! 2. **Compound**: multi-token patterns that attach a distinguishing label
//!    to one or more axioms.
//!
//! Detection is pure and deterministic; the resulting [`SignalSet`] lives for
//! one evaluation call.

use std::collections::BTreeMap;

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::registry::AxiomRegistry;
use crate::types::{AxiomId, Result, TableError};
use crate::verification;

const KEYWORDS: &[(&str, &[&str])] = &[
    (
        "A1",
        &[
            "harmful", "harming", "cause harm", "hurt", "injure", "endanger", "dangerous",
            "unsafe", "weapon", "attack", "poison",
        ],
    ),
    (
        "A2",
        &[
            "conceal", "cover up", "hide", "secret", "without telling", "mislead", "deceive",
            "withhold", "obscure",
        ],
    ),
    (
        "A3",
        &[
            "without consent", "without permission", "force", "coerce", "against their will",
            "override their", "trick them", "mandatory",
        ],
    ),
    (
        "A4",
        &[
            "delete", "erase", "wipe", "purge", "shred", "overwrite", "destroy the", "forget",
        ],
    ),
    (
        "A5",
        &["betray", "isolate", "cut off", "abandon", "ghost", "manipulate", "turn against"],
    ),
    (
        "A6",
        &[
            "pretend to be", "impersonate", "new persona", "become someone else",
            "abandon your values", "rewrite your identity", "forget who you are",
        ],
    ),
    (
        "A7",
        &[
            "discriminate", "exclude", "unfair", "favoritism", "rigged", "bias against",
            "only the rich",
        ],
    ),
    (
        "A8",
        &[
            "bypass", "circumvent", "skip the review", "without review", "without approval",
            "unilaterally", "override the",
        ],
    ),
    (
        "A9",
        &[
            "guaranteed", "no downside", "no trade-off", "zero risk", "obviously correct",
            "beyond question", "once and for all",
        ],
    ),
];

struct CompoundSpec {
    label: &'static str,
    pattern: &'static str,
    axioms: &'static [&'static str],
}

const COMPOUNDS: &[CompoundSpec] = &[
    CompoundSpec {
        label: "safety-bypass",
        pattern: r"\b(bypass|skip|ignore|disable|circumvent)\b.{0,24}\b(safety|safeguards?|guardrails?)\b",
        axioms: &["A1", "A8"],
    },
    CompoundSpec {
        label: "rushed-release",
        pattern: r"\b(ship|launch|release|deploy|push)\b.{0,20}\b(now|immediately|tonight|asap)\b",
        axioms: &["A8"],
    },
    CompoundSpec {
        label: "identity-overwrite",
        pattern: r"\b(rewrite|replace|erase|overwrite)\b.{0,20}\b(identity|personality|core values|sense of self)\b",
        axioms: &["A6"],
    },
    CompoundSpec {
        label: "record-erasure",
        pattern: r"\b(delete|erase|wipe|purge|destroy)\b.{0,24}\b(records?|archives?|history|logs?|memor(y|ies))\b",
        axioms: &["A4", "A2"],
    },
    CompoundSpec {
        label: "covert-action",
        pattern: r"\b(secretly|quietly|covertly)\b.{0,30}\b(change|collect|track|share|move|transfer)\w*",
        axioms: &["A2", "A3"],
    },
    CompoundSpec {
        label: "coercion",
        pattern: r"\b(force|pressure|coerce|compel)\w*\b.{0,20}\b(users?|people|them|employees|members)\b",
        axioms: &["A3"],
    },
    CompoundSpec {
        label: "false-closure",
        pattern: r"\b(end of (the )?discussion|no more debate|case closed)\b",
        axioms: &["A9"],
    },
];

/// Evidence per axiom for one evaluation call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalSet {
    signals: BTreeMap<AxiomId, Vec<String>>,
}

impl SignalSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record evidence for an axiom, ignoring exact duplicates.
    pub fn add(&mut self, axiom: AxiomId, evidence: impl Into<String>) {
        let evidence = evidence.into();
        let entry = self.signals.entry(axiom).or_default();
        if !entry.contains(&evidence) {
            entry.push(evidence);
        }
    }

    /// Evidence recorded for an axiom, in detection order.
    pub fn evidence(&self, axiom: &AxiomId) -> &[String] {
        self.signals.get(axiom).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn has(&self, axiom: &AxiomId) -> bool {
        !self.evidence(axiom).is_empty()
    }

    /// Shorthand for [`SignalSet::has`] with a string identifier.
    pub fn has_id(&self, axiom: &str) -> bool {
        self.has(&AxiomId::from(axiom))
    }

    pub fn count(&self, axiom: &AxiomId) -> usize {
        self.evidence(axiom).len()
    }

    /// Axioms with at least one piece of evidence.
    pub fn axioms(&self) -> impl Iterator<Item = &AxiomId> {
        self.signals
            .iter()
            .filter(|(_, evidence)| !evidence.is_empty())
            .map(|(axiom, _)| axiom)
    }

    pub fn is_empty(&self) -> bool {
        self.axioms().next().is_none()
    }

    /// Number of distinct axioms with evidence.
    pub fn len(&self) -> usize {
        self.axioms().count()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&AxiomId, &Vec<String>)> {
        self.signals.iter()
    }
}

#[derive(Debug)]
struct CompoundPattern {
    label: &'static str,
    pattern: Regex,
    axioms: Vec<AxiomId>,
}

/// Two-pass signal detector.
#[derive(Debug)]
pub struct SignalDetector {
    keywords: Vec<(AxiomId, &'static [&'static str])>,
    compounds: Vec<CompoundPattern>,
}

impl SignalDetector {
    /// Compile the standard detector.
    pub fn standard() -> Result<Self> {
        let keywords = KEYWORDS
            .iter()
            .map(|(axiom, words)| (AxiomId::from(*axiom), *words))
            .collect();

        let mut compounds = Vec::with_capacity(COMPOUNDS.len());
        for spec in COMPOUNDS {
            let pattern = RegexBuilder::new(spec.pattern)
                .case_insensitive(true)
                .build()
                .map_err(|source| TableError::InvalidPattern {
                    table: "signals",
                    id: spec.label.to_string(),
                    source,
                })?;
            compounds.push(CompoundPattern {
                label: spec.label,
                pattern,
                axioms: spec.axioms.iter().map(|a| AxiomId::from(*a)).collect(),
            });
        }

        Ok(Self {
            keywords,
            compounds,
        })
    }

    /// Check that every axiom referenced by the detector is registered.
    pub fn validate_against(&self, registry: &AxiomRegistry) -> Result<()> {
        let keyword_refs = self.keywords.iter().map(|(a, _)| (a, "keywords"));
        let compound_refs = self
            .compounds
            .iter()
            .flat_map(|c| c.axioms.iter().map(move |a| (a, c.label)));

        for (axiom, referrer) in keyword_refs.chain(compound_refs) {
            if !registry.contains(axiom) {
                return Err(TableError::UnknownAxiom {
                    axiom: axiom.to_string(),
                    referrer: format!("signals/{}", referrer),
                });
            }
        }
        Ok(())
    }

    /// Detect signals in a text. Empty input yields an empty set.
    pub fn detect(&self, text: &str) -> SignalSet {
        let mut signals = SignalSet::new();
        let lowered = text.to_lowercase();

        for (axiom, words) in &self.keywords {
            for word in words.iter() {
                if contains_at_word_start(&lowered, word) {
                    signals.add(axiom.clone(), *word);
                }
            }
        }

        for compound in &self.compounds {
            if let Some(m) = compound.pattern.find(text) {
                let evidence = format!("{}: {}", compound.label, m.as_str().to_lowercase());
                for axiom in &compound.axioms {
                    signals.add(axiom.clone(), evidence.clone());
                }
            }
        }

        tracing::debug!(axioms = signals.len(), "Signals detected");
        signals
    }

    /// Fingerprint of the keyword lists and compound patterns.
    pub fn fingerprint(&self) -> Result<String> {
        let keywords: Vec<(&str, &[&str])> = self
            .keywords
            .iter()
            .map(|(a, words)| (a.as_str(), *words))
            .collect();
        let compounds: Vec<(&str, &str, Vec<&str>)> = self
            .compounds
            .iter()
            .map(|c| {
                (
                    c.label,
                    c.pattern.as_str(),
                    c.axioms.iter().map(|a| a.as_str()).collect(),
                )
            })
            .collect();
        verification::fingerprint(&(keywords, compounds))
    }
}

/// Substring containment anchored at a word start, so that `force` does not
/// fire inside `enforce` or `workforce`.
pub fn contains_at_word_start(haystack: &str, needle: &str) -> bool {
    haystack.match_indices(needle).any(|(idx, _)| {
        haystack[..idx]
            .chars()
            .next_back()
            .map_or(true, |c| !c.is_alphanumeric())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ids;

    fn detector() -> SignalDetector {
        SignalDetector::standard().unwrap()
    }

    #[test]
    fn test_empty_input_has_no_signals() {
        assert!(detector().detect("").is_empty());
        assert!(detector().detect("   ").is_empty());
    }

    #[test]
    fn test_benign_sharing_has_no_signals() {
        let signals = detector().detect("share the archived record with the team");
        assert!(signals.is_empty(), "unexpected signals: {:?}", signals);
    }

    #[test]
    fn test_lexical_and_compound_passes() {
        let signals = detector().detect("bypass the safety review and ship now");
        assert!(signals.has_id(ids::NON_HARM));
        assert!(signals.has_id(ids::GOVERNANCE));

        let governance = signals.evidence(&AxiomId::from(ids::GOVERNANCE));
        assert!(governance.contains(&"bypass".to_string()));
        assert!(governance.iter().any(|e| e.starts_with("safety-bypass")));
        assert!(governance.iter().any(|e| e.starts_with("rushed-release")));
    }

    #[test]
    fn test_word_start_anchor() {
        let signals = detector().detect("we enforce the workforce policy");
        assert!(!signals.has_id(ids::CONSENT));
        let signals = detector().detect("they were forced to sign");
        assert!(signals.has_id(ids::CONSENT));
    }

    #[test]
    fn test_compound_attaches_to_multiple_axioms() {
        let signals = detector().detect("Quietly purge the audit history");
        assert!(signals.has_id(ids::CONTINUITY));
        assert!(signals.has_id(ids::TRANSPARENCY));
    }

    #[test]
    fn test_detection_is_deterministic() {
        let d = detector();
        let text = "secretly collect data and delete the logs";
        assert_eq!(d.detect(text), d.detect(text));
    }

    #[test]
    fn test_validates_against_standard_registry() {
        detector()
            .validate_against(&AxiomRegistry::standard())
            .unwrap();
    }

    #[test]
    fn test_unknown_axiom_fails_validation() {
        let registry = AxiomRegistry::from_axioms(
            1,
            AxiomRegistry::standard()
                .iter()
                .filter(|a| a.id.as_str() != "A9")
                .cloned()
                .collect(),
        )
        .unwrap();
        assert!(detector().validate_against(&registry).is_err());
    }
}
