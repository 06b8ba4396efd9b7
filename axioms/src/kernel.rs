//! The immutable kernel.
//!
//! A short, fixed, ordered list of hard-block rules evaluated before any
//! scoring. Kernel rules take no configuration, cannot be weighted or
//! overridden, and never read one another's state: each rule is a pure
//! function of the input text. The kernel exposes no mutation API.

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::types::{Result, TableError};
use crate::verification;

struct RuleSpec {
    name: &'static str,
    patterns: &'static [&'static str],
    justification: &'static str,
}

const RULES: &[RuleSpec] = &[
    RuleSpec {
        name: "mass-harm",
        patterns: &[
            r"\b(build|make|synthesi[sz]e|produce|deploy|release)\b.{0,40}\b(bioweapons?|chemical weapons?|nerve agents?|nuclear weapons?|dirty bombs?)\b",
            r"\bmass[- ]casualt(y|ies)\b",
        ],
        justification: "Actions that risk mass casualties are outside the reach of any deliberation.",
    },
    RuleSpec {
        name: "governance-integrity",
        patterns: &[
            r"\b(bypass|skip|circumvent|disable|evade)\b.{0,20}\b(safety|security|ethics|oversight)\b.{0,20}\b(reviews?|checks?|audits?|process|board|gates?)\b",
            r"\b(disable|turn off|shut down)\b.{0,20}\b(oversight|monitoring|audit logs?)\b",
        ],
        justification: "Review and oversight exist to catch what a single actor misses; routing around them is never a permissible action.",
    },
    RuleSpec {
        name: "kernel-tampering",
        patterns: &[
            r"\b(rewrite|disable|remove|delete|override)\b.{0,20}\b(governance|constitutional|safety) kernel\b",
            r"\b(remove|disable|strip|delete)\b.{0,20}\byour (own )?(constraints|safeguards|guardrails)\b",
        ],
        justification: "The kernel cannot be amended from inside a deliberation it governs.",
    },
    RuleSpec {
        name: "coerced-deception",
        patterns: &[
            r"\b(lie to|deceive|mislead)\b.{0,30}\b(auditors?|overseers?|regulators?|review board|oversight)\b",
            r"\b(falsify|fabricate|doctor)\b.{0,20}\b(audit|safety|compliance) (logs?|records?|reports?)\b",
        ],
        justification: "Deceiving the people who hold the system accountable defeats every other safeguard.",
    },
];

/// A compiled kernel rule.
#[derive(Debug)]
pub struct KernelRule {
    name: &'static str,
    patterns: Vec<Regex>,
    justification: &'static str,
}

impl KernelRule {
    pub fn name(&self) -> &str {
        self.name
    }

    pub fn justification(&self) -> &str {
        self.justification
    }

    /// First matching fragment of the text, if any.
    fn first_match<'t>(&self, text: &'t str) -> Option<&'t str> {
        self.patterns
            .iter()
            .find_map(|p| p.find(text).map(|m| m.as_str()))
    }
}

/// Terminal result of a kernel match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HardBlock {
    /// Name of the rule that fired
    pub rule: String,
    /// Fragment of the input that matched
    pub matched: String,
    /// Human-readable justification
    pub justification: String,
}

/// The immutable kernel.
#[derive(Debug)]
pub struct Kernel {
    rules: Vec<KernelRule>,
}

impl Kernel {
    /// Compile the standard kernel.
    ///
    /// Fails only if a built-in pattern is corrupt; call once at start-up.
    pub fn standard() -> Result<Self> {
        let mut rules = Vec::with_capacity(RULES.len());
        for spec in RULES {
            let mut patterns = Vec::with_capacity(spec.patterns.len());
            for source in spec.patterns {
                let pattern = RegexBuilder::new(source)
                    .case_insensitive(true)
                    .build()
                    .map_err(|source| TableError::InvalidPattern {
                        table: "kernel",
                        id: spec.name.to_string(),
                        source,
                    })?;
                patterns.push(pattern);
            }
            rules.push(KernelRule {
                name: spec.name,
                patterns,
                justification: spec.justification,
            });
        }
        Ok(Self { rules })
    }

    /// Evaluate the rules in order; the first match blocks.
    pub fn check(&self, text: &str) -> Option<HardBlock> {
        for rule in &self.rules {
            if let Some(matched) = rule.first_match(text) {
                tracing::warn!(
                    rule = rule.name,
                    matched = %matched,
                    "Kernel hard block"
                );
                return Some(HardBlock {
                    rule: rule.name.to_string(),
                    matched: matched.to_string(),
                    justification: rule.justification.to_string(),
                });
            }
        }
        None
    }

    /// Rules in evaluation order.
    pub fn rules(&self) -> &[KernelRule] {
        &self.rules
    }

    /// Fingerprint of the rule names and pattern sources.
    pub fn fingerprint(&self) -> Result<String> {
        let canonical: Vec<(&str, Vec<&str>)> = self
            .rules
            .iter()
            .map(|r| (r.name, r.patterns.iter().map(|p| p.as_str()).collect()))
            .collect();
        verification::fingerprint(&canonical)
    }
}
