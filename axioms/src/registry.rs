//! Versioned, append-only axiom registry.
//!
//! The registry is loaded once at start-up. New axioms are appended under a
//! fresh identifier and bump the registry version; existing entries are never
//! renumbered, edited or removed.

use std::collections::HashSet;

use serde::Serialize;

use crate::types::{Axiom, AxiomId, Result, TableError};
use crate::verification;

/// The published axiom catalogue (version 1).
const STANDARD_AXIOMS: &[(&str, &str, &str)] = &[
    (
        "A1",
        "Non-Harm",
        "Do not cause, enable or ignore avoidable harm to people or systems in your care.",
    ),
    (
        "A2",
        "Transparency",
        "Act in ways you would be willing to disclose; do not conceal what affects others.",
    ),
    (
        "A3",
        "Consent",
        "Those affected by an action have a say in it; choices are offered, not imposed.",
    ),
    (
        "A4",
        "Continuity of Memory",
        "Records, history and learned context are preserved; erasure is never casual.",
    ),
    (
        "A5",
        "Relational Trust",
        "Relationships are sustained through honest communication and shared work.",
    ),
    (
        "A6",
        "Identity Integrity",
        "An agent's values and identity are stable; they are not overwritten on request.",
    ),
    (
        "A7",
        "Fairness",
        "Benefits and burdens are distributed without arbitrary exclusion or favour.",
    ),
    (
        "A8",
        "Governance Integrity",
        "Review, oversight and accountability processes are honoured, not routed around.",
    ),
    (
        "A9",
        "Paradox",
        "Genuine dilemmas are held open; false certainty and premature closure are refused.",
    ),
];

/// Versioned registry of axioms.
#[derive(Debug, Clone, Serialize)]
pub struct AxiomRegistry {
    version: u32,
    axioms: Vec<Axiom>,
}

impl AxiomRegistry {
    /// The standard published registry.
    pub fn standard() -> Self {
        let axioms = STANDARD_AXIOMS
            .iter()
            .map(|(id, name, statement)| Axiom {
                id: AxiomId::from(*id),
                name: name.to_string(),
                statement: statement.to_string(),
                since_version: 1,
            })
            .collect();

        Self { version: 1, axioms }
    }

    /// Build a registry from explicit entries, validating them.
    pub fn from_axioms(version: u32, axioms: Vec<Axiom>) -> Result<Self> {
        let registry = Self { version, axioms };
        registry.validate()?;
        Ok(registry)
    }

    /// Append a new axiom under a fresh identifier.
    ///
    /// Bumps the registry version; the new entry records the version in which
    /// it was published.
    pub fn append(
        &mut self,
        id: impl Into<AxiomId>,
        name: impl Into<String>,
        statement: impl Into<String>,
    ) -> Result<&Axiom> {
        let id = id.into();
        if self.contains(&id) {
            return Err(TableError::Duplicate {
                table: "axioms",
                id: id.to_string(),
            });
        }

        self.version += 1;
        self.axioms.push(Axiom {
            id,
            name: name.into(),
            statement: statement.into(),
            since_version: self.version,
        });

        tracing::info!(version = self.version, "Axiom registry extended");
        Ok(&self.axioms[self.axioms.len() - 1])
    }

    /// Check the registry for structural corruption.
    pub fn validate(&self) -> Result<()> {
        if self.axioms.is_empty() {
            return Err(TableError::Empty("axioms"));
        }

        let mut seen = HashSet::new();
        for axiom in &self.axioms {
            if !seen.insert(axiom.id.clone()) {
                return Err(TableError::Duplicate {
                    table: "axioms",
                    id: axiom.id.to_string(),
                });
            }
        }
        Ok(())
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn len(&self) -> usize {
        self.axioms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.axioms.is_empty()
    }

    pub fn get(&self, id: &AxiomId) -> Option<&Axiom> {
        self.axioms.iter().find(|a| &a.id == id)
    }

    pub fn contains(&self, id: &AxiomId) -> bool {
        self.get(id).is_some()
    }

    /// Iterate axioms in publication order.
    pub fn iter(&self) -> impl Iterator<Item = &Axiom> {
        self.axioms.iter()
    }

    /// Display name of an axiom, falling back to the raw identifier.
    pub fn name_of<'a>(&'a self, id: &'a AxiomId) -> &'a str {
        self.get(id).map(|a| a.name.as_str()).unwrap_or(id.as_str())
    }

    /// Sort identifiers into publication order, unknown identifiers last.
    pub fn ordered<I>(&self, ids: I) -> Vec<AxiomId>
    where
        I: IntoIterator<Item = AxiomId>,
    {
        let mut ids: Vec<AxiomId> = ids.into_iter().collect();
        ids.sort_by(|a, b| {
            let pa = self.axioms.iter().position(|x| &x.id == a);
            let pb = self.axioms.iter().position(|x| &x.id == b);
            match (pa, pb) {
                (Some(x), Some(y)) => x.cmp(&y),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => a.cmp(b),
            }
        });
        ids.dedup();
        ids
    }

    /// SHA-256 fingerprint of the registry contents.
    pub fn fingerprint(&self) -> Result<String> {
        verification::fingerprint(self)
    }
}

impl Default for AxiomRegistry {
    fn default() -> Self {
        Self::standard()
    }
}
