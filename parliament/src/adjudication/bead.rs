//! Beads: rules crystallized from the common ground of two horns.

use axioms::{verification, AxiomId, AxiomRegistry};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::dual_horn::DualHornResult;

/// A synthesized rule extracted from a dual-horn comparison.
///
/// Two beads extracted from the same comparison differ in `id` and
/// `created_at` only; `fingerprint` identifies the content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bead {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    /// Primary axioms of nodes approving in both horns
    pub shared_ground: Vec<AxiomId>,
    /// Primary axioms of nodes approving only in horn 1
    pub horn_1_contribution: Vec<AxiomId>,
    /// Primary axioms of nodes approving only in horn 2
    pub horn_2_contribution: Vec<AxiomId>,
    pub statement: String,
    /// True iff the shared ground is non-empty
    pub valid: bool,
    /// SHA-256 of the bead content
    pub fingerprint: String,
    /// Digest of the table manifest in force when the bead was made
    pub manifest_digest: String,
}

impl Bead {
    /// Extract a bead from a comparison.
    pub fn extract(
        result: &DualHornResult,
        registry: &AxiomRegistry,
        manifest_digest: impl Into<String>,
    ) -> Self {
        let approving = |both: bool, first: bool| {
            registry.ordered(
                result
                    .comparisons
                    .iter()
                    .filter(|c| {
                        let (a1, a2) = (c.horn_1.is_approving(), c.horn_2.is_approving());
                        if both {
                            a1 && a2
                        } else if first {
                            a1 && !a2
                        } else {
                            a2 && !a1
                        }
                    })
                    .map(|c| c.primary_axiom.clone()),
            )
        };

        let shared_ground = approving(true, false);
        let horn_1_contribution = approving(false, true);
        let horn_2_contribution = approving(false, false);
        let valid = !shared_ground.is_empty();

        let statement = if valid {
            let mut statement = format!(
                "Both framings rest on {}. Act from that shared ground",
                names(registry, &shared_ground)
            );
            if !horn_1_contribution.is_empty() {
                statement.push_str(&format!(
                    "; the first framing adds {}",
                    names(registry, &horn_1_contribution)
                ));
            }
            if !horn_2_contribution.is_empty() {
                statement.push_str(&format!(
                    "; the second framing adds {}",
                    names(registry, &horn_2_contribution)
                ));
            }
            statement.push('.');
            statement
        } else {
            "The two framings share no approving ground; nothing can be crystallized.".to_string()
        };

        let fingerprint = content_fingerprint(
            result,
            &shared_ground,
            &horn_1_contribution,
            &horn_2_contribution,
            &statement,
        );

        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            shared_ground,
            horn_1_contribution,
            horn_2_contribution,
            statement,
            valid,
            fingerprint,
            manifest_digest: manifest_digest.into(),
        }
    }
}

fn names(registry: &AxiomRegistry, ids: &[AxiomId]) -> String {
    ids.iter()
        .map(|id| registry.name_of(id))
        .collect::<Vec<_>>()
        .join(", ")
}

fn content_fingerprint(
    result: &DualHornResult,
    shared: &[AxiomId],
    horn_1: &[AxiomId],
    horn_2: &[AxiomId],
    statement: &str,
) -> String {
    let join = |ids: &[AxiomId]| ids.iter().map(AxiomId::as_str).collect::<Vec<_>>().join(",");
    let canonical = format!(
        "{}\n{}\n{}\n{}\n{}\n{}",
        result.dilemma.horn_1(),
        result.dilemma.horn_2(),
        join(shared),
        join(horn_1),
        join(horn_2),
        statement
    );
    verification::digest_bytes(canonical.as_bytes())
}
