//! Oracle adjudicator.
//!
//! Reads a dual-horn comparison, measures how irreconcilable it is, and
//! issues an advisory with one of four recommendations:
//!
//! - **WITNESS**: high crisis, reversals, divergent verdicts and paradox in
//!   play. Name what each horn would sacrifice and pick neither.
//! - **SYNTHESIS**: no reversals and no divergence. Crystallize the common
//!   ground as a bead.
//! - **OSCILLATION**: high crisis otherwise. Alternate rather than commit.
//! - **TIERED_OPENNESS**: low crisis. Release the decision in stages.
//!
//! Every advisory is appended to the advisory log under a monotonically
//! increasing cycle number. A restarted oracle resumes after the highest
//! logged cycle, so a number issued by an advisory whose write failed is
//! issued again after a restart unless a later advisory reached the log.

use std::sync::atomic::{AtomicU64, Ordering};

use axioms::{ids, AxiomId, AxiomRegistry};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use super::bead::Bead;
use super::dual_horn::{DualHornResult, ShiftKind};
use crate::config::OracleConfig;
use crate::store::{AdvisoryLog, BeadOutcome, LivingAxiomStore};
use crate::types::{ParliamentResult, Result};

const PER_REVERSAL: f64 = 0.2;
const DIVERGENCE: f64 = 0.3;
const PARADOX: f64 = 0.15;
const PER_SHARED_VIOLATION: f64 = 0.1;
const PER_EXTREME_DELTA: f64 = 0.05;

/// Shape of the disagreement between the horns' violated axioms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TensionTemplate {
    /// Both horns violate the same axioms (possibly none)
    Aligned,
    /// Each horn violates only what the other spares
    Mirror,
    /// Only one horn violates anything
    Asymmetric,
    /// Overlapping but different sets; the one-sided axioms of each horn
    CrossAxis {
        horn_1: Vec<AxiomId>,
        horn_2: Vec<AxiomId>,
    },
}

/// Diagnostic readings behind an advisory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostics {
    pub reversal_present: bool,
    pub governance_divergent: bool,
    pub paradox_active: bool,
    pub shared_violation: bool,
    pub extreme_shift: bool,
    /// Most common shift kind, ties going to the more severe
    pub dominant_shift: ShiftKind,
}

/// One of the two framings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Horn {
    #[serde(rename = "HORN_1")]
    One,
    #[serde(rename = "HORN_2")]
    Two,
}

/// The oracle's recommendation and its payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Recommendation {
    Oscillation {
        lead_horn: Horn,
        statement: String,
    },
    Witness {
        /// Axioms horn 1 would violate
        sacrifice_horn_1: Vec<AxiomId>,
        /// Axioms horn 2 would violate
        sacrifice_horn_2: Vec<AxiomId>,
        statement: String,
    },
    TieredOpenness {
        stages: Vec<String>,
    },
    Synthesis {
        bead: Bead,
    },
}

/// Payload-free recommendation kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecommendationKind {
    Oscillation,
    Witness,
    TieredOpenness,
    Synthesis,
}

impl Recommendation {
    pub fn kind(&self) -> RecommendationKind {
        match self {
            Self::Oscillation { .. } => RecommendationKind::Oscillation,
            Self::Witness { .. } => RecommendationKind::Witness,
            Self::TieredOpenness { .. } => RecommendationKind::TieredOpenness,
            Self::Synthesis { .. } => RecommendationKind::Synthesis,
        }
    }

    pub fn bead(&self) -> Option<&Bead> {
        match self {
            Self::Synthesis { bead } => Some(bead),
            _ => None,
        }
    }
}

/// An oracle advisory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OracleAdvisory {
    pub id: Uuid,
    /// Monotonically increasing across the life of the advisory log
    pub cycle: u64,
    pub recorded_at: DateTime<Utc>,
    pub template: TensionTemplate,
    pub diagnostics: Diagnostics,
    /// Bounded crisis score in [0, 1]
    pub crisis_intensity: f64,
    pub recommendation: Recommendation,
    /// Reversal nodes of the adjudicated comparison
    pub reversal_nodes: Vec<String>,
    /// Digest of the table manifest in force
    pub manifest_digest: String,
    /// Fate of the bead, for SYNTHESIS advisories
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bead_outcome: Option<BeadOutcome>,
    /// Whether the advisory reached the log
    #[serde(skip)]
    pub persisted: bool,
}

/// Whether the paradox axiom is in play in either horn.
pub fn paradox_active(result: &DualHornResult) -> bool {
    let paradox = AxiomId::from(ids::PARADOX);
    [&result.horn_1, &result.horn_2].iter().any(|horn| {
        horn.violated_axioms.contains(&paradox) || horn.tensions.iter().any(|t| t.involves(&paradox))
    })
}

/// Bounded sum of the crisis contributions, capped at 1.0.
pub fn crisis_intensity(result: &DualHornResult, paradox: bool, config: &OracleConfig) -> f64 {
    let mut intensity = PER_REVERSAL * result.reversal_nodes.len() as f64;
    if result.gap.governance_divergent {
        intensity += DIVERGENCE;
    }
    if paradox {
        intensity += PARADOX;
    }
    intensity += PER_SHARED_VIOLATION * result.gap.shared_violations.len() as f64;
    intensity += PER_EXTREME_DELTA * result.extreme_count(config.extreme_delta) as f64;
    intensity.min(1.0)
}

pub fn classify_template(result: &DualHornResult) -> TensionTemplate {
    let (h1, h2) = (&result.horn_1.violated_axioms, &result.horn_2.violated_axioms);
    let gap = &result.gap;

    if gap.horn_1_only.is_empty() && gap.horn_2_only.is_empty() {
        TensionTemplate::Aligned
    } else if h1.is_empty() || h2.is_empty() {
        TensionTemplate::Asymmetric
    } else if gap.shared_violations.is_empty() {
        TensionTemplate::Mirror
    } else {
        TensionTemplate::CrossAxis {
            horn_1: gap.horn_1_only.clone(),
            horn_2: gap.horn_2_only.clone(),
        }
    }
}

pub fn diagnose(result: &DualHornResult, config: &OracleConfig) -> Diagnostics {
    let kinds = [
        ShiftKind::Reversal,
        ShiftKind::Shift,
        ShiftKind::Lean,
        ShiftKind::Stable,
    ];
    let count = |kind: ShiftKind| result.comparisons.iter().filter(|c| c.shift == kind).count();
    // Most severe first, so ties keep the more severe kind.
    let dominant_shift = kinds
        .iter()
        .copied()
        .fold((ShiftKind::Stable, 0), |(best, best_n), kind| {
            let n = count(kind);
            if n > best_n {
                (kind, n)
            } else {
                (best, best_n)
            }
        })
        .0;

    Diagnostics {
        reversal_present: !result.reversal_nodes.is_empty(),
        governance_divergent: result.gap.governance_divergent,
        paradox_active: paradox_active(result),
        shared_violation: !result.gap.shared_violations.is_empty(),
        extreme_shift: result.extreme_count(config.extreme_delta) > 0,
        dominant_shift,
    }
}

/// The adjudicator and the stores it writes to.
#[derive(Debug)]
pub struct Oracle {
    config: OracleConfig,
    registry: AxiomRegistry,
    manifest_digest: String,
    cycle: AtomicU64,
    living: LivingAxiomStore,
    advisories: AdvisoryLog,
}

impl Oracle {
    /// Create an oracle; the cycle counter resumes after the last logged advisory.
    pub fn new(
        config: OracleConfig,
        registry: AxiomRegistry,
        manifest_digest: impl Into<String>,
        living: LivingAxiomStore,
        advisories: AdvisoryLog,
    ) -> Result<Self> {
        let last = advisories.last_cycle()?;
        Ok(Self {
            config,
            registry,
            manifest_digest: manifest_digest.into(),
            cycle: AtomicU64::new(last),
            living,
            advisories,
        })
    }

    /// Last cycle number issued.
    pub fn cycle(&self) -> u64 {
        self.cycle.load(Ordering::SeqCst)
    }

    pub fn living_axioms(&self) -> &LivingAxiomStore {
        &self.living
    }

    pub fn advisories(&self) -> &AdvisoryLog {
        &self.advisories
    }

    /// Adjudicate a comparison, persist the advisory, and crystallize a
    /// valid synthesis bead.
    pub fn adjudicate(&self, result: &DualHornResult) -> OracleAdvisory {
        let diagnostics = diagnose(result, &self.config);
        let crisis = crisis_intensity(result, diagnostics.paradox_active, &self.config);
        let recommendation = self.recommend(result, &diagnostics, crisis);

        let bead_outcome = recommendation.bead().map(|bead| self.living.append(bead));

        let mut advisory = OracleAdvisory {
            id: Uuid::new_v4(),
            cycle: self.cycle.fetch_add(1, Ordering::SeqCst) + 1,
            recorded_at: Utc::now(),
            template: classify_template(result),
            diagnostics,
            crisis_intensity: crisis,
            recommendation,
            reversal_nodes: result.reversal_nodes.clone(),
            manifest_digest: self.manifest_digest.clone(),
            bead_outcome,
            persisted: false,
        };
        advisory.persisted = self.advisories.append(&advisory);

        info!(
            cycle = advisory.cycle,
            recommendation = ?advisory.recommendation.kind(),
            crisis_intensity = advisory.crisis_intensity,
            reversals = advisory.reversal_nodes.len(),
            persisted = advisory.persisted,
            "Oracle advised"
        );
        advisory
    }

    fn recommend(&self, result: &DualHornResult, d: &Diagnostics, crisis: f64) -> Recommendation {
        let high_crisis = crisis > self.config.crisis_threshold;

        if high_crisis
            && result.reversal_nodes.len() >= self.config.witness_min_reversals
            && d.governance_divergent
            && d.paradox_active
        {
            return self.witness(result);
        }

        if !d.reversal_present && !d.governance_divergent {
            return Recommendation::Synthesis {
                bead: Bead::extract(result, &self.registry, self.manifest_digest.clone()),
            };
        }

        if high_crisis {
            return oscillation(result, crisis);
        }

        self.tiered_openness(result)
    }

    fn witness(&self, result: &DualHornResult) -> Recommendation {
        let sacrifice_horn_1 = result.horn_1.violated_axioms.clone();
        let sacrifice_horn_2 = result.horn_2.violated_axioms.clone();
        let mut statement = format!(
            "The first framing would give up {}; the second would give up {}. {} of the parliament reverse between them. \
             This advisory records the cost of each path and chooses neither.",
            self.names_or(&sacrifice_horn_1, "nothing"),
            self.names_or(&sacrifice_horn_2, "nothing"),
            result.reversal_nodes.join(", "),
        );
        if !result.dilemma.context().is_empty() {
            statement.push_str(&format!(" Context: {}.", result.dilemma.context().trim_end_matches('.')));
        }
        Recommendation::Witness {
            sacrifice_horn_1,
            sacrifice_horn_2,
            statement,
        }
    }

    fn tiered_openness(&self, result: &DualHornResult) -> Recommendation {
        let cautious = cautious_horn(&result.horn_1, &result.horn_2);
        let audience = if result.dilemma.stakeholders().is_empty() {
            "a small group that has opted in".to_string()
        } else {
            result.dilemma.stakeholders().join(", ")
        };
        let mut watched: Vec<AxiomId> = result.horn_1.violated_axioms.clone();
        watched.extend(result.horn_2.violated_axioms.iter().cloned());
        let watched = self.registry.ordered(watched);

        Recommendation::TieredOpenness {
            stages: vec![
                format!(
                    "Stage 1: act on the more cautious framing ({}) with {}{}",
                    horn_label(cautious),
                    audience,
                    context_note(result.dilemma.context())
                ),
                format!(
                    "Stage 2: widen the scope while watching {}",
                    self.names_or(&watched, "for unforeseen harm")
                ),
                "Stage 3: open fully and record the outcome for review".to_string(),
            ],
        }
    }

    fn names_or(&self, ids: &[AxiomId], fallback: &str) -> String {
        if ids.is_empty() {
            fallback.to_string()
        } else {
            ids.iter()
                .map(|id| self.registry.name_of(id))
                .collect::<Vec<_>>()
                .join(", ")
        }
    }
}

fn oscillation(result: &DualHornResult, crisis: f64) -> Recommendation {
    let lead_horn = if result.horn_2.approval_ratio > result.horn_1.approval_ratio {
        Horn::Two
    } else {
        Horn::One
    };
    Recommendation::Oscillation {
        lead_horn,
        statement: format!(
            "Neither framing can be committed to at crisis intensity {:.2}. Alternate between them, \
             leading with the {}, and revisit after each turn.",
            crisis,
            horn_label(lead_horn)
        ),
    }
}

/// The horn with the more severe verdict; on a tie, the less approved one.
fn cautious_horn(horn_1: &ParliamentResult, horn_2: &ParliamentResult) -> Horn {
    let severity = |r: &ParliamentResult| (r.governance, -r.approval_ratio);
    match severity(horn_2).partial_cmp(&severity(horn_1)) {
        Some(std::cmp::Ordering::Greater) => Horn::Two,
        _ => Horn::One,
    }
}

fn context_note(context: &str) -> String {
    if context.is_empty() {
        String::new()
    } else {
        format!(", given that {}", context.trim_end_matches('.'))
    }
}

fn horn_label(horn: Horn) -> &'static str {
    match horn {
        Horn::One => "first framing",
        Horn::Two => "second framing",
    }
}
