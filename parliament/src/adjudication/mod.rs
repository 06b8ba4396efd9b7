//! Adjudication of dilemmas.
//!
//! A dilemma is deliberated once per horn ([`DualHornResult`]) and the
//! comparison is handed to the [`Oracle`], which may crystallize a [`Bead`].

pub mod bead;
pub mod dual_horn;
pub mod oracle;

pub use bead::Bead;
pub use dual_horn::{DualHornResult, NodeComparison, ShiftKind, SynthesisGap};
pub use oracle::{
    Diagnostics, Horn, Oracle, OracleAdvisory, Recommendation, RecommendationKind,
    TensionTemplate,
};
