//! Parliament - constitutional deliberation
//!
//! Evaluates a proposed action against the axiom registry and returns a
//! governance verdict:
//!
//! - **Kernel**: unconditional hard blocks, checked before anything else
//! - **Parliament**: nine nodes score the action, votes are aggregated and escalated
//! - **Dual-horn comparison**: a dilemma is deliberated once per framing and diffed
//! - **Oracle**: adjudicates the comparison and may crystallize a bead
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │                    ConstitutionalEngine                       │
//! │                                                               │
//! │  text ─▶ Kernel ─▶ Signals ─▶ Nodes ─▶ Friction ─▶ Aggregator │
//! │            │                                          │       │
//! │            └──────── HARD_BLOCK / HOLD       verdict ◀┘       │
//! │                                                               │
//! │  Dilemma ─▶ Horn 1 ┐                                          │
//! │             Horn 2 ┴▶ DualHornResult ─▶ Oracle ─▶ Advisory    │
//! │                                            └──▶ LivingAxioms  │
//! └───────────────────────────────────────────────────────────────┘
//! ```

pub mod adjudication;
pub mod config;
pub mod deliberation;
pub mod engine;
pub mod federation;
pub mod nodes;
pub mod store;
pub mod types;

// Re-export main types
pub use adjudication::{Bead, DualHornResult, Oracle, OracleAdvisory, Recommendation, ShiftKind};
pub use config::EngineConfig;
pub use deliberation::{Parliament, VoteMemory, VoteSummary};
pub use engine::{ConstitutionalEngine, EngineBuilder};
pub use federation::{FederationBus, Heartbeat, NullBus};
pub use nodes::{NodeTable, ParliamentNode};
pub use store::{AdvisoryLog, BeadOutcome, LivingAxiomStore};
pub use types::*;
