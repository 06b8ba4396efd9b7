//! Append-only persistent stores.
//!
//! - [`AppendLog`]: newline-delimited JSON records in self-describing envelopes
//! - [`LivingAxiomStore`]: crystallized beads, written once and never edited
//! - [`AdvisoryLog`]: every oracle advisory
//!
//! Write failures are logged and reported to the caller as values. The
//! in-memory verdict is authoritative whether or not it was persisted.

pub mod advisory;
pub mod living;
pub mod log;

pub use advisory::AdvisoryLog;
pub use living::{BeadOutcome, LivingAxiomStore};
pub use log::AppendLog;
