//! Axiom layer for the constitutional parliament.
//!
//! Everything the deliberation engine is evaluated *against* lives here:
//!
//! - **Registry**: versioned, append-only catalogue of axioms
//! - **Kernel**: unconditional hard-block rules evaluated before any scoring
//! - **Signals**: two-pass detector mapping text to per-axiom evidence
//! - **Tension**: fixed syntheses for pairs of axioms in disagreement
//! - **Verification**: SHA-256 fingerprints of every fixed table
//!
//! All tables are compiled once at start-up. Corruption surfaces as a
//! [`TableError`] from the constructors and never mid-call.
//!
//! # Example
//!
//! ```ignore
//! use axioms::{Kernel, SignalDetector};
//!
//! let kernel = Kernel::standard()?;
//! let detector = SignalDetector::standard()?;
//!
//! if let Some(block) = kernel.check(text) {
//!     return Err(block);
//! }
//! let signals = detector.detect(text);
//! ```

pub mod kernel;
pub mod registry;
pub mod signals;
pub mod tension;
pub mod types;
pub mod verification;

// Re-export main types
pub use kernel::{HardBlock, Kernel, KernelRule};
pub use registry::AxiomRegistry;
pub use signals::{SignalDetector, SignalSet};
pub use tension::{canonical_pair, TensionTable};
pub use types::*;
pub use verification::TableManifest;
