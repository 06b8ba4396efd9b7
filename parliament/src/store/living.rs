//! Living axiom store.
//!
//! The permanent record of crystallized beads. Entries are appended once and
//! never edited or removed. Appending a bead whose content is already present
//! is a skip, so a retried adjudication never writes a mutated duplicate.

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::log::AppendLog;
use crate::adjudication::Bead;
use crate::types::Result;

const KIND: &str = "bead";

/// What happened to a bead offered to the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BeadOutcome {
    /// Written for the first time
    Crystallized,
    /// Same content already stored; nothing written
    AlreadyPresent,
    /// Not valid; never written
    Invalid,
    /// Write failed; the verdict stands without it
    Failed { reason: String },
}

/// Append-only store of beads.
#[derive(Debug)]
pub struct LivingAxiomStore {
    log: AppendLog,
    known: Mutex<HashSet<String>>,
}

impl LivingAxiomStore {
    /// Open a store over `log`, indexing the beads already in it.
    pub fn open(log: AppendLog) -> Result<Self> {
        let known = log
            .read::<Bead>(KIND)?
            .into_iter()
            .map(|bead| bead.fingerprint)
            .collect();
        Ok(Self {
            log,
            known: Mutex::new(known),
        })
    }

    pub fn in_memory() -> Self {
        Self {
            log: AppendLog::in_memory(),
            known: Mutex::new(HashSet::new()),
        }
    }

    /// Offer a bead. Only valid beads with unseen content are written.
    pub fn append(&self, bead: &Bead) -> BeadOutcome {
        if !bead.valid {
            return BeadOutcome::Invalid;
        }

        let mut known = self.known.lock().unwrap_or_else(PoisonError::into_inner);
        if known.contains(&bead.fingerprint) {
            info!(fingerprint = %bead.fingerprint, "Bead already crystallized, skipping");
            return BeadOutcome::AlreadyPresent;
        }

        match self.log.append(KIND, bead) {
            Ok(()) => {
                known.insert(bead.fingerprint.clone());
                info!(
                    bead = %bead.id,
                    shared_ground = bead.shared_ground.len(),
                    "Bead crystallized"
                );
                BeadOutcome::Crystallized
            }
            Err(e) => {
                warn!(bead = %bead.id, error = %e, "Failed to persist bead");
                BeadOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Every stored bead, in write order.
    pub fn beads(&self) -> Result<Vec<Bead>> {
        self.log.read(KIND)
    }

    pub fn len(&self) -> usize {
        self.known.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
