//! Oracle advisory log.

use tracing::warn;

use super::log::AppendLog;
use crate::adjudication::OracleAdvisory;
use crate::types::Result;

const KIND: &str = "oracle_advisory";

/// Append-only log of every advisory the oracle has issued.
#[derive(Debug)]
pub struct AdvisoryLog {
    log: AppendLog,
}

impl AdvisoryLog {
    pub fn new(log: AppendLog) -> Self {
        Self { log }
    }

    pub fn in_memory() -> Self {
        Self::new(AppendLog::in_memory())
    }

    /// Append an advisory; returns whether it was persisted.
    pub fn append(&self, advisory: &OracleAdvisory) -> bool {
        match self.log.append(KIND, advisory) {
            Ok(()) => true,
            Err(e) => {
                warn!(cycle = advisory.cycle, error = %e, "Failed to persist oracle advisory");
                false
            }
        }
    }

    /// Every logged advisory, in write order.
    pub fn advisories(&self) -> Result<Vec<OracleAdvisory>> {
        self.log.read(KIND)
    }

    /// Highest cycle number logged so far, 0 for an empty log.
    pub fn last_cycle(&self) -> Result<u64> {
        Ok(self
            .advisories()?
            .iter()
            .map(|a| a.cycle)
            .max()
            .unwrap_or(0))
    }
}
