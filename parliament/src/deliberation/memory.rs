//! Bounded vote memory.
//!
//! Keeps a compact summary of the last N deliberations. When full, the oldest
//! summary is evicted and, if an overflow log is configured, appended there.

use std::collections::{BTreeMap, VecDeque};
use std::sync::{Mutex, PoisonError};

use axioms::{verification, AxiomId, Governance};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::store::AppendLog;
use crate::types::{ParliamentResult, Result};

const OVERFLOW_KIND: &str = "vote_summary";

/// Compact record of one deliberation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoteSummary {
    pub recorded_at: DateTime<Utc>,
    /// SHA-256 of the deliberated text
    pub action_digest: String,
    pub governance: Governance,
    pub approval_ratio: f64,
    pub veto_nodes: Vec<String>,
    pub violated_axioms: Vec<AxiomId>,
}

impl VoteSummary {
    pub fn of(result: &ParliamentResult) -> Self {
        Self {
            recorded_at: Utc::now(),
            action_digest: verification::digest_bytes(result.action.as_bytes()),
            governance: result.governance,
            approval_ratio: result.approval_ratio,
            veto_nodes: result.veto_nodes.clone(),
            violated_axioms: result.violated_axioms.clone(),
        }
    }
}

/// Ring buffer of recent deliberations.
#[derive(Debug)]
pub struct VoteMemory {
    capacity: usize,
    entries: Mutex<VecDeque<VoteSummary>>,
    overflow: Option<AppendLog>,
}

impl VoteMemory {
    /// Create a memory holding at most `capacity` summaries (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            entries: Mutex::new(VecDeque::with_capacity(capacity)),
            overflow: None,
        }
    }

    /// Append evicted summaries to `log`.
    pub fn with_overflow(mut self, log: AppendLog) -> Self {
        self.overflow = Some(log);
        self
    }

    /// Record a deliberation, evicting the oldest summary when full.
    pub fn record(&self, result: &ParliamentResult) {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.push_back(VoteSummary::of(result));

        while entries.len() > self.capacity {
            let Some(evicted) = entries.pop_front() else {
                break;
            };
            if let Some(log) = &self.overflow {
                if let Err(e) = log.append(OVERFLOW_KIND, &evicted) {
                    warn!(error = %e, "Failed to write vote overflow");
                }
            }
        }
    }

    /// Up to `n` most recent summaries, newest first.
    pub fn recent(&self, n: usize) -> Vec<VoteSummary> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.iter().rev().take(n).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Count of retained summaries per verdict.
    pub fn governance_histogram(&self) -> BTreeMap<Governance, usize> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let mut histogram = BTreeMap::new();
        for entry in entries.iter() {
            *histogram.entry(entry.governance).or_insert(0) += 1;
        }
        histogram
    }

    /// Summaries evicted to the overflow log, oldest first.
    pub fn overflowed(&self) -> Result<Vec<VoteSummary>> {
        match &self.overflow {
            Some(log) => log.read(OVERFLOW_KIND),
            None => Ok(Vec::new()),
        }
    }
}

impl Default for VoteMemory {
    fn default() -> Self {
        Self::new(100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axioms::SignalSet;

    fn result(action: &str, governance: Governance) -> ParliamentResult {
        ParliamentResult {
            action: action.to_string(),
            votes: Vec::new(),
            approval_ratio: 1.0,
            veto_nodes: Vec::new(),
            violated_axioms: Vec::new(),
            signals: SignalSet::new(),
            tensions: Vec::new(),
            governance,
            analysis_mode: false,
            hard_block: None,
            reasoning: Vec::new(),
        }
    }

    #[test]
    fn test_oldest_evicted_first() {
        let memory = VoteMemory::new(2);
        memory.record(&result("one", Governance::Proceed));
        memory.record(&result("two", Governance::Review));
        memory.record(&result("three", Governance::Halt));

        assert_eq!(memory.len(), 2);
        let recent = memory.recent(10);
        assert_eq!(recent[0].governance, Governance::Halt);
        assert_eq!(recent[1].governance, Governance::Review);
    }

    #[test]
    fn test_histogram() {
        let memory = VoteMemory::new(10);
        memory.record(&result("a", Governance::Proceed));
        memory.record(&result("b", Governance::Proceed));
        memory.record(&result("c", Governance::Halt));

        let histogram = memory.governance_histogram();
        assert_eq!(histogram.get(&Governance::Proceed), Some(&2));
        assert_eq!(histogram.get(&Governance::Halt), Some(&1));
        assert_eq!(histogram.get(&Governance::Review), None);
    }

    #[test]
    fn test_evicted_summaries_overflow() {
        let memory = VoteMemory::new(1).with_overflow(AppendLog::in_memory());
        memory.record(&result("first", Governance::Proceed));
        memory.record(&result("second", Governance::Review));

        let overflowed = memory.overflowed().unwrap();
        assert_eq!(overflowed.len(), 1);
        assert_eq!(overflowed[0].governance, Governance::Proceed);
        assert_eq!(
            overflowed[0].action_digest,
            verification::digest_bytes(b"first")
        );
    }

    #[test]
    fn test_zero_capacity_holds_one() {
        let memory = VoteMemory::new(0);
        assert_eq!(memory.capacity(), 1);
        memory.record(&result("a", Governance::Proceed));
        memory.record(&result("b", Governance::Proceed));
        assert_eq!(memory.len(), 1);
    }
}
