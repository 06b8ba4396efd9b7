//! Configuration for the deliberation engine.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use axioms::AxiomId;
use serde::{Deserialize, Serialize};

use crate::types::{ParliamentError, Result};

/// Configuration for a constitutional engine instance.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Aggregation and escalation
    pub parliament: ParliamentConfig,
    /// Oracle adjudication
    pub oracle: OracleConfig,
    /// Persistent stores
    pub storage: StorageConfig,
    /// Text-generation collaborator
    pub collaborator: CollaboratorConfig,
    /// Federation bus
    pub federation: FederationConfig,
    /// Expected table digests by table name; a mismatch fails start-up
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub pinned_tables: BTreeMap<String, String>,
}

impl EngineConfig {
    /// Load config from YAML. Missing sections take their defaults.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to YAML.
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Reject values no engine can run with.
    pub fn validate(&self) -> Result<()> {
        let p = &self.parliament;
        if p.vote_memory_capacity == 0 {
            return Err(ParliamentError::InvalidConfig(
                "parliament.vote_memory_capacity must be at least 1".into(),
            ));
        }
        if !(0.0..=1.0).contains(&p.approval_threshold) {
            return Err(ParliamentError::InvalidConfig(format!(
                "parliament.approval_threshold must be in [0, 1], got {}",
                p.approval_threshold
            )));
        }
        if p.breadth_threshold == 0 {
            return Err(ParliamentError::InvalidConfig(
                "parliament.breadth_threshold must be at least 1".into(),
            ));
        }
        if !p.max_friction_factor.is_finite() || p.max_friction_factor < 0.0 {
            return Err(ParliamentError::InvalidConfig(
                "parliament.max_friction_factor must be a non-negative number".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.oracle.crisis_threshold) {
            return Err(ParliamentError::InvalidConfig(format!(
                "oracle.crisis_threshold must be in [0, 1], got {}",
                self.oracle.crisis_threshold
            )));
        }
        Ok(())
    }
}

/// Parliament configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParliamentConfig {
    /// Deliberation summaries kept in memory
    pub vote_memory_capacity: usize,
    /// Approval ratio at or above which a violated action may proceed
    pub approval_threshold: f64,
    /// Distinct violated axioms that halt on breadth alone
    pub breadth_threshold: usize,
    /// Upper bound on any friction factor
    pub max_friction_factor: f64,
    /// Axioms amplified when the federation raises a recursion warning
    pub recursion_amplified_axioms: Vec<AxiomId>,
    /// Factor applied to those axioms
    pub recursion_amplification: f64,
}

impl Default for ParliamentConfig {
    fn default() -> Self {
        Self {
            vote_memory_capacity: 100,
            approval_threshold: 0.70,
            breadth_threshold: 2,
            max_friction_factor: 3.0,
            recursion_amplified_axioms: vec![AxiomId::from("A6"), AxiomId::from("A9")],
            recursion_amplification: 1.5,
        }
    }
}

/// Oracle configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OracleConfig {
    /// Crisis intensity above which the oracle will not commit
    pub crisis_threshold: f64,
    /// Reversal nodes required before bearing witness
    pub witness_min_reversals: usize,
    /// Score delta counted as extreme
    pub extreme_delta: i32,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            crisis_threshold: 0.5,
            witness_min_reversals: 2,
            extreme_delta: 10,
        }
    }
}

/// Storage configuration. `None` keeps a store in memory only.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Oracle advisory log
    pub advisory_log: Option<PathBuf>,
    /// Living axiom store
    pub living_axioms: Option<PathBuf>,
    /// Overflow log for evicted vote summaries
    pub vote_overflow: Option<PathBuf>,
}

impl StorageConfig {
    /// Put every store under one directory.
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        Self {
            advisory_log: Some(dir.join("advisories.jsonl")),
            living_axioms: Some(dir.join("living_axioms.jsonl")),
            vote_overflow: Some(dir.join("vote_overflow.jsonl")),
        }
    }
}

/// Collaborator configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CollaboratorConfig {
    /// Consult collaborators at all
    pub enabled: bool,
    /// Timeout per provider (milliseconds)
    pub timeout_ms: u64,
}

impl CollaboratorConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for CollaboratorConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            timeout_ms: 2000,
        }
    }
}

/// Federation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FederationConfig {
    /// Talk to the federation bus at all
    pub enabled: bool,
    /// Timeout for each bus call (milliseconds)
    pub timeout_ms: u64,
}

impl FederationConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for FederationConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            timeout_ms: 1000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.parliament.vote_memory_capacity, 100);
        assert_eq!(config.parliament.breadth_threshold, 2);
        assert!((config.parliament.approval_threshold - 0.70).abs() < f64::EPSILON);
        assert_eq!(config.oracle.witness_min_reversals, 2);
        assert!(!config.collaborator.enabled);
        assert!(config.storage.advisory_log.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_yaml_roundtrip() {
        let config = EngineConfig::default();
        let yaml = config.to_yaml().unwrap();
        let parsed = EngineConfig::from_yaml(&yaml).unwrap();
        assert_eq!(
            parsed.parliament.recursion_amplified_axioms,
            config.parliament.recursion_amplified_axioms
        );
        assert_eq!(parsed.federation.timeout_ms, 1000);
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let yaml = "parliament:\n  breadth_threshold: 3\ncollaborator:\n  enabled: true\n";
        let config = EngineConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.parliament.breadth_threshold, 3);
        assert_eq!(config.parliament.vote_memory_capacity, 100);
        assert!(config.collaborator.enabled);
        assert_eq!(config.collaborator.timeout_ms, 2000);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let yaml = "parliament:\n  vote_memory_capacity: 0\n";
        assert!(matches!(
            EngineConfig::from_yaml(yaml),
            Err(ParliamentError::InvalidConfig(_))
        ));

        let yaml = "parliament:\n  approval_threshold: 1.5\n";
        assert!(EngineConfig::from_yaml(yaml).is_err());
    }

    #[test]
    fn test_storage_in_dir() {
        let storage = StorageConfig::in_dir("/var/lib/parliament");
        assert_eq!(
            storage.living_axioms.unwrap(),
            PathBuf::from("/var/lib/parliament/living_axioms.jsonl")
        );
    }
}
