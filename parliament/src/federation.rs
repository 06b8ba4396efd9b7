//! Federation bus.
//!
//! Peers on the federation exchange a heartbeat carrying per-axiom friction
//! factors and a recursion warning, and receive each decision afterwards.
//! The bus is optional: no bus, or a failing bus, means no friction.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axioms::AxiomId;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::ParliamentConfig;
use crate::types::{ParliamentError, ParliamentResult, Result};

/// Friction signal pulled from the federation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Heartbeat {
    /// Per-axiom score multipliers
    #[serde(default)]
    pub friction_boost: BTreeMap<AxiomId, f64>,
    /// Peers report a recursion hazard
    #[serde(default)]
    pub recursion_warning: bool,
}

impl Heartbeat {
    /// No friction at all.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn with_boost(mut self, axiom: impl Into<AxiomId>, factor: f64) -> Self {
        self.friction_boost.insert(axiom.into(), factor);
        self
    }

    pub fn with_recursion_warning(mut self) -> Self {
        self.recursion_warning = true;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.friction_boost.is_empty() && !self.recursion_warning
    }

    /// Drop factors that are not finite non-negative numbers.
    pub fn sanitized(mut self) -> Self {
        self.friction_boost.retain(|axiom, factor| {
            let ok = factor.is_finite() && *factor >= 0.0;
            if !ok {
                warn!(axiom = %axiom, factor = *factor, "Dropping invalid friction factor");
            }
            ok
        });
        self
    }

    /// Friction factor for a node whose primary axiom is `axiom`.
    ///
    /// An explicit boost wins. Otherwise a recursion warning amplifies the
    /// configured axioms.
    pub fn factor_for(&self, axiom: &AxiomId, config: &ParliamentConfig) -> Option<f64> {
        if let Some(factor) = self.friction_boost.get(axiom) {
            return Some(*factor);
        }
        (self.recursion_warning && config.recursion_amplified_axioms.contains(axiom))
            .then_some(config.recursion_amplification)
    }
}

/// Bus connecting this engine to its federation peers.
#[async_trait]
pub trait FederationBus: Send + Sync {
    /// Pull the current friction heartbeat.
    async fn pull_heartbeat(&self) -> Result<Heartbeat>;

    /// Report a decision to peers.
    async fn push_decision(&self, result: &ParliamentResult) -> Result<()>;
}

/// A bus with no peers.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullBus;

#[async_trait]
impl FederationBus for NullBus {
    async fn pull_heartbeat(&self) -> Result<Heartbeat> {
        Ok(Heartbeat::none())
    }

    async fn push_decision(&self, _result: &ParliamentResult) -> Result<()> {
        Ok(())
    }
}

/// Pull a heartbeat under a timeout; any failure yields no friction.
pub async fn pull_heartbeat(bus: Option<&Arc<dyn FederationBus>>, timeout: Duration) -> Heartbeat {
    let Some(bus) = bus else {
        return Heartbeat::none();
    };

    match tokio::time::timeout(timeout, bus.pull_heartbeat()).await {
        Ok(Ok(heartbeat)) => {
            debug!(
                boosts = heartbeat.friction_boost.len(),
                recursion_warning = heartbeat.recursion_warning,
                "Heartbeat received"
            );
            heartbeat.sanitized()
        }
        Ok(Err(e)) => {
            warn!(error = %e, "Heartbeat pull failed, deliberating without friction");
            Heartbeat::none()
        }
        Err(_) => {
            warn!(
                timeout_ms = timeout.as_millis() as u64,
                "Heartbeat pull timed out, deliberating without friction"
            );
            Heartbeat::none()
        }
    }
}

/// Push a decision under a timeout. Best effort: failures are logged.
pub async fn push_decision(
    bus: Option<&Arc<dyn FederationBus>>,
    result: &ParliamentResult,
    timeout: Duration,
) -> bool {
    let Some(bus) = bus else {
        return false;
    };

    let outcome = match tokio::time::timeout(timeout, bus.push_decision(result)).await {
        Ok(outcome) => outcome,
        Err(_) => Err(ParliamentError::Federation(format!(
            "push timed out after {}ms",
            timeout.as_millis()
        ))),
    };

    match outcome {
        Ok(()) => true,
        Err(e) => {
            warn!(error = %e, governance = %result.governance, "Decision push failed");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingBus;

    #[async_trait]
    impl FederationBus for FailingBus {
        async fn pull_heartbeat(&self) -> Result<Heartbeat> {
            Err(ParliamentError::Federation("peer unreachable".into()))
        }

        async fn push_decision(&self, _result: &ParliamentResult) -> Result<()> {
            Err(ParliamentError::Federation("peer unreachable".into()))
        }
    }

    struct SlowBus;

    #[async_trait]
    impl FederationBus for SlowBus {
        async fn pull_heartbeat(&self) -> Result<Heartbeat> {
            tokio::time::sleep(Duration::from_millis(500)).await;
            Ok(Heartbeat::none().with_boost("A1", 2.0))
        }

        async fn push_decision(&self, _result: &ParliamentResult) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_factor_precedence() {
        let config = ParliamentConfig::default();
        let heartbeat = Heartbeat::none()
            .with_boost("A6", 2.0)
            .with_recursion_warning();

        assert_eq!(heartbeat.factor_for(&AxiomId::from("A6"), &config), Some(2.0));
        assert_eq!(heartbeat.factor_for(&AxiomId::from("A9"), &config), Some(1.5));
        assert_eq!(heartbeat.factor_for(&AxiomId::from("A1"), &config), None);
        assert_eq!(Heartbeat::none().factor_for(&AxiomId::from("A9"), &config), None);
    }

    #[test]
    fn test_sanitize_drops_invalid_factors() {
        let heartbeat = Heartbeat::none()
            .with_boost("A1", f64::NAN)
            .with_boost("A2", -1.0)
            .with_boost("A3", 1.2)
            .sanitized();
        assert_eq!(heartbeat.friction_boost.len(), 1);
        assert!(heartbeat.friction_boost.contains_key(&AxiomId::from("A3")));
    }

    #[test]
    fn test_heartbeat_tolerates_unknown_fields() {
        let json = r#"{"friction_boost": {"A6": 1.5}, "recursion_warning": true, "peer": "node-7"}"#;
        let heartbeat: Heartbeat = serde_json::from_str(json).unwrap();
        assert!(heartbeat.recursion_warning);
        assert!(!heartbeat.is_empty());
    }

    #[tokio::test]
    async fn test_absent_or_failing_bus_means_no_friction() {
        let timeout = Duration::from_millis(100);
        assert!(pull_heartbeat(None, timeout).await.is_empty());

        let failing: Arc<dyn FederationBus> = Arc::new(FailingBus);
        assert!(pull_heartbeat(Some(&failing), timeout).await.is_empty());

        let null: Arc<dyn FederationBus> = Arc::new(NullBus);
        assert!(pull_heartbeat(Some(&null), timeout).await.is_empty());
    }

    #[tokio::test]
    async fn test_slow_bus_times_out() {
        let slow: Arc<dyn FederationBus> = Arc::new(SlowBus);
        let heartbeat = pull_heartbeat(Some(&slow), Duration::from_millis(20)).await;
        assert!(heartbeat.is_empty());
    }
}
