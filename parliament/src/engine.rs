//! ConstitutionalEngine - the public face of the deliberation engine.
//!
//! Wires the parliament, the oracle, the persistent stores and the optional
//! outside collaborators (opinion providers, federation bus) together.

use std::collections::BTreeMap;
use std::sync::Arc;

use axioms::{AxiomRegistry, TableManifest};
use counsel::{OpinionChain, OpinionProvider};
use futures::future::join_all;
use tracing::{debug, info};

use crate::adjudication::{DualHornResult, Oracle, OracleAdvisory};
use crate::config::EngineConfig;
use crate::deliberation::{Parliament, VoteMemory};
use crate::federation::{self, FederationBus, Heartbeat};
use crate::store::{AdvisoryLog, AppendLog, LivingAxiomStore};
use crate::types::{Dilemma, GovernanceResult, ParliamentResult, Result};

/// The constitutional deliberation engine.
///
/// Every deliberation is synchronous. The async methods only gather outside
/// input (heartbeat, opinions) under bounded timeouts before deliberating.
pub struct ConstitutionalEngine {
    config: EngineConfig,
    parliament: Parliament,
    oracle: Oracle,
    bus: Option<Arc<dyn FederationBus>>,
    counsel: Option<OpinionChain>,
}

impl ConstitutionalEngine {
    /// Engine with default configuration and in-memory stores.
    pub fn new() -> Result<Self> {
        EngineBuilder::new().build()
    }

    /// Engine with custom configuration.
    pub fn with_config(config: EngineConfig) -> Result<Self> {
        EngineBuilder::new().with_config(config).build()
    }

    /// Single-call governance check.
    pub fn check_action(&self, text: &str, analysis_mode: bool) -> GovernanceResult {
        GovernanceResult::from(&self.deliberate(text, &Heartbeat::none(), analysis_mode))
    }

    /// Full deliberation under an explicit heartbeat.
    pub fn deliberate(&self, text: &str, heartbeat: &Heartbeat, analysis_mode: bool) -> ParliamentResult {
        self.parliament.deliberate(text, heartbeat, analysis_mode)
    }

    /// Deliberate each horn of a dilemma and compare the two outcomes.
    pub fn deliberate_dilemma(&self, dilemma: &Dilemma) -> DualHornResult {
        debug!(
            stakeholders = dilemma.stakeholders().len(),
            "Deliberating dilemma"
        );
        let horn_1 = self.parliament.deliberate(dilemma.horn_1(), &Heartbeat::none(), false);
        let horn_2 = self.parliament.deliberate(dilemma.horn_2(), &Heartbeat::none(), false);
        DualHornResult::compare(dilemma.clone(), horn_1, horn_2)
    }

    /// Hand a comparison to the oracle.
    pub fn adjudicate(&self, result: &DualHornResult) -> OracleAdvisory {
        self.oracle.adjudicate(result)
    }

    /// Governance check with federation friction.
    ///
    /// The heartbeat is pulled before deliberating and the result pushed
    /// afterwards, both best effort under the federation timeout.
    pub async fn check_action_federated(&self, text: &str, analysis_mode: bool) -> GovernanceResult {
        let timeout = self.config.federation.timeout();
        let heartbeat = federation::pull_heartbeat(self.bus.as_ref(), timeout).await;

        let result = self.parliament.deliberate(text, &heartbeat, analysis_mode);
        let pushed = federation::push_decision(self.bus.as_ref(), &result, timeout).await;
        debug!(governance = %result.governance, pushed, "Federated check complete");

        GovernanceResult::from(&result)
    }

    /// Deliberation with outside opinions for every node.
    ///
    /// A kernel match skips the providers entirely. Nodes whose providers
    /// all fail keep their heuristic rationale.
    pub async fn deliberate_with_counsel(&self, text: &str, analysis_mode: bool) -> ParliamentResult {
        let Some(chain) = self.counsel.as_ref() else {
            return self.parliament.deliberate(text, &Heartbeat::none(), analysis_mode);
        };
        if self.parliament.kernel_check(text).is_some() {
            return self.parliament.deliberate(text, &Heartbeat::none(), analysis_mode);
        }

        let (_, heuristic) = self.parliament.convene(text, &Heartbeat::none());
        let registry = self.parliament.registry();
        let briefs: Vec<_> = self
            .parliament
            .nodes()
            .iter()
            .zip(&heuristic)
            .map(|(node, vote)| node.brief(registry).with_heuristic_vote(vote.category))
            .collect();

        let answers = join_all(briefs.iter().map(|brief| chain.ask(brief, text))).await;
        let opinions: BTreeMap<String, _> = briefs
            .iter()
            .zip(answers)
            .filter_map(|(brief, answer)| answer.map(|opinion| (brief.node.clone(), opinion)))
            .collect();

        info!(
            answered = opinions.len(),
            nodes = briefs.len(),
            "Counsel gathered"
        );
        self.parliament
            .deliberate_with_counsel(text, &Heartbeat::none(), analysis_mode, &opinions)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn registry(&self) -> &AxiomRegistry {
        self.parliament.registry()
    }

    pub fn vote_memory(&self) -> &VoteMemory {
        self.parliament.memory()
    }

    pub fn living_axioms(&self) -> &LivingAxiomStore {
        self.oracle.living_axioms()
    }

    pub fn advisories(&self) -> &AdvisoryLog {
        self.oracle.advisories()
    }

    /// Fingerprints of the fixed tables.
    pub fn manifest(&self) -> Result<TableManifest> {
        self.parliament.manifest()
    }

    pub fn has_counsel(&self) -> bool {
        self.counsel.is_some()
    }

    pub fn has_bus(&self) -> bool {
        self.bus.is_some()
    }
}

/// Builder for ConstitutionalEngine.
pub struct EngineBuilder {
    config: EngineConfig,
    providers: Vec<Arc<dyn OpinionProvider>>,
    bus: Option<Arc<dyn FederationBus>>,
}

impl EngineBuilder {
    pub fn new() -> Self {
        Self {
            config: EngineConfig::default(),
            providers: Vec::new(),
            bus: None,
        }
    }

    /// Replace the whole configuration.
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn vote_memory_capacity(mut self, capacity: usize) -> Self {
        self.config.parliament.vote_memory_capacity = capacity;
        self
    }

    pub fn approval_threshold(mut self, threshold: f64) -> Self {
        self.config.parliament.approval_threshold = threshold;
        self
    }

    /// Number of distinct violated axioms that halts on breadth alone.
    pub fn breadth_threshold(mut self, threshold: usize) -> Self {
        self.config.parliament.breadth_threshold = threshold;
        self
    }

    pub fn storage(mut self, storage: crate::config::StorageConfig) -> Self {
        self.config.storage = storage;
        self
    }

    /// Pin the expected digest of a fixed table.
    pub fn pin_table(mut self, name: impl Into<String>, digest: impl Into<String>) -> Self {
        self.config.pinned_tables.insert(name.into(), digest.into());
        self
    }

    /// Add an opinion provider; providers are tried in the order added.
    pub fn with_opinion_provider(mut self, provider: Arc<dyn OpinionProvider>) -> Self {
        self.config.collaborator.enabled = true;
        self.providers.push(provider);
        self
    }

    pub fn with_bus(mut self, bus: Arc<dyn FederationBus>) -> Self {
        self.config.federation.enabled = true;
        self.bus = Some(bus);
        self
    }

    /// Build the engine.
    ///
    /// Fails on invalid configuration, corrupt or unpinned tables, or an
    /// unreadable store.
    pub fn build(self) -> Result<ConstitutionalEngine> {
        let config = self.config;
        config.validate()?;

        let storage = &config.storage;
        let mut memory = VoteMemory::new(config.parliament.vote_memory_capacity);
        if let Some(path) = storage.vote_overflow.as_deref() {
            memory = memory.with_overflow(AppendLog::at_path(path));
        }

        let parliament = Parliament::new(config.parliament.clone(), memory)?;
        let manifest = parliament.manifest()?;
        manifest.verify_against(&config.pinned_tables)?;

        let living = LivingAxiomStore::open(AppendLog::from_option(storage.living_axioms.as_deref()))?;
        let advisories = AdvisoryLog::new(AppendLog::from_option(storage.advisory_log.as_deref()));
        let oracle = Oracle::new(
            config.oracle.clone(),
            parliament.registry().clone(),
            manifest.digest(),
            living,
            advisories,
        )?;

        let counsel = if config.collaborator.enabled && !self.providers.is_empty() {
            let chain = self
                .providers
                .into_iter()
                .fold(OpinionChain::new(config.collaborator.timeout()), |chain, provider| {
                    chain.with_provider(provider)
                });
            Some(chain)
        } else {
            None
        };
        let bus = if config.federation.enabled { self.bus } else { None };

        info!(
            registry_version = manifest.registry_version,
            manifest = %manifest.digest(),
            counsel = counsel.is_some(),
            federation = bus.is_some(),
            "Constitutional engine ready"
        );

        Ok(ConstitutionalEngine {
            config,
            parliament,
            oracle,
            bus,
            counsel,
        })
    }
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
