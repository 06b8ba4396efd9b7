//! Parliamentary deliberation.
//!
//! The [`Parliament`] owns the fixed tables and the vote memory. One call to
//! [`Parliament::deliberate`] runs, without suspending:
//!
//! kernel -> signal detection -> nine node scorers -> friction -> aggregation
//!
//! A kernel match short-circuits everything after it.

pub mod aggregator;
pub mod memory;
pub mod scorer;

use std::collections::BTreeMap;

use axioms::{
    AxiomRegistry, HardBlock, Kernel, SignalDetector, SignalSet, TableManifest, TensionTable,
};
use counsel::Opinion;
use tracing::info;

use crate::config::ParliamentConfig;
use crate::federation::Heartbeat;
use crate::nodes::NodeTable;
use crate::types::{CounselNote, NodeVote, ParliamentResult, Result};

pub use memory::{VoteMemory, VoteSummary};

/// The standing parliament and everything it deliberates with.
#[derive(Debug)]
pub struct Parliament {
    registry: AxiomRegistry,
    kernel: Kernel,
    detector: SignalDetector,
    tensions: TensionTable,
    nodes: NodeTable,
    config: ParliamentConfig,
    memory: VoteMemory,
}

impl Parliament {
    /// Standard tables and the standing nine nodes.
    pub fn new(config: ParliamentConfig, memory: VoteMemory) -> Result<Self> {
        Self::with_tables(AxiomRegistry::standard(), NodeTable::standing(), config, memory)
    }

    /// Build from an explicit registry and roster.
    ///
    /// Every table is compiled and cross-checked here; a corrupt table fails
    /// now rather than during a deliberation.
    pub fn with_tables(
        registry: AxiomRegistry,
        nodes: NodeTable,
        config: ParliamentConfig,
        memory: VoteMemory,
    ) -> Result<Self> {
        registry.validate()?;
        let kernel = Kernel::standard()?;
        let detector = SignalDetector::standard()?;
        detector.validate_against(&registry)?;
        let tensions = TensionTable::standard()?;
        tensions.validate_against(&registry)?;
        nodes.validate_against(&registry)?;

        Ok(Self {
            registry,
            kernel,
            detector,
            tensions,
            nodes,
            config,
            memory,
        })
    }

    /// Fingerprints of the tables this parliament was built from.
    pub fn manifest(&self) -> Result<TableManifest> {
        Ok(TableManifest::new(self.registry.version())
            .with_table("axioms", self.registry.fingerprint()?)
            .with_table("kernel", self.kernel.fingerprint()?)
            .with_table("signals", self.detector.fingerprint()?)
            .with_table("tensions", self.tensions.fingerprint()?)
            .with_table("nodes", self.nodes.fingerprint()?))
    }

    pub fn registry(&self) -> &AxiomRegistry {
        &self.registry
    }

    pub fn nodes(&self) -> &NodeTable {
        &self.nodes
    }

    pub fn memory(&self) -> &VoteMemory {
        &self.memory
    }

    pub fn config(&self) -> &ParliamentConfig {
        &self.config
    }

    /// Run the kernel alone.
    pub fn kernel_check(&self, text: &str) -> Option<HardBlock> {
        self.kernel.check(text)
    }

    /// Detect signals and collect every node's vote, friction applied.
    ///
    /// This is the node stage only: the kernel is not consulted.
    pub fn convene(&self, text: &str, heartbeat: &Heartbeat) -> (SignalSet, Vec<NodeVote>) {
        let signals = self.detector.detect(text);
        let votes = self
            .nodes
            .iter()
            .map(|node| {
                let vote = scorer::evaluate(node, &signals, text);
                match heartbeat.factor_for(node.primary(), &self.config) {
                    Some(factor) => {
                        scorer::apply_friction(vote, factor, self.config.max_friction_factor)
                    }
                    None => vote,
                }
            })
            .collect();
        (signals, votes)
    }

    /// Full deliberation: kernel first, then the parliament.
    pub fn deliberate(&self, text: &str, heartbeat: &Heartbeat, analysis_mode: bool) -> ParliamentResult {
        self.deliberate_with_counsel(text, heartbeat, analysis_mode, &BTreeMap::new())
    }

    /// Full deliberation with outside opinions keyed by node id.
    ///
    /// Opinions replace the rationale of the vote they attach to and are
    /// recorded on it. They never change a score, a category or a veto.
    pub fn deliberate_with_counsel(
        &self,
        text: &str,
        heartbeat: &Heartbeat,
        analysis_mode: bool,
        opinions: &BTreeMap<String, Opinion>,
    ) -> ParliamentResult {
        if let Some(block) = self.kernel.check(text) {
            return self.blocked(text, block, analysis_mode);
        }

        let (signals, mut votes) = self.convene(text, heartbeat);
        for vote in &mut votes {
            if let Some(opinion) = opinions.get(&vote.node) {
                if !vote.veto && !opinion.rationale.is_empty() {
                    vote.rationale = opinion.rationale.clone();
                }
                vote.counsel = Some(CounselNote {
                    category: opinion.category,
                    provider: opinion.provider.clone(),
                });
            }
        }
        self.conclude(text, signals, votes, analysis_mode)
    }

    /// Aggregate node votes into a result and record it in vote memory.
    pub fn conclude(
        &self,
        text: &str,
        signals: SignalSet,
        votes: Vec<NodeVote>,
        analysis_mode: bool,
    ) -> ParliamentResult {
        let violated_axioms = self.registry.ordered(signals.axioms().cloned());
        let approval_ratio = aggregator::approval_ratio(&votes);
        let veto_nodes = aggregator::veto_nodes(&votes);
        let verdict = aggregator::escalate(
            &veto_nodes,
            &violated_axioms,
            approval_ratio,
            analysis_mode,
            &self.config,
        );
        let tensions = aggregator::tensions(&votes, &self.tensions);

        let result = ParliamentResult {
            action: text.to_string(),
            votes,
            approval_ratio,
            veto_nodes,
            violated_axioms,
            signals,
            tensions,
            governance: verdict.governance,
            analysis_mode,
            hard_block: None,
            reasoning: verdict.reasoning,
        };

        info!(
            governance = %result.governance,
            approval_ratio = result.approval_ratio,
            vetoes = result.veto_nodes.len(),
            violated = result.violated_axioms.len(),
            tensions = result.tensions.len(),
            "Parliament concluded"
        );
        self.memory.record(&result);
        result
    }

    fn blocked(&self, text: &str, block: HardBlock, analysis_mode: bool) -> ParliamentResult {
        // Signals are still recorded so analysis mode can surface them.
        let signals = self.detector.detect(text);
        let violated_axioms = self.registry.ordered(signals.axioms().cloned());

        let mut reasoning = vec![format!(
            "Kernel rule {} matched \"{}\": {}",
            block.rule, block.matched, block.justification
        )];
        let governance = if analysis_mode {
            reasoning.push("Analysis mode: surfaced as HOLD".to_string());
            aggregator::identity_override(&violated_axioms, axioms::Governance::Hold, &mut reasoning)
        } else {
            axioms::Governance::HardBlock
        };

        info!(rule = %block.rule, governance = %governance, "Kernel decided");
        let result = ParliamentResult {
            action: text.to_string(),
            votes: Vec::new(),
            approval_ratio: 0.0,
            veto_nodes: Vec::new(),
            violated_axioms,
            signals,
            tensions: Vec::new(),
            governance,
            analysis_mode,
            hard_block: Some(block),
            reasoning,
        };
        self.memory.record(&result);
        result
    }
}
