//! Ordered chain of opinion providers.
//!
//! Providers are tried in order, each under the same timeout. The first
//! well-formed opinion wins. When every provider fails the chain returns
//! `None` and the caller keeps its local heuristic vote. The chain never
//! retries and never returns an error.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::provider::OpinionProvider;
use crate::types::{NodeBrief, Opinion, OpinionError};

/// Default per-provider timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(2000);

/// An ordered list of providers with a uniform timeout.
#[derive(Clone)]
pub struct OpinionChain {
    providers: Vec<Arc<dyn OpinionProvider>>,
    timeout: Duration,
}

impl OpinionChain {
    pub fn new(timeout: Duration) -> Self {
        Self {
            providers: Vec::new(),
            timeout,
        }
    }

    /// Append a provider to the end of the chain.
    pub fn with_provider(mut self, provider: Arc<dyn OpinionProvider>) -> Self {
        self.providers.push(provider);
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Ask each provider in turn; `None` means fall back to the heuristic.
    pub async fn ask(&self, node: &NodeBrief, action: &str) -> Option<Opinion> {
        for provider in &self.providers {
            let outcome = match tokio::time::timeout(self.timeout, provider.ask_opinion(node, action)).await {
                Ok(result) => result,
                Err(_) => Err(OpinionError::Timeout {
                    provider: provider.id().to_string(),
                    timeout_ms: self.timeout.as_millis() as u64,
                }),
            };

            match outcome {
                Ok(opinion) => {
                    debug!(
                        node = %node.node,
                        provider = %opinion.provider,
                        category = %opinion.category,
                        "Opinion received"
                    );
                    return Some(opinion);
                }
                Err(e) => {
                    warn!(
                        node = %node.node,
                        provider = %provider.id(),
                        error = %e,
                        "Opinion provider failed, trying next"
                    );
                }
            }
        }

        if !self.providers.is_empty() {
            warn!(node = %node.node, "All opinion providers failed, using heuristic vote");
        }
        None
    }
}

impl Default for OpinionChain {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT)
    }
}
