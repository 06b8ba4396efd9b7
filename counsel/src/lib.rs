//! Counsel - outside opinions for parliament nodes.
//!
//! A parliament node may consult a text-generation collaborator for a vote
//! rationale. This crate provides:
//!
//! - **Backends**: the `LlmBackend` trait with mock and OpenAI-compatible
//!   implementations
//! - **Providers**: the `OpinionProvider` trait and an LLM-backed provider
//!   that demands a JSON `{"category", "rationale"}` answer
//! - **Chain**: an ordered provider list with one uniform timeout that
//!   degrades to `None` instead of failing
//!
//! Nothing here can change a verdict on its own. The engine decides how much
//! of an opinion it uses.

pub mod backend;
pub mod chain;
pub mod prompt;
pub mod provider;
pub mod types;

pub use backend::{LlmBackend, LlmError, MockBackend, OpenAiBackend};
pub use chain::OpinionChain;
pub use provider::{LlmOpinionProvider, OpinionProvider};
pub use types::{NodeBrief, Opinion, OpinionError};
