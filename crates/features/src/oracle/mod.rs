//! Semantic oracle: the external judge for merge, split, naming and
//! summarization questions.
//!
//! Backends implement [`Oracle`] and answer with free text. The engine never
//! talks to a backend directly; it goes through [`OracleGateway`], which
//! applies timeouts and retries and normalizes every answer into a
//! [`MergeDecision`], [`SplitDecision`] or cleaned name. Unparseable or
//! failed answers become the conservative default.

mod gateway;
mod llm;
mod parse;
mod prompts;

pub use gateway::OracleGateway;
pub use llm::{ChatModel, LlmOracle};
pub use parse::{clean_name, parse_merge, parse_proposals, parse_split};

use crate::error::Result;
use async_trait::async_trait;

/// A cluster as presented to the oracle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterDigest {
    pub name: String,
    pub summary: String,
}

/// Normalized answer to "should these two clusters merge?"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeDecision {
    Merge,
    Keep,
}

/// Normalized answer to "does this cluster hold several features?"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitDecision {
    Keep,
    Into(usize),
}

/// Raw oracle operations. Answers are unstructured text; implementations
/// must not keep state that influences later answers.
#[async_trait]
pub trait Oracle: Send + Sync {
    /// Merge several element summaries into one cohesive summary
    async fn summarize(&self, text: &str) -> Result<String>;

    /// List feature names for a codebase summary, one per line
    async fn propose_feature_names(&self, summary: &str) -> Result<String>;

    /// Turn one proposed bullet into a concise feature name
    async fn refine_feature_name(&self, raw: &str) -> Result<String>;

    /// Answer "Yes" or "No"
    async fn decide_merge(&self, a: &ClusterDigest, b: &ClusterDigest) -> Result<String>;

    /// Answer "Split into X" or "No split needed"
    async fn decide_split(&self, name: &str, summary: &str) -> Result<String>;

    /// Name a cluster, staying close to the known features
    async fn name_cluster(&self, summary: &str, known_features: &[String]) -> Result<String>;
}
