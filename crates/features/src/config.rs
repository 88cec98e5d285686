use crate::error::{FeatureError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Configuration for feature discovery
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Seed feature names; guide naming and raise the minimum cluster count
    pub known_features: Vec<String>,

    /// Clusters smaller than this are folded into their nearest neighbor
    pub min_cluster_size: usize,

    /// How the initial bottom-up cluster count is chosen
    pub cluster_count: ClusterCount,

    /// Budget for cluster summaries sent with merge/split/naming questions
    pub summary: SummaryBudget,

    /// Token budget (4 chars per token) for one recursive summarization call
    pub max_tokens_prompt: usize,

    /// Maximum rounds of recursive summarization before forced truncation
    pub max_summary_depth: usize,

    /// Maximum merge/split refinement rounds
    pub max_iterations: usize,

    /// Elements assigned to each top-down feature at most
    pub top_k: usize,

    /// Minimum cosine similarity for a top-down assignment
    pub min_sim_threshold: f32,

    /// Timeout and retry policy for oracle calls
    pub oracle: OracleRetryConfig,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            known_features: Vec::new(),
            min_cluster_size: 5,
            cluster_count: ClusterCount::Bounded,
            summary: SummaryBudget::default(),
            max_tokens_prompt: 7_000,
            max_summary_depth: 8,
            max_iterations: 5,
            top_k: 10,
            min_sim_threshold: 0.3,
            oracle: OracleRetryConfig::default(),
        }
    }
}

impl DiscoveryConfig {
    /// Parse a TOML document; missing keys fall back to defaults
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = tokio::fs::read_to_string(path.as_ref()).await?;
        Self::from_toml_str(&raw)
    }

    /// Builder: set known features
    #[must_use]
    pub fn known_features<I, S>(mut self, features: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.known_features = features.into_iter().map(Into::into).collect();
        self
    }

    /// Builder: set minimum cluster size
    #[must_use]
    pub const fn min_cluster_size(mut self, size: usize) -> Self {
        self.min_cluster_size = size;
        self
    }

    /// Builder: set cluster count policy
    #[must_use]
    pub const fn cluster_count(mut self, count: ClusterCount) -> Self {
        self.cluster_count = count;
        self
    }

    /// Builder: set refinement round limit
    #[must_use]
    pub const fn max_iterations(mut self, rounds: usize) -> Self {
        self.max_iterations = rounds;
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.min_cluster_size == 0 {
            return Err(FeatureError::invalid_config("min_cluster_size must be > 0"));
        }
        if self.max_iterations == 0 {
            return Err(FeatureError::invalid_config("max_iterations must be > 0"));
        }
        if self.top_k == 0 {
            return Err(FeatureError::invalid_config("top_k must be > 0"));
        }
        if self.max_tokens_prompt < 2 {
            return Err(FeatureError::invalid_config(format!(
                "max_tokens_prompt ({}) must be at least 2",
                self.max_tokens_prompt
            )));
        }
        if !(-1.0..=1.0).contains(&self.min_sim_threshold) {
            return Err(FeatureError::invalid_config(format!(
                "min_sim_threshold ({}) must lie in [-1, 1]",
                self.min_sim_threshold
            )));
        }
        if let ClusterCount::Fixed(0) = self.cluster_count {
            return Err(FeatureError::invalid_config("fixed cluster count must be > 0"));
        }
        self.summary.validate()?;
        self.oracle.validate()?;
        Ok(())
    }
}

/// Initial cluster count policy for bottom-up discovery
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClusterCount {
    /// `min(8, corpus_size)`
    Bounded,

    /// Coherence search over `[max(3, |known|), min(20, N - 1)]`
    Auto,

    /// Caller-supplied count
    Fixed(usize),
}

/// Character budget for a cluster summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryBudget {
    pub max_chars_per_member: usize,
    pub max_chars_total: usize,
    /// Only the first N members are considered (None = all)
    pub max_members: Option<usize>,
}

impl Default for SummaryBudget {
    fn default() -> Self {
        Self {
            max_chars_per_member: 500,
            max_chars_total: 2_000,
            max_members: None,
        }
    }
}

impl SummaryBudget {
    /// Short digest used when consolidating top-down features
    pub const fn brief() -> Self {
        Self {
            max_chars_per_member: 200,
            max_chars_total: 2_000,
            max_members: Some(10),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.max_chars_per_member == 0 || self.max_chars_total == 0 {
            return Err(FeatureError::invalid_config("summary budgets must be > 0"));
        }
        if self.max_members == Some(0) {
            return Err(FeatureError::invalid_config("summary.max_members must be > 0"));
        }
        Ok(())
    }
}

/// Timeout and retry policy applied to every oracle call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OracleRetryConfig {
    pub timeout_ms: u64,
    pub max_attempts: u32,
    /// Delay before the first retry; doubled for each further retry
    pub backoff_ms: u64,
}

impl Default for OracleRetryConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 60_000,
            max_attempts: 3,
            backoff_ms: 500,
        }
    }
}

impl OracleRetryConfig {
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Delay before retry number `retry` (1-based)
    #[must_use]
    pub fn backoff(&self, retry: u32) -> Duration {
        let factor = 1u64 << retry.saturating_sub(1).min(16);
        Duration::from_millis(self.backoff_ms.saturating_mul(factor))
    }

    fn validate(&self) -> Result<()> {
        if self.max_attempts == 0 {
            return Err(FeatureError::invalid_config("oracle.max_attempts must be > 0"));
        }
        if self.timeout_ms == 0 {
            return Err(FeatureError::invalid_config("oracle.timeout_ms must be > 0"));
        }
        Ok(())
    }
}
