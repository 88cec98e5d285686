//! # Context Features
//!
//! Feature discovery over a code element corpus: groups methods, classes
//! and files into high-level, human-named features.
//!
//! ## Features
//!
//! - **Bottom-up discovery** - relationship-weighted complete-linkage
//!   clustering, refined by oracle merge/split decisions until stable
//! - **Top-down discovery** - recursive corpus summary, proposed feature
//!   names, embedding-based assignment (membership may overlap)
//! - **Size normalization** - undersized clusters fold into their nearest
//!   centroid neighbor
//! - **Defensive oracle gateway** - timeouts, bounded retries, and
//!   conservative defaults for failed or malformed answers
//! - **Deterministic** - every oracle question is asked in a fixed order,
//!   so a scripted oracle reproduces a run exactly
//!
//! ## Architecture
//!
//! ```text
//! Corpus ──> CorpusSnapshot (elements + aligned embeddings)
//!     │
//!     ├──> Bottom-up
//!     │      ├─ GraphBuilder ──> adjacency
//!     │      ├─ DistanceMatrix (1 - cosine, shrunk along edges)
//!     │      ├─ Dendrogram ──> initial partition
//!     │      ├─ Refinement: merge → normalize → split → normalize
//!     │      └─ oracle naming
//!     │
//!     ├──> Top-down
//!     │      ├─ recursive summary ──> proposed names ──> refined names
//!     │      ├─ Embedder ──> top-k assignment
//!     │      └─ merge → normalize (proposed names are kept)
//!     │
//!     └──> FeatureMap { name: [element ids] }
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use context_corpus::ElementCorpus;
//! use context_features::{DiscoveryConfig, FeatureDiscovery, LlmOracle, Strategy};
//! # use context_features::{ChatModel, Result};
//! # struct Echo;
//! # #[async_trait::async_trait]
//! # impl ChatModel for Echo {
//! #     async fn complete(&self, _prompt: &str) -> Result<String> { Ok("No".into()) }
//! # }
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let corpus = ElementCorpus::load("corpus.json").await?;
//!     let config = DiscoveryConfig::default().known_features(["Game Board"]);
//!     let engine = FeatureDiscovery::new(config, Arc::new(LlmOracle::new(Echo)))?;
//!
//!     let discovery = engine.discover(&corpus, Strategy::BottomUp).await?;
//!     for (name, members) in discovery.features.iter() {
//!         println!("{name}: {}", members.join(", "));
//!     }
//!     Ok(())
//! }
//! ```

mod cluster;
mod config;
mod distance;
mod engine;
mod error;
mod feature_map;
mod hierarchy;
mod merge;
mod naming;
mod normalize;
mod oracle;
mod partition;
mod refine;
mod split;
mod summary;
mod top_down;

pub use cluster::{Cluster, ClusteringState, StateSignature};
pub use config::{ClusterCount, DiscoveryConfig, OracleRetryConfig, SummaryBudget};
pub use distance::DistanceMatrix;
pub use engine::{Discovery, DiscoveryDiagnostics, FeatureDiscovery, Strategy};
pub use error::{FeatureError, Result};
pub use feature_map::FeatureMap;
pub use hierarchy::{choose_cluster_count, coherence_score, Dendrogram};
pub use merge::merge_pass;
pub use naming::{
    adopt_ids_as_names, assemble_feature_map, name_clusters, placeholder_name, render_feature_map,
};
pub use normalize::normalize_sizes;
pub use oracle::{
    clean_name, parse_merge, parse_proposals, parse_split, ChatModel, ClusterDigest, LlmOracle,
    MergeDecision, Oracle, OracleGateway, SplitDecision,
};
pub use partition::{initial_partition, resolve_cluster_count, CLUSTER_PREFIX};
pub use refine::{Refinement, RefinementOutcome};
pub use split::{split_pass, subclusters};
pub use summary::{approx_tokens, cluster_digest, group_by_tokens, truncate_chars};
pub use top_down::TopDown;
