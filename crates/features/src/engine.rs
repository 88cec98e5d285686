use crate::config::DiscoveryConfig;
use crate::distance::DistanceMatrix;
use crate::error::{FeatureError, Result};
use crate::feature_map::FeatureMap;
use crate::naming::{adopt_ids_as_names, name_clusters, render_feature_map};
use crate::oracle::{Oracle, OracleGateway};
use crate::partition::initial_partition;
use crate::refine::{Refinement, RefinementOutcome};
use crate::top_down::TopDown;
use context_corpus::{cosine_similarity_matrix, Corpus, CorpusSnapshot, Embedder};
use context_graph::GraphBuilder;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// How the initial clustering is produced
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// Relationship-weighted hierarchical clustering refined by the oracle.
    /// Output is a strict partition.
    #[default]
    BottomUp,

    /// Corpus summary -> proposed names -> embedding assignment.
    /// Output may overlap.
    TopDown,
}

impl Strategy {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BottomUp => "bottom-up",
            Self::TopDown => "top-down",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = FeatureError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "bottom-up" | "bottom_up" | "bottomup" => Ok(Self::BottomUp),
            "top-down" | "top_down" | "topdown" => Ok(Self::TopDown),
            other => Err(FeatureError::invalid_config(format!("unknown strategy: {other}"))),
        }
    }
}

/// Run statistics reported next to the feature map
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryDiagnostics {
    pub strategy: Strategy,
    pub elements: usize,
    /// Refinement rounds executed (0 for top-down)
    pub rounds: usize,
    /// False when refinement stopped at the round limit
    pub converged: bool,
    /// Oracle calls that failed after all retries
    pub oracle_failures: usize,
    pub clusters_before_naming: usize,
}

/// Result of one discovery run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discovery {
    pub features: FeatureMap,
    pub diagnostics: DiscoveryDiagnostics,
}

/// Feature discovery engine
pub struct FeatureDiscovery {
    config: DiscoveryConfig,
    oracle: Arc<dyn Oracle>,
    embedder: Option<Arc<dyn Embedder>>,
}

impl FeatureDiscovery {
    pub fn new(config: DiscoveryConfig, oracle: Arc<dyn Oracle>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            oracle,
            embedder: None,
        })
    }

    /// Builder: embedder for top-down feature names
    #[must_use]
    pub fn with_embedder(mut self, embedder: Arc<dyn Embedder>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    #[must_use]
    pub const fn config(&self) -> &DiscoveryConfig {
        &self.config
    }

    /// Discover features in `corpus`
    pub async fn discover(&self, corpus: &dyn Corpus, strategy: Strategy) -> Result<Discovery> {
        let embedder = match strategy {
            Strategy::TopDown => Some(self.embedder.clone().ok_or(FeatureError::MissingEmbedder)?),
            Strategy::BottomUp => None,
        };

        let snapshot = corpus.elements_with_embeddings()?;
        let mut diagnostics = DiscoveryDiagnostics {
            strategy,
            elements: snapshot.len(),
            rounds: 0,
            converged: true,
            oracle_failures: 0,
            clusters_before_naming: 0,
        };
        if snapshot.is_empty() {
            log::info!("Empty corpus, no features to discover");
            return Ok(Discovery {
                features: FeatureMap::new(),
                diagnostics,
            });
        }

        log::info!(
            "Discovering features in {} elements ({strategy})",
            snapshot.len()
        );
        let gateway = OracleGateway::new(Arc::clone(&self.oracle), self.config.oracle.clone());

        let mut state = match embedder {
            None => {
                let outcome = self.bottom_up(&snapshot, &gateway).await;
                diagnostics.rounds = outcome.rounds;
                diagnostics.converged = outcome.converged;
                if !outcome.state.is_partition_of(snapshot.len()) {
                    log::warn!("Bottom-up clusters do not partition the corpus");
                }
                outcome.state
            }
            Some(embedder) => {
                TopDown {
                    elements: snapshot.elements(),
                    embeddings: snapshot.embeddings(),
                    gateway: &gateway,
                    embedder: embedder.as_ref(),
                    config: &self.config,
                }
                .run()
                .await
            }
        };
        diagnostics.clusters_before_naming = state.len();

        // top-down clusters are already keyed by their proposed names
        match strategy {
            Strategy::BottomUp => {
                name_clusters(
                    &mut state,
                    snapshot.elements(),
                    &gateway,
                    &self.config.summary,
                    &self.config.known_features,
                )
                .await;
            }
            Strategy::TopDown => adopt_ids_as_names(&mut state),
        }
        let features = render_feature_map(&state, snapshot.elements());
        diagnostics.oracle_failures = gateway.failures();

        log::info!(
            "Discovered {} features from {} clusters ({} oracle failures)",
            features.len(),
            diagnostics.clusters_before_naming,
            diagnostics.oracle_failures
        );
        Ok(Discovery {
            features,
            diagnostics,
        })
    }

    async fn bottom_up(&self, snapshot: &CorpusSnapshot, gateway: &OracleGateway) -> RefinementOutcome {
        let graph = GraphBuilder::new().build(snapshot.elements());
        let distances = DistanceMatrix::weighted(snapshot.embeddings(), &graph.adjacency());
        let similarity = cosine_similarity_matrix(snapshot.embeddings());

        let state = initial_partition(
            &distances,
            &similarity,
            self.config.cluster_count,
            self.config.known_features.len(),
        );

        Refinement {
            elements: snapshot.elements(),
            embeddings: snapshot.embeddings(),
            gateway,
            budget: &self.config.summary,
            min_cluster_size: self.config.min_cluster_size,
            max_iterations: self.config.max_iterations,
        }
        .run(state)
        .await
    }
}
