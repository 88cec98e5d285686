//! Top-down discovery: summarize the whole corpus, ask for feature names,
//! then pull the closest elements to each name.
//!
//! Assignment is by embedding similarity, so one element may serve several
//! features. A single consolidation step (merge pass on brief digests, then
//! the size normalizer) follows; there is no split and no refinement loop.

use crate::cluster::{Cluster, ClusteringState};
use crate::config::{DiscoveryConfig, SummaryBudget};
use crate::merge::merge_pass;
use crate::normalize::normalize_sizes;
use crate::oracle::OracleGateway;
use crate::summary::{approx_tokens, group_by_tokens, truncate_chars};
use context_corpus::{top_k_similar, CodeElement, Embedder};
use ndarray::Array2;
use std::collections::HashSet;

const CHARS_PER_TOKEN: usize = 4;

pub struct TopDown<'a> {
    pub elements: &'a [CodeElement],
    pub embeddings: &'a Array2<f32>,
    pub gateway: &'a OracleGateway,
    pub embedder: &'a dyn Embedder,
    pub config: &'a DiscoveryConfig,
}

impl TopDown<'_> {
    /// Full pipeline; returns the consolidated feature clusters
    pub async fn run(&self) -> ClusteringState {
        let summary = self.unified_summary().await;
        let names = self.feature_names(summary.as_deref()).await;
        log::info!("Top-down discovery proposed {} features", names.len());

        let assigned = self.assign(&names).await;
        let merged = merge_pass(assigned, self.elements, self.gateway, &SummaryBudget::brief()).await;
        normalize_sizes(merged, self.embeddings, self.config.min_cluster_size)
    }

    /// Reduce all element texts to one summary.
    ///
    /// Texts that fit `max_tokens_prompt` are summarized in one call.
    /// Otherwise they are grouped into chunks of half the budget, each chunk
    /// is summarized, and the partial summaries take their place. After
    /// `max_summary_depth` reductions the remaining text is truncated to the
    /// budget and summarized once.
    pub async fn unified_summary(&self) -> Option<String> {
        let budget = self.config.max_tokens_prompt;
        let mut texts: Vec<String> = self.elements.iter().map(CodeElement::labeled_text).collect();

        for depth in 0.. {
            if texts.is_empty() {
                return None;
            }
            let combined = texts.join("\n\n");
            if approx_tokens(&combined) < budget {
                return self.gateway.summarize(&combined).await;
            }
            if depth >= self.config.max_summary_depth {
                log::warn!("Summary depth limit ({depth}) reached; truncating remaining text");
                let truncated = truncate_chars(&combined, budget * CHARS_PER_TOKEN);
                return self.gateway.summarize(truncated).await;
            }

            let groups = group_by_tokens(&texts, budget / 2);
            log::debug!(
                "Summary round {}: {} texts in {} groups",
                depth + 1,
                texts.len(),
                groups.len()
            );
            let mut partials = Vec::with_capacity(groups.len());
            for (i, group) in groups.iter().enumerate() {
                match self.gateway.summarize(&group.join("\n\n")).await {
                    Some(partial) => partials.push(partial),
                    None => log::warn!("Skipping summary group {i} after oracle failure"),
                }
            }
            texts = partials;
        }
        None
    }

    /// Known features followed by refined proposals, without duplicates
    pub async fn feature_names(&self, summary: Option<&str>) -> Vec<String> {
        let mut refined = Vec::new();
        if let Some(summary) = summary {
            for raw in self.gateway.propose_feature_names(summary).await {
                let name = self.gateway.refine_feature_name(&raw).await;
                refined.push(name.unwrap_or(raw));
            }
        }

        let mut seen = HashSet::new();
        self.config
            .known_features
            .iter()
            .cloned()
            .chain(refined)
            .filter(|name| seen.insert(name.clone()))
            .collect()
    }

    /// One cluster per name holding the `top_k` elements most similar to the
    /// embedded name. A name that cannot be embedded gets no members.
    pub async fn assign(&self, names: &[String]) -> ClusteringState {
        let mut state = ClusteringState::new();
        for name in names {
            let members: Vec<usize> = match self.embedder.embed(name).await {
                Ok(vector) => top_k_similar(
                    self.embeddings,
                    &vector,
                    self.config.top_k,
                    self.config.min_sim_threshold,
                )
                .map(|hits| hits.into_iter().map(|(row, _)| row).collect())
                .unwrap_or_else(|e| {
                    log::warn!("Cannot assign elements to {name}: {e}");
                    Vec::new()
                }),
                Err(e) => {
                    log::warn!("Failed to embed feature name {name}: {e}");
                    Vec::new()
                }
            };
            log::debug!("{name}: {} elements assigned", members.len());
            state.push(Cluster::new(name.clone(), members));
        }
        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OracleRetryConfig;
    use crate::test_support::{KeywordEmbedder, ScriptedOracle};
    use ndarray::array;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn elements() -> Vec<CodeElement> {
        vec![
            CodeElement::method("draw_board", "renders the board"),
            CodeElement::method("move_piece", "moves a piece on the board"),
            CodeElement::method("save_game", "writes the game to disk"),
        ]
    }

    fn embeddings() -> Array2<f32> {
        array![[1.0, 0.0], [0.8, 0.6], [0.0, 1.0]]
    }

    fn gateway(oracle: ScriptedOracle) -> OracleGateway {
        let retry = OracleRetryConfig {
            max_attempts: 1,
            ..OracleRetryConfig::default()
        };
        OracleGateway::new(Arc::new(oracle), retry)
    }

    #[tokio::test]
    async fn small_corpus_is_summarized_in_one_call() {
        let oracle = Arc::new(ScriptedOracle::declining());
        let gateway = OracleGateway::new(oracle.clone(), OracleRetryConfig::default());
        let (els, emb) = (elements(), embeddings());
        let config = DiscoveryConfig::default();
        let embedder = KeywordEmbedder::new(&[]);
        let top_down = TopDown {
            elements: &els,
            embeddings: &emb,
            gateway: &gateway,
            embedder: &embedder,
            config: &config,
        };

        assert!(top_down.unified_summary().await.is_some());
        let calls = oracle.summarize_inputs();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].starts_with("[draw_board]\nrenders the board"));
    }

    #[tokio::test]
    async fn oversized_corpus_is_reduced_in_rounds() {
        let oracle = Arc::new(ScriptedOracle::declining());
        let gateway = OracleGateway::new(oracle.clone(), OracleRetryConfig::default());
        let els: Vec<_> = (0..8)
            .map(|i| CodeElement::method(format!("m{i}"), "x".repeat(40)))
            .collect();
        let emb = Array2::zeros((8, 2));
        let config = DiscoveryConfig {
            max_tokens_prompt: 30,
            ..DiscoveryConfig::default()
        };
        let embedder = KeywordEmbedder::new(&[]);
        let top_down = TopDown {
            elements: &els,
            embeddings: &emb,
            gateway: &gateway,
            embedder: &embedder,
            config: &config,
        };

        let summary = top_down.unified_summary().await;
        assert!(summary.is_some());
        // one call per element group, then one for the combined partials
        assert_eq!(oracle.summarize_inputs().len(), 9);
    }

    #[tokio::test]
    async fn depth_limit_ends_summarization_of_unshrinking_text() {
        let oracle = Arc::new(ScriptedOracle::declining().summarize_with(|text| Some(text.to_string())));
        let gateway = OracleGateway::new(oracle.clone(), OracleRetryConfig::default());
        let els: Vec<_> = (0..8)
            .map(|i| CodeElement::method(format!("m{i}"), "x".repeat(40)))
            .collect();
        let emb = Array2::zeros((8, 2));
        let config = DiscoveryConfig {
            max_tokens_prompt: 30,
            max_summary_depth: 2,
            ..DiscoveryConfig::default()
        };
        let embedder = KeywordEmbedder::new(&[]);
        let top_down = TopDown {
            elements: &els,
            embeddings: &emb,
            gateway: &gateway,
            embedder: &embedder,
            config: &config,
        };

        let summary = top_down.unified_summary().await.unwrap();
        let inputs = oracle.summarize_inputs();
        // two rounds of one call per element, then the truncated final call
        assert_eq!(inputs.len(), 2 * 8 + 1);
        let last = inputs.last().unwrap();
        assert!(last.chars().count() <= config.max_tokens_prompt * CHARS_PER_TOKEN);
        assert_eq!(&summary, last);
    }

    #[tokio::test]
    async fn names_union_known_features_first() {
        let oracle = ScriptedOracle::declining()
            .proposals("- Board\n- Persistence\n- Board")
            .refine_with(|raw| (raw != "Persistence").then(|| format!("{raw} View")));
        let gateway = gateway(oracle);
        let (els, emb) = (elements(), embeddings());
        let config = DiscoveryConfig::default().known_features(["Board View", "Scoring"]);
        let embedder = KeywordEmbedder::new(&[]);
        let top_down = TopDown {
            elements: &els,
            embeddings: &emb,
            gateway: &gateway,
            embedder: &embedder,
            config: &config,
        };

        let names = top_down.feature_names(Some("summary")).await;
        assert_eq!(names, vec!["Board View", "Scoring", "Persistence"]);
    }

    #[tokio::test]
    async fn assignment_allows_overlap_and_skips_unembeddable_names() {
        let gateway = gateway(ScriptedOracle::declining());
        let (els, emb) = (elements(), embeddings());
        let mut config = DiscoveryConfig::default();
        config.top_k = 2;
        config.min_sim_threshold = 0.5;
        let embedder = KeywordEmbedder::new(&[("Board", vec![1.0, 0.0]), ("Moves", vec![0.6, 0.8])]);
        let top_down = TopDown {
            elements: &els,
            embeddings: &emb,
            gateway: &gateway,
            embedder: &embedder,
            config: &config,
        };

        let names = vec!["Board".to_string(), "Moves".to_string(), "Unknown".to_string()];
        let state = top_down.assign(&names).await;
        assert_eq!(state.get("Board").unwrap().members(), &[0, 1]);
        assert_eq!(state.get("Moves").unwrap().members(), &[1, 2]);
        assert!(state.get("Unknown").unwrap().is_empty());
    }
}
