use crate::cluster::ClusteringState;
use crate::config::SummaryBudget;
use crate::merge::merge_pass;
use crate::normalize::normalize_sizes;
use crate::oracle::OracleGateway;
use crate::split::split_pass;
use context_corpus::CodeElement;
use ndarray::Array2;

/// Inputs shared by every refinement round
pub struct Refinement<'a> {
    pub elements: &'a [CodeElement],
    pub embeddings: &'a Array2<f32>,
    pub gateway: &'a OracleGateway,
    pub budget: &'a SummaryBudget,
    pub min_cluster_size: usize,
    pub max_iterations: usize,
}

/// Result of [`Refinement::run`]
#[derive(Debug, Clone)]
pub struct RefinementOutcome {
    pub state: ClusteringState,
    /// Rounds actually executed
    pub rounds: usize,
    /// False when the round limit was hit before the state settled
    pub converged: bool,
}

impl Refinement<'_> {
    /// Merge, normalize, split, normalize; repeated until a round leaves
    /// every cluster id and member set unchanged or `max_iterations` rounds
    /// have run.
    pub async fn run(&self, mut state: ClusteringState) -> RefinementOutcome {
        for round in 1..=self.max_iterations {
            let before = state.signature();
            state = self.round(state).await;
            log::debug!("Refinement round {round}: {} clusters", state.len());

            if state.signature() == before {
                log::info!("Refinement converged after {round} rounds");
                return RefinementOutcome {
                    state,
                    rounds: round,
                    converged: true,
                };
            }
        }

        log::warn!(
            "Refinement did not converge within {} rounds; keeping last state",
            self.max_iterations
        );
        RefinementOutcome {
            state,
            rounds: self.max_iterations,
            converged: false,
        }
    }

    /// One merge/normalize/split/normalize round
    pub async fn round(&self, state: ClusteringState) -> ClusteringState {
        let state = merge_pass(state, self.elements, self.gateway, self.budget).await;
        let state = normalize_sizes(state, self.embeddings, self.min_cluster_size);
        let state = split_pass(state, self.elements, self.embeddings, self.gateway, self.budget).await;
        normalize_sizes(state, self.embeddings, self.min_cluster_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::Cluster;
    use crate::config::OracleRetryConfig;
    use crate::test_support::ScriptedOracle;
    use ndarray::array;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn elements(n: usize) -> Vec<CodeElement> {
        (0..n)
            .map(|i| CodeElement::method(format!("m{i}"), format!("summary {i}")))
            .collect()
    }

    fn embeddings() -> Array2<f32> {
        array![
            [1.0, 0.0],
            [0.98, 0.1],
            [0.95, 0.2],
            [0.0, 1.0],
            [0.1, 0.98],
            [0.2, 0.95],
        ]
    }

    fn state() -> ClusteringState {
        [Cluster::new("Cluster_0", [0, 1, 2]), Cluster::new("Cluster_1", [3, 4, 5])]
            .into_iter()
            .collect()
    }

    #[tokio::test]
    async fn stable_state_converges_in_one_round() {
        let gateway = OracleGateway::new(Arc::new(ScriptedOracle::declining()), OracleRetryConfig::default());
        let (els, emb) = (elements(6), embeddings());
        let refinement = Refinement {
            elements: &els,
            embeddings: &emb,
            gateway: &gateway,
            budget: &SummaryBudget::default(),
            min_cluster_size: 2,
            max_iterations: 5,
        };
        let outcome = refinement.run(state()).await;
        assert!(outcome.converged);
        assert_eq!(outcome.rounds, 1);
        assert_eq!(outcome.state.signature(), state().signature());
    }

    #[tokio::test]
    async fn oscillating_oracle_stops_at_round_limit() {
        // Merge everything, then split it again: ids change every round
        let oracle = ScriptedOracle::declining()
            .merge_when(|_, _| true)
            .split_when(|_, _| Some(2));
        let gateway = OracleGateway::new(Arc::new(oracle), OracleRetryConfig::default());
        let (els, emb) = (elements(6), embeddings());
        let refinement = Refinement {
            elements: &els,
            embeddings: &emb,
            gateway: &gateway,
            budget: &SummaryBudget::default(),
            min_cluster_size: 1,
            max_iterations: 3,
        };
        let outcome = refinement.run(state()).await;
        assert!(!outcome.converged);
        assert_eq!(outcome.rounds, 3);
        assert!(outcome.state.is_partition_of(6));
    }
}
