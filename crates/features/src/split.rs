use crate::cluster::{Cluster, ClusteringState};
use crate::config::SummaryBudget;
use crate::distance::DistanceMatrix;
use crate::hierarchy::Dendrogram;
use crate::merge::digest;
use crate::oracle::{OracleGateway, SplitDecision};
use context_corpus::CodeElement;
use ndarray::{Array2, Axis};
use std::collections::BTreeMap;

/// Oracle-guided split pass.
///
/// Each cluster is asked once, in state order. Kept clusters stay in place;
/// the sub-clusters of a split cluster (`<id>_sub1`, `<id>_sub2`, ...) are
/// appended after all kept ones.
pub async fn split_pass(
    state: ClusteringState,
    elements: &[CodeElement],
    embeddings: &Array2<f32>,
    gateway: &OracleGateway,
    budget: &SummaryBudget,
) -> ClusteringState {
    let mut kept = Vec::new();
    let mut produced = Vec::new();

    for cluster in state.into_clusters() {
        let d = digest(&cluster, elements, budget);
        match gateway.decide_split(&d.name, &d.summary).await {
            SplitDecision::Into(requested) => {
                let parts = requested.min(cluster.len());
                if parts <= 1 {
                    kept.push(cluster);
                    continue;
                }
                log::debug!("Splitting {} into {parts}", cluster.id);
                produced.extend(subclusters(&cluster, embeddings, parts));
            }
            SplitDecision::Keep => kept.push(cluster),
        }
    }

    kept.into_iter().chain(produced).collect()
}

/// Re-cluster one cluster's members on plain cosine distance
pub fn subclusters(cluster: &Cluster, embeddings: &Array2<f32>, parts: usize) -> Vec<Cluster> {
    let members = cluster.members();
    let rows = embeddings.select(Axis(0), members);
    let distances = DistanceMatrix::from_embeddings(&rows);
    let labels = Dendrogram::from_distance_matrix(distances.values()).cut(parts);

    let mut groups: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for (position, label) in labels.into_iter().enumerate() {
        groups.entry(label).or_default().push(members[position]);
    }
    groups
        .into_iter()
        .map(|(label, group)| Cluster::new(format!("{}_sub{}", cluster.id, label + 1), group))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
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
            [0.0, 1.0],
            [0.99, 0.05],
            [0.05, 0.99],
            [0.7, 0.7],
        ]
    }

    #[test]
    fn subclusters_follow_embedding_groups() {
        let cluster = Cluster::new("Cluster_0", [0, 1, 2, 3]);
        let parts = subclusters(&cluster, &embeddings(), 2);
        let ids: Vec<_> = parts.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["Cluster_0_sub1", "Cluster_0_sub2"]);
        assert_eq!(parts[0].members(), &[0, 2]);
        assert_eq!(parts[1].members(), &[1, 3]);
    }

    #[tokio::test]
    async fn split_products_are_appended() {
        let oracle = Arc::new(ScriptedOracle::declining().split_when(|name, _| {
            (name == "A").then_some(2)
        }));
        let gateway = OracleGateway::new(oracle, OracleRetryConfig::default());
        let state: ClusteringState = [Cluster::new("A", [0, 1, 2, 3]), Cluster::new("B", [4])]
            .into_iter()
            .collect();

        let after = split_pass(state, &elements(5), &embeddings(), &gateway, &SummaryBudget::default()).await;
        let ids: Vec<_> = after.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["B", "A_sub1", "A_sub2"]);
        assert!(after.is_partition_of(5));
    }

    #[tokio::test]
    async fn split_count_is_clamped_to_cluster_size() {
        let oracle = Arc::new(ScriptedOracle::declining().split_when(|_, _| Some(10)));
        let gateway = OracleGateway::new(oracle, OracleRetryConfig::default());
        let state: ClusteringState = [Cluster::new("A", [0, 1]), Cluster::new("B", [4])]
            .into_iter()
            .collect();

        let after = split_pass(state, &elements(5), &embeddings(), &gateway, &SummaryBudget::default()).await;
        let ids: Vec<_> = after.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["B", "A_sub1", "A_sub2"]);
        assert!(after.iter().all(|c| c.len() == 1));
    }
}
