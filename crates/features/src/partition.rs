use crate::cluster::ClusteringState;
use crate::config::ClusterCount;
use crate::distance::DistanceMatrix;
use crate::hierarchy::{choose_cluster_count, Dendrogram};
use ndarray::Array2;

/// Prefix of initial bottom-up cluster ids
pub const CLUSTER_PREFIX: &str = "Cluster";

const BOUNDED_MAX_CLUSTERS: usize = 8;
const AUTO_MIN_CLUSTERS: usize = 3;
const AUTO_MAX_CLUSTERS: usize = 20;

/// Initial bottom-up partition: complete linkage over the weighted distance
/// matrix, cut at the count chosen by `policy`. Every element lands in
/// exactly one cluster.
pub fn initial_partition(
    distances: &DistanceMatrix,
    similarity: &Array2<f32>,
    policy: ClusterCount,
    known_features: usize,
) -> ClusteringState {
    let n = distances.len();
    if n == 0 {
        return ClusteringState::new();
    }

    let dendrogram = Dendrogram::complete_linkage(n, |i, j| distances.pair(i, j));
    let k = resolve_cluster_count(&dendrogram, similarity, policy, known_features);
    log::info!("Initial partition: {n} elements into {k} clusters");
    ClusteringState::from_labels(CLUSTER_PREFIX, &dendrogram.cut(k))
}

/// Cluster count for `policy`, always within `[1, max(1, n - 1)]`
pub fn resolve_cluster_count(
    dendrogram: &Dendrogram,
    similarity: &Array2<f32>,
    policy: ClusterCount,
    known_features: usize,
) -> usize {
    let n = dendrogram.len();
    let ceiling = n.saturating_sub(1).max(1);
    match policy {
        ClusterCount::Fixed(k) => k.clamp(1, ceiling),
        ClusterCount::Bounded => BOUNDED_MAX_CLUSTERS.min(n).clamp(1, ceiling),
        ClusterCount::Auto => {
            let hi = AUTO_MAX_CLUSTERS.min(ceiling);
            let lo = AUTO_MIN_CLUSTERS.max(known_features).clamp(1, hi);
            choose_cluster_count(dendrogram, similarity, lo, hi)
        }
    }
}
