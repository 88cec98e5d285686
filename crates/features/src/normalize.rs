use crate::cluster::{Cluster, ClusteringState};
use context_corpus::cosine_similarity_view;
use ndarray::Array2;

/// Fold every cluster smaller than `min_size` into the live cluster whose
/// centroid is most similar to its own.
///
/// Empty clusters are dropped. Clusters are visited in state order and only
/// ever grow, so a single pass leaves every survivor at `min_size` or more,
/// except a sole remaining cluster, which is kept whatever its size.
pub fn normalize_sizes(state: ClusteringState, embeddings: &Array2<f32>, min_size: usize) -> ClusteringState {
    let mut slots: Vec<Option<Cluster>> = state
        .into_clusters()
        .into_iter()
        .filter(|c| !c.is_empty())
        .map(Some)
        .collect();

    for i in 0..slots.len() {
        let undersized = slots[i].as_ref().is_some_and(|c| c.len() < min_size);
        if !undersized {
            continue;
        }
        let Some(target) = nearest_cluster(&mut slots, i, embeddings) else {
            // sole survivor
            continue;
        };
        if let Some(small) = slots[i].take() {
            if let Some(into) = slots[target].as_mut() {
                log::debug!(
                    "Folding undersized {} ({} members) into {}",
                    small.id,
                    small.len(),
                    into.id
                );
                into.absorb(small);
            }
        }
    }

    slots.into_iter().flatten().collect()
}

/// Live cluster other than `i` with the most similar centroid; ties go to
/// the earliest
fn nearest_cluster(slots: &mut [Option<Cluster>], i: usize, embeddings: &Array2<f32>) -> Option<usize> {
    let own = slots.get_mut(i)?.as_mut()?.centroid(embeddings)?.clone();
    let mut best: Option<(usize, f32)> = None;
    for (j, slot) in slots.iter_mut().enumerate() {
        if j == i {
            continue;
        }
        let Some(candidate) = slot.as_mut() else { continue };
        let Some(centroid) = candidate.centroid(embeddings) else { continue };
        let score = cosine_similarity_view(own.view(), centroid.view());
        if best.map_or(true, |(_, b)| score > b) {
            best = Some((j, score));
        }
    }
    best.map(|(j, _)| j)
}
