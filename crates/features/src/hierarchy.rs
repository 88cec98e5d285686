//! Complete-linkage agglomerative clustering over precomputed distances.
//!
//! The merge sequence does not depend on the requested cluster count, so a
//! [`Dendrogram`] is built once and cut at any `k`. The coherence search in
//! [`choose_cluster_count`] relies on this to score every candidate count
//! without re-clustering.

use ndarray::Array2;

/// Full merge history of complete-linkage clustering over `n` points
#[derive(Debug, Clone)]
pub struct Dendrogram {
    n: usize,
    /// (kept, absorbed) point representatives, in merge order
    merges: Vec<(usize, usize)>,
}

impl Dendrogram {
    /// Cluster `n` points; `distance(i, j)` is only queried with `i < j`.
    ///
    /// At each step the two closest clusters merge, where the distance
    /// between clusters is the largest pairwise distance between their
    /// members. Ties resolve toward lower indices.
    pub fn complete_linkage<F>(n: usize, distance: F) -> Self
    where
        F: Fn(usize, usize) -> f32,
    {
        if n < 2 {
            return Self {
                n,
                merges: Vec::new(),
            };
        }

        let mut d = vec![0.0f32; n * n];
        for i in 0..n {
            for j in (i + 1)..n {
                let value = distance(i, j);
                let value = if value.is_nan() { f32::INFINITY } else { value };
                d[i * n + j] = value;
                d[j * n + i] = value;
            }
        }

        let mut active = vec![true; n];
        let mut nearest: Vec<(usize, f32)> = (0..n)
            .map(|i| nearest_active(&d, n, &active, i))
            .collect();
        let mut merges = Vec::with_capacity(n - 1);

        for _ in 0..(n - 1) {
            let mut best: Option<(usize, usize, f32)> = None;
            for i in (0..n).filter(|&i| active[i]) {
                let (j, dist) = nearest[i];
                if best.map_or(true, |(_, _, b)| dist < b) {
                    best = Some((i, j, dist));
                }
            }
            let Some((i, j, _)) = best else { break };
            let (keep, absorb) = if i < j { (i, j) } else { (j, i) };

            for c in (0..n).filter(|&c| active[c] && c != keep && c != absorb) {
                let merged = d[keep * n + c].max(d[absorb * n + c]);
                d[keep * n + c] = merged;
                d[c * n + keep] = merged;
            }
            active[absorb] = false;
            merges.push((keep, absorb));

            // Complete linkage only grows distances, so only rows that
            // pointed at either merged cluster need a fresh scan.
            for c in (0..n).filter(|&c| active[c]) {
                if c == keep || nearest[c].0 == keep || nearest[c].0 == absorb {
                    nearest[c] = nearest_active(&d, n, &active, c);
                }
            }
        }

        Self { n, merges }
    }

    /// Unweighted cosine-distance clustering of a row subset
    pub fn from_distance_matrix(matrix: &Array2<f32>) -> Self {
        Self::complete_linkage(matrix.nrows(), |i, j| matrix[[i, j]])
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.n
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Labels for exactly `min(max(k, 1), n)` clusters, numbered by first
    /// appearance in point order
    #[must_use]
    pub fn cut(&self, k: usize) -> Vec<usize> {
        if self.n == 0 {
            return Vec::new();
        }
        let k = k.clamp(1, self.n);
        let mut parent: Vec<usize> = (0..self.n).collect();
        for &(keep, absorb) in self.merges.iter().take(self.n - k) {
            let root_keep = find(&mut parent, keep);
            let root_absorb = find(&mut parent, absorb);
            parent[root_absorb] = root_keep;
        }

        let mut label_of_root = vec![usize::MAX; self.n];
        let mut next = 0;
        (0..self.n)
            .map(|point| {
                let root = find(&mut parent, point);
                if label_of_root[root] == usize::MAX {
                    label_of_root[root] = next;
                    next += 1;
                }
                label_of_root[root]
            })
            .collect()
    }
}

fn nearest_active(d: &[f32], n: usize, active: &[bool], i: usize) -> (usize, f32) {
    let mut best = (i, f32::INFINITY);
    for j in (0..n).filter(|&j| j != i && active[j]) {
        let value = d[i * n + j];
        if value < best.1 || best.0 == i {
            best = (j, value);
        }
    }
    best
}

fn find(parent: &mut [usize], mut x: usize) -> usize {
    while parent[x] != x {
        parent[x] = parent[parent[x]];
        x = parent[x];
    }
    x
}

/// Mean within-cluster pairwise similarity, penalized by the share of
/// clusters with fewer than 3 members: `avg * (1 - 0.5 * small / k)`
pub fn coherence_score(similarity: &Array2<f32>, labels: &[usize]) -> f32 {
    let k = labels.iter().max().map_or(0, |&m| m + 1);
    if k == 0 {
        return 0.0;
    }

    let mut members: Vec<Vec<usize>> = vec![Vec::new(); k];
    for (point, &label) in labels.iter().enumerate() {
        members[label].push(point);
    }

    let mut coherences = Vec::new();
    for cluster in members.iter().filter(|m| m.len() > 1) {
        let mut sum = 0.0f32;
        let mut pairs = 0usize;
        for (a, &i) in cluster.iter().enumerate() {
            for &j in &cluster[a + 1..] {
                sum += similarity[[i, j]];
                pairs += 1;
            }
        }
        coherences.push(sum / pairs as f32);
    }

    let avg = if coherences.is_empty() {
        0.0
    } else {
        coherences.iter().sum::<f32>() / coherences.len() as f32
    };
    let small = members.iter().filter(|m| m.len() < 3).count();
    let size_penalty = 1.0 - (small as f32 / k as f32) * 0.5;
    avg * size_penalty
}

/// Pick the cluster count in `[min_clusters, max_clusters]` with the best
/// coherence score; the first best count wins ties. An empty range returns
/// `min_clusters`.
pub fn choose_cluster_count(
    dendrogram: &Dendrogram,
    similarity: &Array2<f32>,
    min_clusters: usize,
    max_clusters: usize,
) -> usize {
    let mut best_score = f32::NEG_INFINITY;
    let mut optimal = min_clusters;
    for k in min_clusters..=max_clusters {
        let score = coherence_score(similarity, &dendrogram.cut(k));
        log::debug!("Coherence for {k} clusters: {score:.4}");
        if score > best_score {
            best_score = score;
            optimal = k;
        }
    }
    optimal
}

#[cfg(test)]
mod tests {
    use super::*;
    use context_corpus::cosine_similarity_matrix;
    use ndarray::array;
    use pretty_assertions::assert_eq;

    fn line_points() -> Vec<f32> {
        vec![0.0, 1.0, 2.0, 10.0, 11.0, 30.0]
    }

    fn line_dendrogram() -> Dendrogram {
        let points = line_points();
        Dendrogram::complete_linkage(points.len(), |i, j| (points[i] - points[j]).abs())
    }

    #[test]
    fn cut_returns_requested_cluster_count() {
        let dendrogram = line_dendrogram();
        assert_eq!(dendrogram.cut(3), vec![0, 0, 0, 1, 1, 2]);
        assert_eq!(dendrogram.cut(2), vec![0, 0, 0, 0, 0, 1]);
        assert_eq!(dendrogram.cut(6), vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(dendrogram.cut(1), vec![0; 6]);
    }

    #[test]
    fn cut_clamps_out_of_range_counts() {
        let dendrogram = line_dendrogram();
        assert_eq!(dendrogram.cut(0), vec![0; 6]);
        assert_eq!(dendrogram.cut(99), vec![0, 1, 2, 3, 4, 5]);
        assert!(Dendrogram::complete_linkage(0, |_, _| 0.0).cut(3).is_empty());
        assert_eq!(Dendrogram::complete_linkage(1, |_, _| 0.0).cut(3), vec![0]);
    }

    #[test]
    fn complete_linkage_uses_farthest_members() {
        // Single linkage would chain 0-1-2-3; complete linkage splits in the middle.
        let points = [0.0f32, 1.0, 2.0, 3.0];
        let dendrogram =
            Dendrogram::complete_linkage(points.len(), |i, j| (points[i] - points[j]).abs());
        assert_eq!(dendrogram.cut(2), vec![0, 0, 1, 1]);
    }

    #[test]
    fn coherence_prefers_tight_clusters() {
        let embeddings = array![
            [1.0, 0.0, 0.0],
            [0.99, 0.01, 0.0],
            [0.98, 0.02, 0.0],
            [0.0, 1.0, 0.0],
            [0.01, 0.99, 0.0],
            [0.02, 0.98, 0.0],
        ];
        let similarity = cosine_similarity_matrix(&embeddings);
        let good = coherence_score(&similarity, &[0, 0, 0, 1, 1, 1]);
        let bad = coherence_score(&similarity, &[0, 1, 0, 1, 0, 1]);
        assert!(good > bad);
        assert!(good > 0.9);
    }

    #[test]
    fn choose_cluster_count_finds_natural_grouping() {
        let embeddings = array![
            [1.0, 0.0, 0.0],
            [0.99, 0.01, 0.0],
            [0.98, 0.02, 0.0],
            [0.0, 1.0, 0.0],
            [0.01, 0.99, 0.0],
            [0.02, 0.98, 0.0],
            [0.0, 0.0, 1.0],
            [0.0, 0.01, 0.99],
            [0.01, 0.0, 0.98],
        ];
        let similarity = cosine_similarity_matrix(&embeddings);
        let dendrogram = Dendrogram::complete_linkage(9, |i, j| 1.0 - similarity[[i, j]]);
        assert_eq!(choose_cluster_count(&dendrogram, &similarity, 3, 8), 3);
    }
}
