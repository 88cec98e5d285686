use context_corpus::cosine_similarity_matrix;
use context_graph::Adjacency;
use ndarray::Array2;

/// N×N element distance matrix (`1 - cosine`), optionally shrunk along
/// relationship edges. Read-only once built.
#[derive(Debug, Clone)]
pub struct DistanceMatrix {
    values: Array2<f32>,
}

impl DistanceMatrix {
    /// Cosine distance between every pair of embedding rows
    pub fn from_embeddings(embeddings: &Array2<f32>) -> Self {
        Self::from_similarity(&cosine_similarity_matrix(embeddings))
    }

    pub fn from_similarity(similarity: &Array2<f32>) -> Self {
        let mut values = similarity.mapv(|s| (1.0 - s).max(0.0));
        values.diag_mut().fill(0.0);
        Self { values }
    }

    /// Embedding distances with relationship weighting applied
    pub fn weighted(embeddings: &Array2<f32>, adjacency: &Adjacency) -> Self {
        let mut matrix = Self::from_embeddings(embeddings);
        let weighted = matrix.apply_relationship_weights(adjacency);
        log::debug!("Weighted {weighted} related element distances");
        matrix
    }

    /// Multiply `d[i][j]` by the weight of the `i -> j` relation for every
    /// explicit edge. Direction matters, so the result may be asymmetric.
    /// Returns the number of entries touched.
    pub fn apply_relationship_weights(&mut self, adjacency: &Adjacency) -> usize {
        let n = self.len();
        let mut touched = 0;
        for (&i, related) in adjacency {
            for (&j, relationship) in related {
                if i == j || i >= n || j >= n {
                    continue;
                }
                self.values[[i, j]] *= relationship.distance_weight();
                touched += 1;
            }
        }
        touched
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.nrows()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Directed entry `d[i][j]`
    #[must_use]
    pub fn get(&self, i: usize, j: usize) -> f32 {
        self.values[[i, j]]
    }

    /// Distance used for clustering: the upper-triangle entry of the pair
    #[must_use]
    pub fn pair(&self, i: usize, j: usize) -> f32 {
        if i <= j {
            self.values[[i, j]]
        } else {
            self.values[[j, i]]
        }
    }

    #[must_use]
    pub const fn values(&self) -> &Array2<f32> {
        &self.values
    }
}
