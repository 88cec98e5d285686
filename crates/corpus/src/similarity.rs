use crate::error::{CorpusError, Result};
use ndarray::{Array1, Array2, ArrayView1, Axis};

/// Cosine similarity of two vectors; zero vectors and length mismatches score 0
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

/// [`cosine_similarity`] over ndarray views
pub fn cosine_similarity_view(a: ArrayView1<'_, f32>, b: ArrayView1<'_, f32>) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }
    let norm_a = a.dot(&a).sqrt();
    let norm_b = b.dot(&b).sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    a.dot(&b) / (norm_a * norm_b)
}

/// Pairwise cosine similarity of all embedding rows (N×N, symmetric)
pub fn cosine_similarity_matrix(embeddings: &Array2<f32>) -> Array2<f32> {
    let mut normalized = embeddings.clone();
    for mut row in normalized.axis_iter_mut(Axis(0)) {
        let norm = row.dot(&row).sqrt();
        if norm > 0.0 {
            row.mapv_inplace(|v| v / norm);
        }
    }
    normalized.dot(&normalized.t())
}

/// Mean embedding of the given rows; `None` for an empty selection
pub fn centroid(embeddings: &Array2<f32>, rows: &[usize]) -> Option<Array1<f32>> {
    if rows.is_empty() {
        return None;
    }
    embeddings.select(Axis(0), rows).mean_axis(Axis(0))
}

/// Rows most similar to `query`, at most `k`, each scoring at least `min_score`.
/// Returns (row, score) sorted by score descending.
pub fn top_k_similar(
    embeddings: &Array2<f32>,
    query: &[f32],
    k: usize,
    min_score: f32,
) -> Result<Vec<(usize, f32)>> {
    if embeddings.nrows() > 0 && query.len() != embeddings.ncols() {
        return Err(CorpusError::InvalidDimension {
            expected: embeddings.ncols(),
            actual: query.len(),
        });
    }

    let query = ArrayView1::from(query);
    let mut scores: Vec<(usize, f32)> = embeddings
        .axis_iter(Axis(0))
        .enumerate()
        .map(|(row, vector)| (row, cosine_similarity_view(query, vector)))
        .collect();

    // Stable sort keeps row order among equal scores
    scores.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    scores.truncate(k);
    scores.retain(|(_, score)| *score >= min_score);

    Ok(scores)
}
