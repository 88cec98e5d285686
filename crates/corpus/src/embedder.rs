use crate::error::Result;
use async_trait::async_trait;

/// Embeds free text into the same vector space as the corpus
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;
}
