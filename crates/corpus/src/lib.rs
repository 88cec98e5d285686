//! # Context Corpus
//!
//! Code elements (methods, classes, files) with their text summaries, aligned
//! embedding vectors, and declared relationships.
//!
//! ## Features
//!
//! - **Single corpus contract** - every producer exposes the same
//!   `elements_with_embeddings()` snapshot
//! - **Index alignment** - element `i` always owns embedding row `i`
//! - **Persistent storage** with schema-versioned JSON
//! - **Similarity helpers** - cosine matrices, centroids, brute-force top-k
//!
//! ## Architecture
//!
//! ```text
//! corpus.json / in-memory producer
//!     │
//!     ├──> ElementCorpus (StoredElement[])
//!     │      └─> CodeElement + embedding
//!     │
//!     └──> CorpusSnapshot
//!            ├─> Vec<CodeElement>
//!            └─> Array2<f32> (rows aligned with elements)
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use context_corpus::{Corpus, ElementCorpus};
//!
//! #[tokio::main]
//! async fn main() -> context_corpus::Result<()> {
//!     let corpus = ElementCorpus::load("corpus.json").await?;
//!     let snapshot = corpus.elements_with_embeddings()?;
//!     println!("{} elements, dimension {}", snapshot.len(), snapshot.dimension());
//!     Ok(())
//! }
//! ```

mod corpus;
mod embedder;
mod error;
mod similarity;
mod types;

pub use corpus::{Corpus, CorpusSnapshot, ElementCorpus, ELEMENT_CORPUS_SCHEMA_VERSION};
pub use embedder::Embedder;
pub use error::{CorpusError, Result};
pub use similarity::{
    centroid, cosine_similarity, cosine_similarity_matrix, cosine_similarity_view, top_k_similar,
};
pub use types::{CodeElement, ElementKind, StoredElement};
