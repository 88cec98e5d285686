use crate::error::{CorpusError, Result};
use crate::types::{CodeElement, StoredElement};
use ndarray::{Array2, ArrayView1};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

pub const ELEMENT_CORPUS_SCHEMA_VERSION: u32 = 1;

/// Source of code elements with index-aligned embeddings
pub trait Corpus {
    /// Ordered elements plus an embedding matrix whose row `i` belongs to element `i`
    fn elements_with_embeddings(&self) -> Result<CorpusSnapshot>;
}

/// Read-only view of a corpus for one discovery run
#[derive(Debug, Clone)]
pub struct CorpusSnapshot {
    elements: Vec<CodeElement>,
    embeddings: Array2<f32>,
}

impl CorpusSnapshot {
    /// Pair elements with an embedding matrix, rejecting misaligned input
    pub fn new(elements: Vec<CodeElement>, embeddings: Array2<f32>) -> Result<Self> {
        if elements.len() != embeddings.nrows() {
            return Err(CorpusError::Misaligned {
                elements: elements.len(),
                rows: embeddings.nrows(),
            });
        }
        Ok(Self {
            elements,
            embeddings,
        })
    }

    /// Build from per-element vectors; every row must share one dimension
    pub fn from_rows(elements: Vec<CodeElement>, rows: Vec<Vec<f32>>) -> Result<Self> {
        if elements.len() != rows.len() {
            return Err(CorpusError::Misaligned {
                elements: elements.len(),
                rows: rows.len(),
            });
        }
        let dimension = rows.first().map_or(0, Vec::len);
        let mut flat = Vec::with_capacity(rows.len() * dimension);
        for row in rows {
            if row.len() != dimension {
                return Err(CorpusError::InvalidDimension {
                    expected: dimension,
                    actual: row.len(),
                });
            }
            flat.extend(row);
        }
        let embeddings = Array2::from_shape_vec((elements.len(), dimension), flat)
            .map_err(|e| CorpusError::Other(format!("Failed to shape embeddings: {e}")))?;
        Self::new(elements, embeddings)
    }

    #[must_use]
    pub fn empty() -> Self {
        Self {
            elements: Vec::new(),
            embeddings: Array2::zeros((0, 0)),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    #[must_use]
    pub fn dimension(&self) -> usize {
        self.embeddings.ncols()
    }

    #[must_use]
    pub fn elements(&self) -> &[CodeElement] {
        &self.elements
    }

    #[must_use]
    pub const fn embeddings(&self) -> &Array2<f32> {
        &self.embeddings
    }

    #[must_use]
    pub fn element(&self, index: usize) -> Option<&CodeElement> {
        self.elements.get(index)
    }

    #[must_use]
    pub fn embedding(&self, index: usize) -> Option<ArrayView1<'_, f32>> {
        (index < self.embeddings.nrows()).then(|| self.embeddings.row(index))
    }
}

impl Corpus for CorpusSnapshot {
    fn elements_with_embeddings(&self) -> Result<CorpusSnapshot> {
        Ok(self.clone())
    }
}

/// Element corpus persisted as a single JSON document
#[derive(Debug, Clone, Default)]
pub struct ElementCorpus {
    elements: Vec<StoredElement>,
    ids: HashSet<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct PersistedElementCorpus {
    schema_version: u32,
    elements: Vec<StoredElement>,
}

impl ElementCorpus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        log::info!("Loading element corpus from {}", path.display());
        let bytes = tokio::fs::read(path).await?;
        let persisted: PersistedElementCorpus = serde_json::from_slice(&bytes)?;
        if persisted.schema_version != ELEMENT_CORPUS_SCHEMA_VERSION {
            return Err(CorpusError::SchemaVersion {
                expected: ELEMENT_CORPUS_SCHEMA_VERSION,
                found: persisted.schema_version,
            });
        }
        let mut corpus = Self::new();
        for stored in persisted.elements {
            corpus.push(stored.element, stored.embedding)?;
        }
        log::info!("Loaded {} elements", corpus.len());
        Ok(corpus)
    }

    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let persisted = PersistedElementCorpus {
            schema_version: ELEMENT_CORPUS_SCHEMA_VERSION,
            elements: self.elements.clone(),
        };
        let bytes = serde_json::to_vec_pretty(&persisted)?;
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    /// Append an element; ids must be unique and dimensions must agree
    pub fn push(&mut self, element: CodeElement, embedding: Vec<f32>) -> Result<()> {
        if let Some(first) = self.elements.first() {
            if first.embedding.len() != embedding.len() {
                return Err(CorpusError::InvalidDimension {
                    expected: first.embedding.len(),
                    actual: embedding.len(),
                });
            }
        }
        if !self.ids.insert(element.id.clone()) {
            return Err(CorpusError::DuplicateId(element.id));
        }
        self.elements.push(StoredElement { element, embedding });
        Ok(())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&StoredElement> {
        self.elements.iter().find(|stored| stored.element.id == id)
    }
}

impl Corpus for ElementCorpus {
    fn elements_with_embeddings(&self) -> Result<CorpusSnapshot> {
        let (elements, rows): (Vec<_>, Vec<_>) = self
            .elements
            .iter()
            .cloned()
            .map(|stored| (stored.element, stored.embedding))
            .unzip();
        CorpusSnapshot::from_rows(elements, rows)
    }
}
