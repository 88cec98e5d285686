use thiserror::Error;

pub type Result<T> = std::result::Result<T, CorpusError>;

#[derive(Error, Debug)]
pub enum CorpusError {
    #[error("Embedding error: {0}")]
    EmbeddingError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Unsupported corpus schema_version {found} (expected {expected})")]
    SchemaVersion { expected: u32, found: u32 },

    #[error("Invalid vector dimension: expected {expected}, got {actual}")]
    InvalidDimension { expected: usize, actual: usize },

    #[error("Misaligned corpus: {elements} elements but {rows} embedding rows")]
    Misaligned { elements: usize, rows: usize },

    #[error("Duplicate element id: {0}")]
    DuplicateId(String),

    #[error("{0}")]
    Other(String),
}
