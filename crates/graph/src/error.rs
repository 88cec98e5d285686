use thiserror::Error;

pub type Result<T> = std::result::Result<T, GraphError>;

#[derive(Error, Debug)]
pub enum GraphError {
    #[error("Node not found: {0}")]
    NodeNotFound(String),

    #[error("Element index out of range: {index} (graph has {len} nodes)")]
    IndexOutOfRange { index: usize, len: usize },
}
