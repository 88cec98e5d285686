//! # Context Graph
//!
//! Typed relationship graph over code elements, used to pull related
//! elements closer together before clustering.
//!
//! ## Features
//!
//! - **Call relationships** - `calls` / `called_by` edge pairs
//! - **Inheritance** - `inherits` / `inherited_by` edge pairs
//! - **Idempotent edges** - re-adding a relation leaves the graph unchanged
//! - **Adjacency export** - relations keyed by element index for distance weighting
//!
//! ## Architecture
//!
//! ```text
//! CodeElement[]
//!     │
//!     ├──> Graph Builder
//!     │      ├─ Index elements by id
//!     │      ├─ Read calls / inherits_from of method elements
//!     │      └─ Drop dangling and self references
//!     │
//!     └──> Code Graph (petgraph)
//!            ├─ Nodes: elements (node index == element index)
//!            └─ Edges: typed, one per ordered pair
//! ```

mod builder;
mod error;
mod graph;
mod types;

pub use builder::GraphBuilder;
pub use error::{GraphError, Result};
pub use types::{Adjacency, CodeGraph, GraphEdge, GraphNode, RelationshipType};
