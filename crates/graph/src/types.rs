use context_corpus::ElementKind;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Type of relationship between two elements, seen from the source element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipType {
    /// A calls B
    Calls,

    /// A is called by B
    CalledBy,

    /// A inherits from B
    Inherits,

    /// A is inherited by B
    InheritedBy,
}

impl RelationshipType {
    /// Relationship seen from the other end of the edge
    #[must_use]
    pub const fn inverse(self) -> Self {
        match self {
            Self::Calls => Self::CalledBy,
            Self::CalledBy => Self::Calls,
            Self::Inherits => Self::InheritedBy,
            Self::InheritedBy => Self::Inherits,
        }
    }

    /// Multiplier applied to the embedding distance of related elements.
    /// Smaller means "treat as more similar".
    #[must_use]
    pub const fn distance_weight(self) -> f32 {
        match self {
            Self::Inherits => 0.4,
            Self::InheritedBy => 0.5,
            Self::Calls => 0.6,
            Self::CalledBy => 0.7,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Calls => "calls",
            Self::CalledBy => "called_by",
            Self::Inherits => "inherits",
            Self::InheritedBy => "inherited_by",
        }
    }
}

/// Node in the relationship graph
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphNode {
    /// Position of the element in the corpus
    pub element_index: usize,

    /// Element identifier
    pub element_id: String,

    pub kind: ElementKind,
}

/// Edge in the relationship graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub relationship: RelationshipType,
}

/// Relations keyed by source element index, then target element index
pub type Adjacency = BTreeMap<usize, BTreeMap<usize, RelationshipType>>;

/// Directed relationship graph; node `i` is element `i` of the corpus
pub struct CodeGraph {
    pub graph: DiGraph<GraphNode, GraphEdge>,

    /// Element id -> NodeIndex mapping for fast lookup
    pub id_index: HashMap<String, NodeIndex>,
}

impl CodeGraph {
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            id_index: HashMap::new(),
        }
    }

    /// Add node to graph
    pub fn add_node(&mut self, node: GraphNode) -> NodeIndex {
        let element_id = node.element_id.clone();
        let idx = self.graph.add_node(node);
        self.id_index.insert(element_id, idx);
        idx
    }

    /// Add or replace the edge `from -> to`; at most one edge per ordered pair
    pub fn add_edge(&mut self, from: NodeIndex, to: NodeIndex, edge: GraphEdge) {
        self.graph.update_edge(from, to, edge);
    }

    /// Add a relation together with its inverse
    pub fn add_relation(&mut self, from: NodeIndex, to: NodeIndex, relationship: RelationshipType) {
        self.add_edge(from, to, GraphEdge { relationship });
        self.add_edge(
            to,
            from,
            GraphEdge {
                relationship: relationship.inverse(),
            },
        );
    }

    /// Find node by element id
    pub fn find_node(&self, element_id: &str) -> Option<NodeIndex> {
        self.id_index.get(element_id).copied()
    }

    /// Get node data
    pub fn get_node(&self, idx: NodeIndex) -> Option<&GraphNode> {
        self.graph.node_weight(idx)
    }

    /// Get node count
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Get edge count
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}

impl Default for CodeGraph {
    fn default() -> Self {
        Self::new()
    }
}
