use crate::error::{GraphError, Result};
use crate::types::{Adjacency, CodeGraph, RelationshipType};
use petgraph::graph::NodeIndex;
use petgraph::visit::EdgeRef;

impl CodeGraph {
    /// Relationship of the directed edge `from -> to`, if any
    pub fn relationship(&self, from: usize, to: usize) -> Option<RelationshipType> {
        let edge = self
            .graph
            .find_edge(NodeIndex::new(from), NodeIndex::new(to))?;
        self.graph.edge_weight(edge).map(|e| e.relationship)
    }

    /// Outgoing relations of an element index, sorted by target index
    pub fn neighbors(&self, element_index: usize) -> Result<Vec<(usize, RelationshipType)>> {
        if element_index >= self.node_count() {
            return Err(GraphError::IndexOutOfRange {
                index: element_index,
                len: self.node_count(),
            });
        }
        let mut out: Vec<(usize, RelationshipType)> = self
            .graph
            .edges(NodeIndex::new(element_index))
            .map(|e| (e.target().index(), e.weight().relationship))
            .collect();
        out.sort_unstable();
        Ok(out)
    }

    /// Outgoing relations of an element, rendered as (target id, relationship)
    pub fn relations_of(&self, element_id: &str) -> Result<Vec<(String, RelationshipType)>> {
        let node = self
            .find_node(element_id)
            .ok_or_else(|| GraphError::NodeNotFound(element_id.to_string()))?;
        let related = self.neighbors(node.index())?;
        Ok(related
            .into_iter()
            .filter_map(|(target, rel)| {
                self.get_node(NodeIndex::new(target))
                    .map(|n| (n.element_id.clone(), rel))
            })
            .collect())
    }

    /// Every element index (including isolated ones) mapped to its relations
    pub fn adjacency(&self) -> Adjacency {
        let mut adjacency: Adjacency = (0..self.node_count()).map(|i| (i, Default::default())).collect();
        for edge in self.graph.edge_references() {
            adjacency
                .entry(edge.source().index())
                .or_default()
                .insert(edge.target().index(), edge.weight().relationship);
        }
        adjacency
    }

    /// Number of edges carrying the given relationship
    pub fn count_relationship(&self, relationship: RelationshipType) -> usize {
        self.graph
            .edge_references()
            .filter(|e| e.weight().relationship == relationship)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GraphNode;
    use context_corpus::ElementKind;

    fn graph_with(n: usize) -> CodeGraph {
        let mut graph = CodeGraph::new();
        for i in 0..n {
            graph.add_node(GraphNode {
                element_index: i,
                element_id: format!("m{i}"),
                kind: ElementKind::Method,
            });
        }
        graph
    }

    #[test]
    fn relation_adds_inverse_edge() {
        let mut graph = graph_with(2);
        graph.add_relation(NodeIndex::new(0), NodeIndex::new(1), RelationshipType::Calls);

        assert_eq!(graph.relationship(0, 1), Some(RelationshipType::Calls));
        assert_eq!(graph.relationship(1, 0), Some(RelationshipType::CalledBy));
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn re_adding_relation_is_idempotent() {
        let mut graph = graph_with(2);
        graph.add_relation(NodeIndex::new(0), NodeIndex::new(1), RelationshipType::Inherits);
        graph.add_relation(NodeIndex::new(0), NodeIndex::new(1), RelationshipType::Inherits);
        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.count_relationship(RelationshipType::InheritedBy), 1);
    }

    #[test]
    fn adjacency_covers_isolated_nodes() {
        let mut graph = graph_with(3);
        graph.add_relation(NodeIndex::new(2), NodeIndex::new(0), RelationshipType::Calls);

        let adjacency = graph.adjacency();
        assert_eq!(adjacency.len(), 3);
        assert!(adjacency[&1].is_empty());
        assert_eq!(adjacency[&2][&0], RelationshipType::Calls);
        assert_eq!(adjacency[&0][&2], RelationshipType::CalledBy);
    }

    #[test]
    fn relations_of_unknown_element_is_an_error() {
        let graph = graph_with(1);
        assert!(matches!(
            graph.relations_of("nope"),
            Err(GraphError::NodeNotFound(_))
        ));
        assert!(graph.relations_of("m0").unwrap().is_empty());
    }
}
