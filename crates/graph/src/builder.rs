use crate::types::{CodeGraph, GraphNode, RelationshipType};
use context_corpus::{CodeElement, ElementKind};
use petgraph::graph::NodeIndex;

/// Build the relationship graph from corpus elements
#[derive(Debug, Default, Clone, Copy)]
pub struct GraphBuilder;

impl GraphBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Build graph from elements; node `i` corresponds to `elements[i]`
    pub fn build(&self, elements: &[CodeElement]) -> CodeGraph {
        let mut graph = CodeGraph::new();

        // Phase 1: one node per element, in corpus order
        for (element_index, element) in elements.iter().enumerate() {
            graph.add_node(GraphNode {
                element_index,
                element_id: element.id.clone(),
                kind: element.kind,
            });
        }

        // Phase 2: relations declared by method elements
        let mut dropped = 0usize;
        for (element_index, element) in elements.iter().enumerate() {
            if element.kind != ElementKind::Method {
                continue;
            }
            let from = NodeIndex::new(element_index);

            let declared = element
                .calls
                .iter()
                .map(|target| (target, RelationshipType::Calls))
                .chain(
                    element
                        .inherits_from
                        .iter()
                        .map(|parent| (parent, RelationshipType::Inherits)),
                );

            for (target, relationship) in declared {
                let target = target.trim();
                if target.is_empty() {
                    continue;
                }
                match graph.find_node(target) {
                    Some(to) if to != from => graph.add_relation(from, to, relationship),
                    _ => dropped += 1,
                }
            }
        }

        log::info!(
            "Built relationship graph: {} nodes, {} edges",
            graph.node_count(),
            graph.edge_count()
        );
        if dropped > 0 {
            log::debug!("Dropped {dropped} dangling or self relationships");
        }

        graph
    }
}
