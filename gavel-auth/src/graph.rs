// SPDX-License-Identifier: MIT OR Apache-2.0

//! Traversal view of the relationship table.

use gavel_core::{ObjectRef, Relationship, RelationshipId};
use petgraph::prelude::DiGraphMap;

/// Build the traversal graph for a set of relationship rows.
///
/// Every edge is inserted in both directions so that neighbour iteration
/// from any object needs no reverse lookups; edge weights carry the
/// relationship id so derived grants can record the edge they travelled.
pub(crate) fn relationship_graph(
    edges: &[Relationship],
) -> DiGraphMap<ObjectRef, RelationshipId> {
    let mut graph = DiGraphMap::new();
    for edge in edges {
        graph.add_edge(edge.source, edge.destination, edge.id);
        graph.add_edge(edge.destination, edge.source, edge.id);
    }
    graph
}
