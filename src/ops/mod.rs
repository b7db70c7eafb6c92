// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Thalia-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Thalia and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Mutation operations over the live graph.
//!
//! All mutations run synchronously on the single UI thread; there is no
//! concurrent writer. Applying ops produces a minimal delta the UI can use
//! to refresh derived state (selection, dirty flag).

use std::collections::HashSet;

use crate::model::{Edge, EdgeId, Graph, Node, NodeData, NodeId};

/// One mutation of the live collections.
///
/// Identity-preserving semantics: an update addressed at an unknown id is a
/// no-op, removing a node does not cascade to edges referencing it, and
/// adding an edge whose derived id already exists overwrites that edge in
/// place (last write wins).
#[derive(Debug, Clone, PartialEq)]
pub enum GraphOp {
    AddNode { node: Node },
    UpdateNodeData { node_id: NodeId, data: NodeData },
    RemoveNode { node_id: NodeId },
    AddEdge { edge: Edge },
    RemoveEdge { edge_id: EdgeId },
    SetNodes { nodes: Vec<Node> },
    SetEdges { edges: Vec<Edge> },
}

/// A changed element, for delta reporting.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GraphRef {
    Node(NodeId),
    Edge(EdgeId),
}

/// Which elements changed as the result of applying ops.
///
/// Intentionally coarse: only added/removed/updated refs, each list sorted
/// and deduplicated.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Delta {
    pub added: Vec<GraphRef>,
    pub removed: Vec<GraphRef>,
    pub updated: Vec<GraphRef>,
}

impl Delta {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.updated.is_empty()
    }
}

#[derive(Debug, Default)]
struct DeltaBuilder {
    added: HashSet<GraphRef>,
    removed: HashSet<GraphRef>,
    updated: HashSet<GraphRef>,
}

impl DeltaBuilder {
    fn record_added(&mut self, graph_ref: GraphRef) {
        self.removed.remove(&graph_ref);
        self.updated.remove(&graph_ref);
        self.added.insert(graph_ref);
    }

    fn record_removed(&mut self, graph_ref: GraphRef) {
        self.added.remove(&graph_ref);
        self.updated.remove(&graph_ref);
        self.removed.insert(graph_ref);
    }

    fn record_updated(&mut self, graph_ref: GraphRef) {
        if self.added.contains(&graph_ref) || self.removed.contains(&graph_ref) {
            return;
        }
        self.updated.insert(graph_ref);
    }

    fn finish(self) -> Delta {
        let mut added = self.added.into_iter().collect::<Vec<_>>();
        let mut removed = self.removed.into_iter().collect::<Vec<_>>();
        let mut updated = self.updated.into_iter().collect::<Vec<_>>();

        added.sort();
        removed.sort();
        updated.sort();

        Delta {
            added,
            removed,
            updated,
        }
    }
}

/// Applies ops in order against the live graph.
///
/// Infallible by design: every op either applies or degrades to a no-op, so
/// a stale id arriving from the surface can never crash the editor.
pub fn apply_ops(graph: &mut Graph, ops: &[GraphOp]) -> Delta {
    let mut delta = DeltaBuilder::default();

    for op in ops {
        apply_op(graph, op, &mut delta);
    }

    delta.finish()
}

fn apply_op(graph: &mut Graph, op: &GraphOp, delta: &mut DeltaBuilder) {
    match op {
        GraphOp::AddNode { node } => {
            delta.record_added(GraphRef::Node(node.id().clone()));
            graph.nodes_mut().push(node.clone());
        }
        GraphOp::UpdateNodeData { node_id, data } => {
            let Some(node) = graph.node_mut(node_id) else {
                return;
            };
            if node.set_data(data.clone()).is_ok() {
                delta.record_updated(GraphRef::Node(node_id.clone()));
            }
        }
        GraphOp::RemoveNode { node_id } => {
            let before_len = graph.nodes().len();
            graph.nodes_mut().retain(|n| n.id() != node_id);
            if graph.nodes().len() != before_len {
                delta.record_removed(GraphRef::Node(node_id.clone()));
            }
        }
        GraphOp::AddEdge { edge } => {
            match graph.edges().iter().position(|e| e.id() == edge.id()) {
                Some(index) => {
                    graph.edges_mut()[index] = edge.clone();
                    delta.record_updated(GraphRef::Edge(edge.id().clone()));
                }
                None => {
                    delta.record_added(GraphRef::Edge(edge.id().clone()));
                    graph.edges_mut().push(edge.clone());
                }
            }
        }
        GraphOp::RemoveEdge { edge_id } => {
            let before_len = graph.edges().len();
            graph.edges_mut().retain(|e| e.id() != edge_id);
            if graph.edges().len() != before_len {
                delta.record_removed(GraphRef::Edge(edge_id.clone()));
            }
        }
        GraphOp::SetNodes { nodes } => {
            for node in graph.nodes() {
                delta.record_removed(GraphRef::Node(node.id().clone()));
            }
            for node in nodes {
                delta.record_added(GraphRef::Node(node.id().clone()));
            }
            *graph.nodes_mut() = nodes.clone();
        }
        GraphOp::SetEdges { edges } => {
            for edge in graph.edges() {
                delta.record_removed(GraphRef::Edge(edge.id().clone()));
            }
            for edge in edges {
                delta.record_added(GraphRef::Edge(edge.id().clone()));
            }
            *graph.edges_mut() = edges.clone();
        }
    }
}

#[cfg(test)]
mod tests;
