// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Thalia-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Thalia and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use crate::model::{
    ChoiceData, ChoiceOption, DialogueData, Edge, EdgeId, Graph, Node, NodeData, NodeId, OptionId,
    Position,
};

use super::{apply_ops, GraphOp, GraphRef};

fn node_id(raw: &str) -> NodeId {
    NodeId::new(raw).expect("node id")
}

fn dialogue(id: &str, speaker: &str, text: &str) -> Node {
    Node::new(
        node_id(id),
        Position::default(),
        NodeData::Dialogue(DialogueData::new(speaker, text)),
    )
}

fn choice(id: &str, option_ids: &[&str]) -> Node {
    let mut option_ids = option_ids.iter();
    let first = *option_ids.next().expect("at least one option");
    let mut data = ChoiceData::new(ChoiceOption::new(
        OptionId::new(first).expect("option id"),
        "",
    ));
    for raw in option_ids {
        data.push_option(ChoiceOption::new(OptionId::new(*raw).expect("option id"), ""));
    }
    Node::new(node_id(id), Position::default(), NodeData::Choice(data))
}

#[test]
fn add_node_appends_at_the_end() {
    let mut graph = Graph::default();
    apply_ops(
        &mut graph,
        &[
            GraphOp::AddNode {
                node: dialogue("node-1", "A", ""),
            },
            GraphOp::AddNode {
                node: dialogue("node-2", "B", ""),
            },
        ],
    );

    let ids = graph.nodes().iter().map(|n| n.id().as_str()).collect::<Vec<_>>();
    assert_eq!(ids, ["node-1", "node-2"]);
}

#[test]
fn update_node_data_replaces_only_the_payload_of_the_matching_node() {
    let mut graph = Graph::default();
    graph.nodes_mut().push(dialogue("node-1", "A", "one"));
    graph.nodes_mut().push(dialogue("node-2", "B", "two"));

    let delta = apply_ops(
        &mut graph,
        &[GraphOp::UpdateNodeData {
            node_id: node_id("node-1"),
            data: NodeData::Dialogue(DialogueData::new("A", "rewritten")),
        }],
    );

    assert_eq!(delta.updated, [GraphRef::Node(node_id("node-1"))]);

    let NodeData::Dialogue(first) = graph.nodes()[0].data() else {
        panic!("expected dialogue payload");
    };
    assert_eq!(first.text(), "rewritten");

    let NodeData::Dialogue(second) = graph.nodes()[1].data() else {
        panic!("expected dialogue payload");
    };
    assert_eq!(second.text(), "two");

    let ids = graph.nodes().iter().map(|n| n.id().as_str()).collect::<Vec<_>>();
    assert_eq!(ids, ["node-1", "node-2"]);
}

#[test]
fn update_node_data_with_unknown_id_is_a_no_op() {
    let mut graph = Graph::default();
    graph.nodes_mut().push(dialogue("node-1", "A", "one"));

    let delta = apply_ops(
        &mut graph,
        &[GraphOp::UpdateNodeData {
            node_id: node_id("node-404"),
            data: NodeData::Dialogue(DialogueData::new("X", "never")),
        }],
    );

    assert!(delta.is_empty());
    let NodeData::Dialogue(data) = graph.nodes()[0].data() else {
        panic!("expected dialogue payload");
    };
    assert_eq!(data.text(), "one");
}

#[test]
fn update_node_data_of_the_wrong_kind_is_a_no_op() {
    let mut graph = Graph::default();
    graph.nodes_mut().push(choice("node-1", &["opt-1"]));

    let delta = apply_ops(
        &mut graph,
        &[GraphOp::UpdateNodeData {
            node_id: node_id("node-1"),
            data: NodeData::Dialogue(DialogueData::default()),
        }],
    );

    assert!(delta.is_empty());
    assert!(matches!(graph.nodes()[0].data(), NodeData::Choice(_)));
}

#[test]
fn add_edge_with_an_existing_id_overwrites_in_place() {
    let mut graph = Graph::default();
    graph.nodes_mut().push(choice("node-1", &["opt-1"]));
    graph.nodes_mut().push(dialogue("node-2", "B", ""));

    let first = Edge::new_with(
        node_id("node-1"),
        node_id("node-2"),
        Some(OptionId::new("opt-1").expect("option id")),
        None,
    );
    let second = Edge::from_parts(
        first.id().clone(),
        node_id("node-1"),
        node_id("node-2"),
        Some(OptionId::new("opt-1").expect("option id")),
        Some(OptionId::new("in").expect("option id")),
    );

    let delta = apply_ops(
        &mut graph,
        &[
            GraphOp::AddEdge { edge: first.clone() },
            GraphOp::AddEdge { edge: second.clone() },
        ],
    );

    assert_eq!(graph.edges().len(), 1);
    assert_eq!(graph.edges()[0], second);
    // Added then overwritten within one batch still reads as added.
    assert_eq!(delta.added, [GraphRef::Edge(first.id().clone())]);
    assert!(delta.updated.is_empty());
}

#[test]
fn remove_node_leaves_edges_dangling() {
    let mut graph = Graph::default();
    graph.nodes_mut().push(dialogue("node-1", "A", ""));
    graph.nodes_mut().push(dialogue("node-2", "B", ""));
    graph
        .edges_mut()
        .push(Edge::new(node_id("node-1"), node_id("node-2")));

    let delta = apply_ops(
        &mut graph,
        &[GraphOp::RemoveNode {
            node_id: node_id("node-2"),
        }],
    );

    assert_eq!(delta.removed, [GraphRef::Node(node_id("node-2"))]);
    assert_eq!(graph.nodes().len(), 1);
    // The edge now points at nothing and stays put.
    assert_eq!(graph.edges().len(), 1);
    assert!(graph.node(graph.edges()[0].target()).is_none());
}

#[test]
fn remove_edge_with_unknown_id_is_a_no_op() {
    let mut graph = Graph::default();
    graph
        .edges_mut()
        .push(Edge::new(node_id("node-1"), node_id("node-2")));

    let delta = apply_ops(
        &mut graph,
        &[GraphOp::RemoveEdge {
            edge_id: EdgeId::new("enode-404").expect("edge id"),
        }],
    );

    assert!(delta.is_empty());
    assert_eq!(graph.edges().len(), 1);
}

#[test]
fn set_nodes_and_set_edges_replace_wholesale() {
    let mut graph = Graph::default();
    graph.nodes_mut().push(dialogue("node-1", "A", ""));
    graph.nodes_mut().push(dialogue("node-2", "B", ""));
    graph
        .edges_mut()
        .push(Edge::new(node_id("node-1"), node_id("node-2")));

    let delta = apply_ops(
        &mut graph,
        &[
            GraphOp::SetNodes {
                nodes: vec![dialogue("node-9", "Z", "")],
            },
            GraphOp::SetEdges { edges: Vec::new() },
        ],
    );

    assert_eq!(graph.nodes().len(), 1);
    assert_eq!(graph.nodes()[0].id().as_str(), "node-9");
    assert!(graph.edges().is_empty());
    assert_eq!(delta.added, [GraphRef::Node(node_id("node-9"))]);
    assert_eq!(delta.removed.len(), 3);
}

#[test]
fn a_batch_applies_in_order() {
    let mut graph = Graph::default();

    let node = dialogue("node-1", "A", "");
    let delta = apply_ops(
        &mut graph,
        &[
            GraphOp::AddNode { node: node.clone() },
            GraphOp::RemoveNode {
                node_id: node.id().clone(),
            },
        ],
    );

    assert!(graph.nodes().is_empty());
    assert!(delta.added.is_empty());
    assert_eq!(delta.removed, [GraphRef::Node(node.id().clone())]);
}
