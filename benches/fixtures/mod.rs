// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Thalia-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Thalia and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

#![allow(dead_code)]

// Shared deterministic benchmark fixtures (no RNG).

use thalia::model::{
    ChoiceData, ChoiceOption, DialogueData, Edge, Graph, Node, NodeData, NodeId, OptionId,
    Position,
};

pub fn node_id(index: usize) -> NodeId {
    NodeId::new(format!("bench-node-{index:06}")).expect("node id")
}

pub fn option_id(node_index: usize, option_index: usize) -> OptionId {
    OptionId::new(format!("bench-opt-{node_index:06}-{option_index}")).expect("option id")
}

pub fn dialogue_node(index: usize) -> Node {
    Node::new(
        node_id(index),
        Position::new((index % 40) as f32 * 28.0, (index / 40) as f32 * 6.0),
        NodeData::Dialogue(DialogueData::new(
            format!("Speaker {index}"),
            format!("Line {index} of the benchmark script."),
        )),
    )
}

pub fn choice_node(index: usize, option_count: usize) -> Node {
    let mut data = ChoiceData::new(ChoiceOption::new(option_id(index, 0), "Option 0"));
    for option_index in 1..option_count.max(1) {
        data.push_option(ChoiceOption::new(
            option_id(index, option_index),
            format!("Option {option_index}"),
        ));
    }
    Node::new(
        node_id(index),
        Position::new((index % 40) as f32 * 28.0, (index / 40) as f32 * 6.0),
        NodeData::Choice(data),
    )
}

/// A chain graph: every fourth node is a choice, each node wired to the
/// next.
pub fn chain_graph(node_count: usize) -> Graph {
    let mut graph = Graph::default();
    for index in 0..node_count {
        let node = if index % 4 == 3 {
            choice_node(index, 3)
        } else {
            dialogue_node(index)
        };
        graph.nodes_mut().push(node);
    }
    for index in 1..node_count {
        graph
            .edges_mut()
            .push(Edge::new(node_id(index - 1), node_id(index)));
    }
    graph
}
